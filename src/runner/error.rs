use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Catalog(#[from] crate::catalog::CatalogError),

	#[error(transparent)]
	Identify(#[from] crate::identify::IdentifyError),

	#[error(transparent)]
	Process(#[from] crate::process::ProcessError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
