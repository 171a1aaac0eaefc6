use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentifyError {
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse siegfried output: {0}")]
	BadSiegfriedOutput(String),

	#[error("no identifier produced a result for {0}")]
	NoResult(std::path::PathBuf),
}

pub type Result<T> = std::result::Result<T, IdentifyError>;
