use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
	#[error("failed to spawn command: {0}")]
	Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProcessError>;
