use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
	#[error("io error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid registry yaml in {path}: {source}")]
	Yaml {
		path: PathBuf,
		#[source]
		source: serde_yaml::Error,
	},
}

pub type Result<T> = std::result::Result<T, RegistryError>;
