//! Unified error handling for the engine.

use thiserror::Error;

/// Top-level error type surfaced to the CLI and to batch-aborting call sites.
///
/// Per-file failures never reach this type — they are recorded as a catalog
/// `status` instead (see [`crate::catalog::Status`]). Only conditions that
/// should abort the whole batch flow through here.
#[derive(Error, Debug)]
pub enum EngineError {
	#[error("catalog error: {0}")]
	Catalog(#[from] crate::catalog::CatalogError),

	#[error("registry error: {0}")]
	Registry(#[from] crate::registry::RegistryError),

	#[error("identification error: {0}")]
	Identify(#[from] crate::identify::IdentifyError),

	#[error("runner error: {0}")]
	Runner(#[from] crate::runner::RunnerError),

	#[error("database error: {0}")]
	Database(#[from] sea_orm::DbErr),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("source directory does not exist: {0}")]
	SourceMissing(std::path::PathBuf),

	#[error("configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
