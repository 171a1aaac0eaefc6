use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
	#[error("database error: {0}")]
	Db(#[from] sea_orm::DbErr),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("migration error: {0}")]
	Migration(sea_orm::DbErr),

	#[error("entry {0} not found")]
	NotFound(i32),

	#[error("could not parse status stored in catalog: {0}")]
	BadStatus(String),

	#[error("invalid catalog url: {0}")]
	InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
