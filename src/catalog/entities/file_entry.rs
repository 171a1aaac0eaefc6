//! The `file` table: one row per discovered or produced file.
//!
//! Identification fields stay `Option` until [`crate::identify`] resolves
//! them; `source_id` is `None` for roots (files originally under the source
//! tree) and `Some` for archive members / kept conversion intermediates.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "file")]
pub struct Model {
	#[sea_orm(primary_key)]
	pub id: i32,
	#[sea_orm(unique)]
	pub path: String,
	pub size: Option<i64>,
	pub puid: Option<String>,
	pub format: Option<String>,
	pub version: Option<String>,
	pub mime: Option<String>,
	pub encoding: Option<String>,
	pub ext: Option<String>,
	pub status: String,
	pub status_ts: Option<NaiveDateTime>,
	pub kept: bool,
	pub source_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
	#[sea_orm(
		belongs_to = "Entity",
		from = "Column::SourceId",
		to = "Column::Id",
		on_delete = "Cascade"
	)]
	SourceFile,
}

impl ActiveModelBehavior for ActiveModel {}
