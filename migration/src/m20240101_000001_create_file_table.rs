use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
	async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.create_table(
				Table::create()
					.table(File::Table)
					.if_not_exists()
					.col(
						ColumnDef::new(File::Id)
							.integer()
							.not_null()
							.auto_increment()
							.primary_key(),
					)
					.col(ColumnDef::new(File::Path).text().not_null())
					.col(ColumnDef::new(File::Size).big_integer().null())
					.col(ColumnDef::new(File::Puid).text().null())
					.col(ColumnDef::new(File::Format).text().null())
					.col(ColumnDef::new(File::Version).text().null())
					.col(ColumnDef::new(File::Mime).text().null())
					.col(ColumnDef::new(File::Encoding).text().null())
					.col(ColumnDef::new(File::Ext).text().null())
					.col(ColumnDef::new(File::Status).text().not_null().default("new"))
					.col(ColumnDef::new(File::StatusTs).timestamp().null())
					.col(
						ColumnDef::new(File::Kept)
							.boolean()
							.not_null()
							.default(false),
					)
					.col(ColumnDef::new(File::SourceId).integer().null())
					.foreign_key(
						ForeignKey::create()
							.name("fk_file_source_id")
							.from(File::Table, File::SourceId)
							.to(File::Table, File::Id)
							.on_delete(ForeignKeyAction::Cascade),
					)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_file_path")
					.table(File::Table)
					.col(File::Path)
					.unique()
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_file_status")
					.table(File::Table)
					.col(File::Status)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_file_status_ts")
					.table(File::Table)
					.col(File::StatusTs)
					.to_owned(),
			)
			.await?;

		manager
			.create_index(
				Index::create()
					.name("idx_file_source_id")
					.table(File::Table)
					.col(File::SourceId)
					.to_owned(),
			)
			.await
	}

	async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
		manager
			.drop_table(Table::drop().table(File::Table).to_owned())
			.await
	}
}

#[derive(DeriveIden)]
pub enum File {
	Table,
	Id,
	Path,
	Size,
	Puid,
	Format,
	Version,
	Mime,
	Encoding,
	Ext,
	Status,
	StatusTs,
	Kept,
	SourceId,
}
