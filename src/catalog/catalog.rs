use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
	ActiveModelTrait, ColumnTrait, ConnectOptions, Condition, Database, DatabaseConnection,
	EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info};

use super::entities::{File, FileActiveModel};
use super::error::{CatalogError, Result};
use super::model::{FileEntry, NewFileEntry};
use super::predicate::{Mode, Predicate};
use super::status::Status;

/// Durable store of [`FileEntry`] rows. Every method here opens/uses a
/// short-lived checkout from the underlying connection pool and releases it
/// once the statement completes.
///
/// Backed by `sea_orm`, which transparently supports both the embedded
/// sqlite file store and a networked server (postgres) depending on what
/// [`Catalog::open`] is given.
#[derive(Clone)]
pub struct Catalog {
	db: DatabaseConnection,
}

/// Turn a `--db` argument into a connection string. A bare filesystem path
/// opens (and creates, if missing) an embedded sqlite database; anything
/// that already parses as a URL (e.g. `postgres://...`) is used verbatim.
fn resolve_connection_string(db: &str) -> String {
	if db.contains("://") {
		db.to_string()
	} else {
		format!("sqlite://{}?mode=rwc", Path::new(db).display())
	}
}

impl Catalog {
	/// Open (creating if necessary) the catalog at `db` and run pending
	/// migrations against it.
	pub async fn open(db: &str) -> Result<Self> {
		let conn_str = resolve_connection_string(db);
		let mut opts = ConnectOptions::new(conn_str);
		opts.max_connections(16).min_connections(1);

		let db = Database::connect(opts).await?;
		Migrator::up(&db, None)
			.await
			.map_err(CatalogError::Migration)?;
		info!("catalog opened and migrated");
		Ok(Self { db })
	}

	#[cfg(test)]
	pub(crate) fn connection(&self) -> &DatabaseConnection {
		&self.db
	}

	/// Bulk insert, deduplicated against existing `path` values. No-op for
	/// entries whose path is already present.
	pub async fn append(&self, entries: Vec<NewFileEntry>) -> Result<usize> {
		if entries.is_empty() {
			return Ok(0);
		}

		let existing: std::collections::HashSet<String> = File::find()
			.select_only()
			.column(super::entities::file_entry::Column::Path)
			.into_tuple::<String>()
			.all(&self.db)
			.await?
			.into_iter()
			.collect();

		let fresh: Vec<FileActiveModel> = entries
			.into_iter()
			.filter(|e| !existing.contains(&e.path))
			.map(|e| FileActiveModel {
				id: sea_orm::NotSet,
				path: Set(e.path),
				size: Set(e.size),
				puid: Set(None),
				format: Set(None),
				version: Set(None),
				mime: Set(None),
				encoding: Set(None),
				ext: Set(None),
				status: Set(e.status.unwrap_or(Status::New).as_str().to_string()),
				status_ts: Set(None),
				kept: Set(false),
				source_id: Set(e.source_id),
			})
			.collect();

		let count = fresh.len();
		if count == 0 {
			return Ok(0);
		}

		File::insert_many(fresh).exec(&self.db).await?;
		debug!(count, "appended new catalog rows");
		Ok(count)
	}

	/// Insert a single derived child row (archive member or kept intermediate).
	pub async fn add(&self, entry: NewFileEntry) -> Result<FileEntry> {
		let model = FileActiveModel {
			id: sea_orm::NotSet,
			path: Set(entry.path),
			size: Set(entry.size),
			puid: Set(None),
			format: Set(None),
			version: Set(None),
			mime: Set(None),
			encoding: Set(None),
			ext: Set(None),
			status: Set(entry.status.unwrap_or(Status::New).as_str().to_string()),
			status_ts: Set(None),
			kept: Set(false),
			source_id: Set(entry.source_id),
		}
		.insert(&self.db)
		.await?;

		model.try_into().map_err(CatalogError::BadStatus)
	}

	/// Upsert identification + status fields for one row. Always stamps
	/// `status_ts` with the current time.
	pub async fn update(&self, entry: &FileEntry) -> Result<()> {
		let now = Utc::now().naive_utc();
		let active = FileActiveModel {
			id: Set(entry.id),
			path: Set(entry.path.clone()),
			size: Set(entry.size),
			puid: Set(entry.puid.clone()),
			format: Set(entry.format.clone()),
			version: Set(entry.version.clone()),
			mime: Set(entry.mime.clone()),
			encoding: Set(entry.encoding.clone()),
			ext: Set(entry.ext.clone()),
			status: Set(entry.status.as_str().to_string()),
			status_ts: Set(Some(now)),
			kept: Set(entry.kept),
			source_id: Set(entry.source_id),
		};
		active.update(&self.db).await?;
		Ok(())
	}

	/// Remove a single row (used when a discarded intermediate was persisted
	/// speculatively and then abandoned).
	pub async fn delete(&self, id: i32) -> Result<()> {
		File::delete_by_id(id).exec(&self.db).await?;
		Ok(())
	}

	/// Recursively delete every descendant of `id` (not `id` itself), walking
	/// the `source_id` forest with a `WITH RECURSIVE` CTE.
	pub async fn delete_descendants(&self, id: i32) -> Result<u64> {
		use sea_orm::{ConnectionTrait, Statement};

		let backend = self.db.get_database_backend();
		let stmt = Statement::from_sql_and_values(
			backend,
			r#"
			WITH RECURSIVE descendants(id) AS (
				SELECT id FROM file WHERE source_id = $1
				UNION ALL
				SELECT file.id FROM file JOIN descendants ON file.source_id = descendants.id
			)
			DELETE FROM file WHERE id IN (SELECT id FROM descendants)
			"#,
			[id.into()],
		);

		let result = self.db.execute(stmt).await?;
		Ok(result.rows_affected())
	}

	/// Return entries matching `predicate`, optionally capped at `limit`.
	pub async fn select(&self, predicate: &Predicate, limit: Option<u64>) -> Result<Vec<FileEntry>> {
		if predicate.mode == Mode::Reconvert {
			self.update_status(predicate, Status::New).await?;
		}

		let mut query = File::find().filter(build_condition(predicate));
		query = query.order_by_asc(super::entities::file_entry::Column::Path);
		if let Some(limit) = limit {
			query = query.limit(limit);
		}

		let models = query.all(&self.db).await?;
		models
			.into_iter()
			.map(|m| m.try_into().map_err(CatalogError::BadStatus))
			.collect()
	}

	/// Count entries matching `predicate`.
	pub async fn count(&self, predicate: &Predicate) -> Result<u64> {
		Ok(File::find()
			.filter(build_condition(predicate))
			.count(&self.db)
			.await?)
	}

	/// Distinct top-level path segments among entries matching `predicate`,
	/// used to partition work across workers in `--multi` mode.
	pub async fn subfolders(&self, predicate: &Predicate) -> Result<Vec<String>> {
		let paths: Vec<String> = File::find()
			.filter(build_condition(predicate))
			.select_only()
			.column(super::entities::file_entry::Column::Path)
			.into_tuple()
			.all(&self.db)
			.await?;

		let mut set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
		for path in paths {
			if let Some(first) = path.split('/').next() {
				if !first.is_empty() {
					set.insert(first.to_string());
				}
			}
		}
		Ok(set.into_iter().collect())
	}

	/// Bulk status rewrite matching `predicate`. Returns the number of rows
	/// touched.
	pub async fn update_status(&self, predicate: &Predicate, new_status: Status) -> Result<u64> {
		use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

		let cond = build_condition(predicate);
		let select = File::find().filter(cond);
		let ids: Vec<i32> = select
			.select_only()
			.column(super::entities::file_entry::Column::Id)
			.into_tuple()
			.all(&self.db)
			.await?;

		if ids.is_empty() {
			return Ok(0);
		}

		let id_list = ids
			.iter()
			.map(|id| id.to_string())
			.collect::<Vec<_>>()
			.join(",");
		let now = Utc::now().naive_utc();
		let stmt = Statement::from_string(
			DatabaseBackend::Sqlite,
			format!(
				"UPDATE file SET status = '{}', status_ts = '{}' WHERE id IN ({id_list})",
				new_status.as_str(),
				now,
			),
		);
		let result = self.db.execute(stmt).await?;
		Ok(result.rows_affected())
	}

	/// Resolve the root ancestor of `id` by walking `source_id` back to a
	/// row with `source_id = NULL`.
	pub async fn root_of(&self, id: i32) -> Result<FileEntry> {
		let mut current = File::find_by_id(id)
			.one(&self.db)
			.await?
			.ok_or(CatalogError::NotFound(id))?;

		while let Some(parent_id) = current.source_id {
			current = File::find_by_id(parent_id)
				.one(&self.db)
				.await?
				.ok_or(CatalogError::NotFound(parent_id))?;
		}

		current.try_into().map_err(CatalogError::BadStatus)
	}
}

fn build_condition(predicate: &Predicate) -> Condition {
	use super::entities::file_entry::Column;

	let mut cond = Condition::all();

	match predicate.mode {
		Mode::Conversion => {
			cond = cond.add(
				Condition::all()
					.add(
						Column::Status
							.is_not_in(Status::FINISHED.iter().map(|s| s.as_str().to_string())),
					)
					.add(ts_not_yet_touched(predicate)),
			);
		}
		Mode::Retry => {
			cond = cond
				.add(Column::Status.is_in(Status::RETRYABLE.iter().map(|s| s.as_str().to_string())))
				.add(ts_not_yet_touched(predicate));
		}
		Mode::Reconvert => {
			cond = cond.add(Column::SourceId.is_null());
		}
		Mode::Finished => {
			cond = cond.add(
				Column::Status.is_in(Status::FINISHED.iter().map(|s| s.as_str().to_string())),
			);
			if let Some(ts) = predicate.batch_ts {
				cond = cond.add(Column::StatusTs.gt(ts));
			}
		}
		Mode::All => {}
	}

	if let Some(ts) = predicate.status_ts_after {
		cond = cond.add(Column::StatusTs.gt(ts));
	}
	if let Some(ts) = predicate.status_ts_before {
		cond = cond.add(Column::StatusTs.lt(ts));
	}

	if let Some(mime) = &predicate.mime {
		cond = cond.add(Column::Mime.eq(mime.clone()));
	}
	if let Some(puid) = &predicate.puid {
		cond = cond.add(Column::Puid.eq(puid.clone()));
	}
	if let Some(status) = predicate.status {
		cond = cond.add(Column::Status.eq(status.as_str()));
	}
	if let Some(ext) = &predicate.ext {
		cond = cond.add(Column::Ext.eq(ext.clone()));
	}
	if let Some(prefix) = &predicate.subpath_prefix {
		cond = cond.add(Column::Path.starts_with(prefix));
	}
	if let Some(from) = &predicate.path_from {
		cond = cond.add(Column::Path.gte(from.clone()));
	}
	if let Some(to) = &predicate.path_to {
		cond = cond.add(Column::Path.lt(to.clone()));
	}
	if predicate.original_only {
		cond = cond.add(Column::SourceId.is_null());
	}

	cond
}

/// `status_ts IS NULL OR status_ts < batch_ts` — the clause that makes a
/// batch idempotent: a row touched earlier in the same batch isn't reselected.
fn ts_not_yet_touched(predicate: &Predicate) -> Condition {
	use super::entities::file_entry::Column;

	match predicate.batch_ts {
		Some(ts) => Condition::any()
			.add(Column::StatusTs.is_null())
			.add(Column::StatusTs.lt(ts)),
		None => Condition::all(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn temp_catalog() -> Catalog {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("catalog.sqlite");
		// Leak the tempdir so the file isn't removed before the test runs.
		std::mem::forget(dir);
		Catalog::open(path.to_str().unwrap()).await.unwrap()
	}

	#[tokio::test]
	async fn append_dedupes_by_path() {
		let cat = temp_catalog().await;
		let inserted = cat
			.append(vec![NewFileEntry::root("a.txt"), NewFileEntry::root("b.txt")])
			.await
			.unwrap();
		assert_eq!(inserted, 2);

		let inserted_again = cat
			.append(vec![NewFileEntry::root("a.txt"), NewFileEntry::root("c.txt")])
			.await
			.unwrap();
		assert_eq!(inserted_again, 1);

		let count = cat.count(&Predicate::new(Mode::Conversion)).await.unwrap();
		assert_eq!(count, 3);
	}

	#[tokio::test]
	async fn reconvert_resets_roots_and_cascades_delete() {
		let cat = temp_catalog().await;
		cat.append(vec![NewFileEntry::root("bundle.zip")])
			.await
			.unwrap();
		let root = cat
			.select(&Predicate::new(Mode::Conversion), Some(1))
			.await
			.unwrap()
			.remove(0);

		let mut converted = root.clone();
		converted.status = Status::Converted;
		cat.update(&converted).await.unwrap();

		cat.add(NewFileEntry::child("bundle/a.txt", root.id))
			.await
			.unwrap();
		cat.add(NewFileEntry::child("bundle/b.txt", root.id))
			.await
			.unwrap();

		let deleted = cat.delete_descendants(root.id).await.unwrap();
		assert_eq!(deleted, 2);

		let remaining = cat.select(&Predicate::new(Mode::Reconvert), None).await.unwrap();
		assert_eq!(remaining.len(), 1);
		assert_eq!(remaining[0].status, Status::New);
	}

	#[tokio::test]
	async fn subfolders_extracts_top_level_segments() {
		let cat = temp_catalog().await;
		cat.append(vec![
			NewFileEntry::root("a/one.txt"),
			NewFileEntry::root("a/two.txt"),
			NewFileEntry::root("b/three.txt"),
		])
		.await
		.unwrap();

		let mut folders = cat.subfolders(&Predicate::new(Mode::Conversion)).await.unwrap();
		folders.sort();
		assert_eq!(folders, vec!["a".to_string(), "b".to_string()]);
	}
}
