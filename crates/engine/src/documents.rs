//! Loading of the specification and its two metadata documents.
//!
//! The three documents are fetched concurrently and independently. A failed
//! specification fetch fails the load; a failed metadata fetch only disables
//! the feature that needs it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use specmark_primitives::{CreatedDateMap, SpecDocument, StatusMap};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DocumentError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse {path}: {source}")]
	Parse {
		path: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Metadata documents handed to the annotators. `None` means the fetch failed
/// and the dependent feature is off for this load.
#[derive(Debug, Clone, Default)]
pub struct Documents {
	pub status: Option<StatusMap>,
	pub created: Option<CreatedDateMap>,
}

/// Everything produced by [`load_documents`].
#[derive(Debug)]
pub struct LoadedDocuments {
	pub spec: SpecDocument,
	pub documents: Documents,
}

#[async_trait]
pub trait DocumentSource: Send + Sync {
	async fn fetch_spec(&self) -> Result<SpecDocument, DocumentError>;
	async fn fetch_status(&self) -> Result<StatusMap, DocumentError>;
	async fn fetch_created(&self) -> Result<CreatedDateMap, DocumentError>;
}

/// Fetches all three documents at once.
pub async fn load_documents(source: &dyn DocumentSource) -> Result<LoadedDocuments, DocumentError> {
	let (spec, status, created) = tokio::join!(source.fetch_spec(), source.fetch_status(), source.fetch_created());

	let spec = spec?;
	let status = status
		.inspect_err(|e| warn!(error = %e, "status map unavailable, status badges disabled"))
		.ok();
	let created = created
		.inspect_err(|e| warn!(error = %e, "creation metadata unavailable, NEW badges disabled"))
		.ok();
	debug!(
		operations = spec.operation_count(),
		status = status.is_some(),
		created = created.is_some(),
		"documents loaded"
	);

	Ok(LoadedDocuments {
		spec,
		documents: Documents { status, created },
	})
}

/// Reads the documents from JSON files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	dir: PathBuf,
}

impl DirectorySource {
	pub const SPEC_FILE: &'static str = "spec.json";
	pub const STATUS_FILE: &'static str = "status.json";
	pub const CREATED_FILE: &'static str = "created.json";

	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	async fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, DocumentError> {
		let path = self.dir.join(file);
		let raw = tokio::fs::read_to_string(&path).await.map_err(|source| DocumentError::Io {
			path: path.display().to_string(),
			source,
		})?;
		serde_json::from_str(&raw).map_err(|source| DocumentError::Parse {
			path: path.display().to_string(),
			source,
		})
	}
}

#[async_trait]
impl DocumentSource for DirectorySource {
	async fn fetch_spec(&self) -> Result<SpecDocument, DocumentError> {
		self.read(Self::SPEC_FILE).await
	}

	async fn fetch_status(&self) -> Result<StatusMap, DocumentError> {
		self.read(Self::STATUS_FILE).await
	}

	async fn fetch_created(&self) -> Result<CreatedDateMap, DocumentError> {
		self.read(Self::CREATED_FILE).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write(dir: &Path, file: &str, body: &str) {
		std::fs::write(dir.join(file), body).unwrap();
	}

	#[tokio::test]
	async fn metadata_failures_degrade() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), DirectorySource::SPEC_FILE, r#"{"paths": {"/api/todo": {"get": {}}}}"#);
		write(dir.path(), DirectorySource::STATUS_FILE, "not json");

		let loaded = load_documents(&DirectorySource::new(dir.path())).await.unwrap();
		assert_eq!(loaded.spec.operation_count(), 1);
		assert!(loaded.documents.status.is_none());
		assert!(loaded.documents.created.is_none());
	}

	#[tokio::test]
	async fn all_documents_load() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), DirectorySource::SPEC_FILE, r#"{"paths": {}}"#);
		write(dir.path(), DirectorySource::STATUS_FILE, r#"{"✅": "done", "/api/todo": "✅"}"#);
		write(
			dir.path(),
			DirectorySource::CREATED_FILE,
			r#"{"TodoController": {"methods": {"getTodo": {"date": "2025-04-08", "author": "kim"}}}}"#,
		);

		let loaded = load_documents(&DirectorySource::new(dir.path())).await.unwrap();
		assert_eq!(loaded.documents.status.unwrap().label("✅"), Some("done"));
		assert_eq!(loaded.documents.created.unwrap().author("getTodo"), Some("kim"));
	}

	#[tokio::test]
	async fn missing_spec_fails_the_load() {
		let dir = tempfile::tempdir().unwrap();
		let err = load_documents(&DirectorySource::new(dir.path())).await.unwrap_err();
		assert!(matches!(err, DocumentError::Io { .. }));
	}
}
