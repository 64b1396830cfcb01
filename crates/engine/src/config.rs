//! Engine configuration, read from TOML. Every field has a default, so an
//! empty or missing file yields [`EngineConfig::default`].

use std::path::Path;

use serde::Deserialize;
use specmark_state::RearmPolicy;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	pub seen: SeenConfig,
	pub new_api: NewApiConfig,
	pub status: StatusConfig,
	pub labels: LabelConfig,
	pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeenConfig {
	/// Days after which a dismissal is considered lapsed.
	pub threshold_days: f64,
	pub policy: RearmPolicy,
}

impl Default for SeenConfig {
	fn default() -> Self {
		Self {
			threshold_days: 5.0,
			policy: RearmPolicy::Sticky,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewApiConfig {
	/// Operations created at most this many whole days ago get a NEW badge.
	pub threshold_days: i64,
}

impl Default for NewApiConfig {
	fn default() -> Self {
		Self { threshold_days: 5 }
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
	/// Glyphs whose badge disappears on click.
	pub dismissible: Vec<String>,
}

impl Default for StatusConfig {
	fn default() -> Self {
		Self {
			dismissible: vec!["✅".to_string(), "⬆️".to_string()],
		}
	}
}

impl StatusConfig {
	pub fn is_dismissible(&self, glyph: &str) -> bool {
		self.dismissible.iter().any(|g| g == glyph)
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
	/// Author shown when the creation metadata names none.
	pub unknown_author: String,
}

impl Default for LabelConfig {
	fn default() -> Self {
		Self {
			unknown_author: "unknown".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
	/// Key prefix of the scoped store.
	pub scope: String,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			scope: "specmark".to_string(),
		}
	}
}

impl EngineConfig {
	pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(raw)?)
	}
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
	match std::fs::read_to_string(path) {
		Ok(raw) => EngineConfig::from_toml(&raw),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EngineConfig::default()),
		Err(source) => Err(ConfigError::Io {
			path: path.display().to_string(),
			source,
		}),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_document_is_default() {
		assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
		let config = EngineConfig::default();
		assert!(config.status.is_dismissible("⬆️"));
		assert!(!config.status.is_dismissible("🛠️"));
		assert_eq!(config.seen.policy, RearmPolicy::Sticky);
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = EngineConfig::from_toml(
			r#"
			[seen]
			policy = "rearm"

			[new_api]
			threshold_days = 10
			"#,
		)
		.unwrap();
		assert_eq!(config.seen.policy, RearmPolicy::Rearm);
		assert_eq!(config.seen.threshold_days, 5.0);
		assert_eq!(config.new_api.threshold_days, 10);
		assert_eq!(config.storage.scope, "specmark");
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(EngineConfig::from_toml("[seen]\nwindow = 3"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn missing_file_yields_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let config = load_config(&dir.path().join("specmark.toml")).unwrap();
		assert_eq!(config, EngineConfig::default());

		let path = dir.path().join("bad.toml");
		std::fs::write(&path, "seen = 3").unwrap();
		assert!(load_config(&path).is_err());
	}
}
