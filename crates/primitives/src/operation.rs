use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// HTTP methods recognised as operation entries inside a path item.
pub const HTTP_METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Returns true when `name` is an operation method key of a path item.
pub fn is_http_method(name: &str) -> bool {
	HTTP_METHODS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

/// Canonical identity of one operation, rendered as `"METHOD path"`.
///
/// The method is always stored uppercase. This string form is the key of the
/// persisted seen ledger, so it must stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OperationKey {
	method: String,
	path: String,
}

impl OperationKey {
	pub fn new(method: &str, path: impl Into<String>) -> Self {
		Self {
			method: method.to_ascii_uppercase(),
			path: path.into(),
		}
	}

	/// Uppercase HTTP method.
	pub fn method(&self) -> &str {
		&self.method
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	/// Lowercase method, as used for specification lookups.
	pub fn lookup_method(&self) -> String {
		self.method.to_ascii_lowercase()
	}
}

impl fmt::Display for OperationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.method, self.path)
	}
}

/// Error returned when a string is not of the form `"METHOD path"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid operation key '{0}' (expected \"METHOD path\")")]
pub struct ParseKeyError(pub String);

impl FromStr for OperationKey {
	type Err = ParseKeyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.split_once(' ') {
			Some((method, path)) if !method.is_empty() && !path.is_empty() => Ok(Self::new(method, path)),
			_ => Err(ParseKeyError(s.to_string())),
		}
	}
}

impl From<OperationKey> for String {
	fn from(key: OperationKey) -> Self {
		key.to_string()
	}
}

impl TryFrom<String> for OperationKey {
	type Error = ParseKeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
