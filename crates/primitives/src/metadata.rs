//! Backend metadata documents: the status glyph map and the per-operation
//! creation-date map.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status glyphs and their labels, plus optional per-path glyph assignments.
///
/// The document is one flat JSON object. Keys starting with `/` assign a glyph
/// to a path; every other key is a glyph mapped to its label:
///
/// ```json
/// { "✅": "작업완료", "🔧": "작업중", "/api/todo/{id}": "✅" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusMap {
	glyphs: IndexMap<String, String>,
	assignments: IndexMap<String, String>,
}

/// A resolved status: the glyph and the label naming its classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMatch<'a> {
	pub glyph: &'a str,
	pub label: &'a str,
}

impl StatusMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a glyph and its label.
	pub fn with_glyph(mut self, glyph: impl Into<String>, label: impl Into<String>) -> Self {
		self.glyphs.insert(glyph.into(), label.into());
		self
	}

	/// Assigns a glyph to a path.
	pub fn with_assignment(mut self, path: impl Into<String>, glyph: impl Into<String>) -> Self {
		self.assignments.insert(path.into(), glyph.into());
		self
	}

	pub fn label(&self, glyph: &str) -> Option<&str> {
		self.glyphs.get(glyph).map(String::as_str)
	}

	pub fn glyphs(&self) -> impl Iterator<Item = (&str, &str)> {
		self.glyphs.iter().map(|(g, l)| (g.as_str(), l.as_str()))
	}

	pub fn is_empty(&self) -> bool {
		self.glyphs.is_empty() && self.assignments.is_empty()
	}

	/// First known glyph (document order) occurring in `text`.
	pub fn match_text(&self, text: &str) -> Option<StatusMatch<'_>> {
		self.glyphs
			.iter()
			.find(|(glyph, _)| text.contains(glyph.as_str()))
			.map(|(glyph, label)| StatusMatch { glyph, label })
	}

	/// Status of an operation: its path assignment if any, otherwise the
	/// first glyph found in its summary/description text.
	///
	/// An assigned glyph with no label entry uses the glyph as its label.
	pub fn resolve(&self, path: &str, text: &str) -> Option<StatusMatch<'_>> {
		if let Some((_, glyph)) = self.assignments.get_key_value(path) {
			let label = self.glyphs.get(glyph).map_or(glyph.as_str(), String::as_str);
			return Some(StatusMatch { glyph, label });
		}
		self.match_text(text)
	}
}

impl Serialize for StatusMap {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.glyphs.len() + self.assignments.len()))?;
		for (k, v) in self.glyphs.iter().chain(&self.assignments) {
			map.serialize_entry(k, v)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for StatusMap {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = IndexMap::<String, String>::deserialize(deserializer)?;
		let mut map = StatusMap::default();
		for (key, value) in raw {
			if key.starts_with('/') {
				map.assignments.insert(key, value);
			} else {
				map.glyphs.insert(key, value);
			}
		}
		Ok(map)
	}
}

/// `controllerName -> { tag, methods }` creation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatedDateMap {
	pub controllers: IndexMap<String, ControllerMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerMeta {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tag: Option<ControllerTag>,
	#[serde(default)]
	pub methods: IndexMap<String, MethodMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerTag {
	pub name: String,
	#[serde(default)]
	pub description: String,
}

/// Creation record of one operation id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodMeta {
	pub date: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub author: Option<String>,
}

impl MethodMeta {
	/// Creation instant. Bare dates are midnight UTC; date-times without an
	/// offset are read as UTC.
	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		let raw = self.date.trim();
		if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
			return Some(dt.with_timezone(&Utc));
		}
		if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
			return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
		}
		NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|dt| dt.and_utc())
	}
}

impl CreatedDateMap {
	/// Metadata of `operation_id` from the first controller that lists it.
	pub fn method(&self, operation_id: &str) -> Option<&MethodMeta> {
		self.controllers.values().find_map(|c| c.methods.get(operation_id))
	}

	pub fn created_at(&self, operation_id: &str) -> Option<DateTime<Utc>> {
		self.method(operation_id)?.created_at()
	}

	pub fn author(&self, operation_id: &str) -> Option<&str> {
		self.method(operation_id)?.author.as_deref()
	}

	/// True when the operation was created between 0 and `threshold_days`
	/// whole days before `now` (inclusive).
	pub fn is_recently_created(&self, operation_id: &str, now: DateTime<Utc>, threshold_days: i64) -> bool {
		self.created_at(operation_id)
			.map(|created| (0..=threshold_days).contains(&day_difference(created, now)))
			.unwrap_or(false)
	}
}

/// Whole days from `earlier` to `now`, rounded down (negative when `earlier`
/// lies in the future).
pub fn day_difference(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
	(now - earlier).num_seconds().div_euclid(86_400)
}

#[cfg(test)]
mod tests {
	use chrono::{Duration, TimeZone};
	use serde_json::json;

	use super::*;

	fn status_map() -> StatusMap {
		serde_json::from_value(json!({
			"🔧": "작업중",
			"✅": "작업완료",
			"⬆️": "업데이트",
			"/api/todo/{id}": "✅"
		}))
		.unwrap()
	}

	#[test]
	fn status_document_splits_glyphs_and_assignments() {
		let map = status_map();
		assert_eq!(map.label("✅"), Some("작업완료"));
		assert_eq!(map.glyphs().count(), 3);
		let back = serde_json::to_value(&map).unwrap();
		assert_eq!(back["/api/todo/{id}"], json!("✅"));
	}

	#[test]
	fn text_match_uses_document_order() {
		let map = status_map();
		let m = map.match_text("done ✅ but 🔧 again").unwrap();
		assert_eq!(m.glyph, "🔧");
		assert_eq!(m.label, "작업중");
		assert!(map.match_text("nothing here").is_none());
	}

	#[test]
	fn path_assignment_wins_over_text() {
		let map = status_map();
		let m = map.resolve("/api/todo/{id}", "🔧 in progress").unwrap();
		assert_eq!((m.glyph, m.label), ("✅", "작업완료"));

		let unlabeled = StatusMap::new().with_assignment("/x", "🧪");
		assert_eq!(unlabeled.resolve("/x", "").map(|m| m.label), Some("🧪"));
	}

	#[test]
	fn created_dates_accept_dates_and_date_times() {
		let meta = MethodMeta { date: "2025-04-10".into(), author: None };
		assert_eq!(meta.created_at(), Some(Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap()));

		let meta = MethodMeta { date: "2025-04-10T09:30:00Z".into(), author: None };
		assert_eq!(meta.created_at(), Some(Utc.with_ymd_and_hms(2025, 4, 10, 9, 30, 0).unwrap()));

		let meta = MethodMeta { date: "2025-04-10T09:30:00".into(), author: None };
		assert!(meta.created_at().is_some());

		let meta = MethodMeta { date: "someday".into(), author: None };
		assert!(meta.created_at().is_none());
	}

	#[test]
	fn recent_creation_window_is_inclusive_and_floors() {
		let map: CreatedDateMap = serde_json::from_value(json!({
			"TodoController": {
				"tag": { "name": "todos", "description": "Todo" },
				"methods": { "getTodo": { "date": "2025-04-10", "author": "kim" } }
			}
		}))
		.unwrap();
		let created = Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap();

		assert!(map.is_recently_created("getTodo", created + Duration::days(2), 5));
		assert!(map.is_recently_created("getTodo", created + Duration::days(5) + Duration::hours(23), 5));
		assert!(!map.is_recently_created("getTodo", created + Duration::days(6), 5));
		assert!(!map.is_recently_created("getTodo", created - Duration::hours(1), 5));
		assert!(!map.is_recently_created("unknown", created, 5));
		assert_eq!(map.author("getTodo"), Some("kim"));
	}

	#[test]
	fn day_difference_rounds_down() {
		let a = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
		assert_eq!(day_difference(a, a + Duration::hours(47)), 1);
		assert_eq!(day_difference(a, a - Duration::hours(1)), -1);
	}
}
