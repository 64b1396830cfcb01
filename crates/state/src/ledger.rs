//! Seen-state ledger: which operations had a badge dismissed, and when.
//!
//! The dismissal check is split in two. [`classify`] is the pure decision
//! over one record (`Unseen`, `Fresh` or `Lapsed` relative to the threshold),
//! and [`RearmPolicy`] turns a verdict into "dismissed or not". The ledger
//! itself only loads, refreshes and stores records, so switching policy never
//! changes the persisted format.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use specmark_primitives::OperationKey;
use tracing::{trace, warn};

use crate::store::{KeyValueStore, StoreError, read_json, write_json};

/// Store key of the ledger map.
pub const SEEN_KEY: &str = "seenApis";

/// Default re-arm threshold in days.
pub const DEFAULT_THRESHOLD_DAYS: f64 = 5.0;

/// Kind of badge that was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeenCategory {
	#[serde(rename = "status")]
	Status,
	#[serde(rename = "new", alias = "new-api")]
	NewApi,
}

impl SeenCategory {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Status => "status",
			Self::NewApi => "new-api",
		}
	}
}

impl fmt::Display for SeenCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One persisted dismissal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
	#[serde(rename = "type")]
	pub category: SeenCategory,
	pub timestamp: DateTime<Utc>,
}

/// Age of a record relative to the re-arm threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenVerdict {
	/// No record for the key.
	Unseen,
	/// Dismissed less than the threshold ago.
	Fresh,
	/// Dismissed at least the threshold ago.
	Lapsed,
}

/// Fractional days elapsed from `since` to `now`.
pub fn elapsed_days(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
	(now - since).num_milliseconds() as f64 / 86_400_000.0
}

/// Classifies a record against `threshold_days`.
pub fn classify(record: Option<&SeenRecord>, now: DateTime<Utc>, threshold_days: f64) -> SeenVerdict {
	match record {
		None => SeenVerdict::Unseen,
		Some(r) if elapsed_days(r.timestamp, now) >= threshold_days => SeenVerdict::Lapsed,
		Some(_) => SeenVerdict::Fresh,
	}
}

/// How a lapsed dismissal is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RearmPolicy {
	/// A lapsed record is re-confirmed with a fresh timestamp and still counts
	/// as dismissed: once seen, an operation stays dismissed.
	#[default]
	Sticky,
	/// A lapsed record no longer counts as dismissed, so the badge returns.
	Rearm,
}

impl RearmPolicy {
	pub const fn is_dismissed(self, verdict: SeenVerdict) -> bool {
		match (self, verdict) {
			(_, SeenVerdict::Unseen) => false,
			(_, SeenVerdict::Fresh) => true,
			(Self::Sticky, SeenVerdict::Lapsed) => true,
			(Self::Rearm, SeenVerdict::Lapsed) => false,
		}
	}
}

/// Persisted dismissal records keyed by `"METHOD path"`.
#[derive(Clone)]
pub struct SeenLedger {
	store: Arc<dyn KeyValueStore>,
	threshold_days: f64,
	policy: RearmPolicy,
}

impl fmt::Debug for SeenLedger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SeenLedger")
			.field("threshold_days", &self.threshold_days)
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}

impl SeenLedger {
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self {
			store,
			threshold_days: DEFAULT_THRESHOLD_DAYS,
			policy: RearmPolicy::default(),
		}
	}

	pub fn with_threshold_days(mut self, days: f64) -> Self {
		self.threshold_days = days;
		self
	}

	pub fn with_policy(mut self, policy: RearmPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn threshold_days(&self) -> f64 {
		self.threshold_days
	}

	pub fn policy(&self) -> RearmPolicy {
		self.policy
	}

	fn load(&self) -> Result<IndexMap<String, SeenRecord>, StoreError> {
		Ok(read_json(self.store.as_ref(), SEEN_KEY)?.unwrap_or_default())
	}

	/// All records; empty when the store cannot be read.
	pub fn records(&self) -> IndexMap<String, SeenRecord> {
		self.load().unwrap_or_else(|e| {
			warn!(error = %e, "seen ledger unreadable");
			IndexMap::new()
		})
	}

	pub fn record(&self, key: &OperationKey) -> Option<SeenRecord> {
		self.records().shift_remove(&key.to_string())
	}

	pub fn is_recently_dismissed(&self, key: &OperationKey) -> bool {
		self.is_recently_dismissed_at(key, Utc::now())
	}

	/// Whether badges for `key` are suppressed at `now`.
	///
	/// Under [`RearmPolicy::Sticky`] a lapsed record has its timestamp
	/// refreshed here and is reported dismissed.
	pub fn is_recently_dismissed_at(&self, key: &OperationKey, now: DateTime<Utc>) -> bool {
		let record = self.record(key);
		let verdict = classify(record.as_ref(), now, self.threshold_days);
		if verdict == SeenVerdict::Lapsed
			&& self.policy == RearmPolicy::Sticky
			&& let Some(record) = &record
		{
			trace!(%key, category = %record.category, "re-confirming lapsed dismissal");
			self.mark_dismissed_at(key, record.category, now);
		}
		self.policy.is_dismissed(verdict)
	}

	pub fn mark_dismissed(&self, key: &OperationKey, category: SeenCategory) {
		self.mark_dismissed_at(key, category, Utc::now());
	}

	/// Overwrites the record for `key` with `category` stamped at `now`.
	/// Store failures are logged; the dismissal then only lasts this session's view.
	pub fn mark_dismissed_at(&self, key: &OperationKey, category: SeenCategory, now: DateTime<Utc>) {
		let mut records = match self.load() {
			Ok(records) => records,
			Err(e) => {
				warn!(%key, error = %e, "seen ledger unreadable, starting a fresh map");
				IndexMap::new()
			}
		};
		records.insert(key.to_string(), SeenRecord { category, timestamp: now });
		if let Err(e) = write_json(self.store.as_ref(), SEEN_KEY, &records) {
			warn!(%key, %category, error = %e, "failed to persist dismissal");
		}
	}

	/// Drops every record.
	pub fn clear(&self) {
		if let Err(e) = self.store.remove(SEEN_KEY) {
			warn!(error = %e, "failed to clear seen ledger");
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::{Duration, TimeZone};
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::store::MemoryStore;
	use crate::store::tests::UnavailableStore;

	fn t0() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap()
	}

	fn key() -> OperationKey {
		OperationKey::new("get", "/api/todo/{id}")
	}

	#[test]
	fn unseen_key_is_not_dismissed() {
		let ledger = SeenLedger::new(Arc::new(MemoryStore::new()));
		assert!(!ledger.is_recently_dismissed_at(&key(), t0()));
		assert!(ledger.records().is_empty());
	}

	#[test]
	fn dismissal_sticks_for_every_later_check() {
		let ledger = SeenLedger::new(Arc::new(MemoryStore::new()));
		ledger.mark_dismissed_at(&key(), SeenCategory::Status, t0());
		for days in [0, 1, 4, 5, 30, 365] {
			assert!(ledger.is_recently_dismissed_at(&key(), t0() + Duration::days(days)));
		}
	}

	#[test]
	fn sticky_policy_refreshes_lapsed_timestamp() {
		let ledger = SeenLedger::new(Arc::new(MemoryStore::new()));
		ledger.mark_dismissed_at(&key(), SeenCategory::NewApi, t0());

		let later = t0() + Duration::days(3);
		assert!(ledger.is_recently_dismissed_at(&key(), later));
		assert_eq!(ledger.record(&key()).unwrap().timestamp, t0());

		let lapsed = t0() + Duration::days(5);
		assert!(ledger.is_recently_dismissed_at(&key(), lapsed));
		assert_eq!(
			ledger.record(&key()),
			Some(SeenRecord {
				category: SeenCategory::NewApi,
				timestamp: lapsed,
			})
		);
	}

	#[test]
	fn rearm_policy_lets_lapsed_badges_return() {
		let ledger = SeenLedger::new(Arc::new(MemoryStore::new())).with_policy(RearmPolicy::Rearm);
		ledger.mark_dismissed_at(&key(), SeenCategory::Status, t0());
		assert!(ledger.is_recently_dismissed_at(&key(), t0() + Duration::days(4)));
		assert!(!ledger.is_recently_dismissed_at(&key(), t0() + Duration::days(5)));
		assert_eq!(ledger.record(&key()).unwrap().timestamp, t0());
	}

	#[test]
	fn classify_uses_fractional_days() {
		let record = SeenRecord {
			category: SeenCategory::Status,
			timestamp: t0(),
		};
		assert_eq!(classify(None, t0(), 5.0), SeenVerdict::Unseen);
		assert_eq!(classify(Some(&record), t0() + Duration::hours(119), 5.0), SeenVerdict::Fresh);
		assert_eq!(classify(Some(&record), t0() + Duration::hours(120), 5.0), SeenVerdict::Lapsed);
		assert!((elapsed_days(t0(), t0() + Duration::hours(36)) - 1.5).abs() < f64::EPSILON);
	}

	#[test]
	fn persisted_layout_matches_browser_format() {
		let store = Arc::new(MemoryStore::new());
		let ledger = SeenLedger::new(store.clone());
		ledger.mark_dismissed_at(&key(), SeenCategory::NewApi, t0());

		let raw: serde_json::Value = serde_json::from_str(&store.get(SEEN_KEY).unwrap().unwrap()).unwrap();
		assert_eq!(raw["GET /api/todo/{id}"]["type"], "new");
		assert!(raw["GET /api/todo/{id}"]["timestamp"].as_str().unwrap().starts_with("2025-04-10T12:00:00"));

		store
			.set(SEEN_KEY, r#"{"POST /api/todo":{"type":"new-api","timestamp":"2025-04-10T12:00:00.000Z"}}"#)
			.unwrap();
		let record = ledger.record(&OperationKey::new("POST", "/api/todo")).unwrap();
		assert_eq!(record.category, SeenCategory::NewApi);
	}

	#[test]
	fn unavailable_store_degrades_to_not_dismissed() {
		let ledger = SeenLedger::new(Arc::new(UnavailableStore));
		ledger.mark_dismissed_at(&key(), SeenCategory::Status, t0());
		assert!(!ledger.is_recently_dismissed_at(&key(), t0()));
		assert!(ledger.records().is_empty());
	}

	#[test]
	fn clear_drops_all_records() {
		let ledger = SeenLedger::new(Arc::new(MemoryStore::new()));
		ledger.mark_dismissed_at(&key(), SeenCategory::Status, t0());
		ledger.clear();
		assert!(!ledger.is_recently_dismissed_at(&key(), t0()));
	}
}
