//! Change-notification bridge.
//!
//! Watches a view subtree and hands mutation batches to the engine. While a
//! batch is being applied the subscription is disconnected, so the pass never
//! observes its own writes; it is reconnected once the pass is done.
//!
//! States: `Idle -> Subscribed` on [`start`](ChangeBridge::start),
//! `Subscribed -> Applying -> Subscribed` around each batch, and back to
//! `Idle` on [`stop`](ChangeBridge::stop).

use tracing::{debug, trace, warn};

use crate::view::{MutationRecord, NodeId, SubscriptionId, ViewTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
	Idle,
	Subscribed { root: NodeId, subscription: SubscriptionId },
	/// A batch is being applied; the subscription is disconnected.
	Applying { root: NodeId },
}

#[derive(Debug)]
pub struct ChangeBridge {
	state: BridgeState,
}

impl Default for ChangeBridge {
	fn default() -> Self {
		Self::new()
	}
}

impl ChangeBridge {
	pub const fn new() -> Self {
		Self { state: BridgeState::Idle }
	}

	pub fn state(&self) -> BridgeState {
		self.state
	}

	pub fn is_active(&self) -> bool {
		!matches!(self.state, BridgeState::Idle)
	}

	/// Subscribes to `root`, first dropping any existing subscription.
	pub fn start(&mut self, view: &mut dyn ViewTree, root: NodeId) {
		self.stop(view);
		let subscription = view.observe(root);
		debug!(%root, "change bridge started");
		self.state = BridgeState::Subscribed { root, subscription };
	}

	/// Drops the subscription. Safe to call in any state.
	pub fn stop(&mut self, view: &mut dyn ViewTree) {
		match std::mem::replace(&mut self.state, BridgeState::Idle) {
			BridgeState::Idle => {}
			BridgeState::Subscribed { root, subscription } => {
				view.disconnect(subscription);
				debug!(%root, "change bridge stopped");
			}
			BridgeState::Applying { root } => {
				debug!(%root, "change bridge stopped mid-batch");
			}
		}
	}

	/// Takes the pending mutation batch, if any, and moves to `Applying` with
	/// the subscription disconnected. The caller must follow up with
	/// [`end_batch`](Self::end_batch).
	pub fn begin_batch(&mut self, view: &mut dyn ViewTree) -> Option<Vec<MutationRecord>> {
		match self.state {
			BridgeState::Subscribed { root, subscription } => {
				let records = view.take_records(subscription);
				if records.is_empty() {
					return None;
				}
				view.disconnect(subscription);
				trace!(%root, records = records.len(), "applying mutation batch");
				self.state = BridgeState::Applying { root };
				Some(records)
			}
			BridgeState::Applying { root } => {
				warn!(%root, "mutation batch arrived while applying, ignoring");
				None
			}
			BridgeState::Idle => None,
		}
	}

	/// Reconnects after a batch. Does nothing unless `Applying`, so a
	/// [`stop`](Self::stop) during the batch is honored.
	pub fn end_batch(&mut self, view: &mut dyn ViewTree) {
		if let BridgeState::Applying { root } = self.state {
			let subscription = view.observe(root);
			self.state = BridgeState::Subscribed { root, subscription };
		}
	}
}
