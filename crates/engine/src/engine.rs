//! The engine object: one per rendering surface.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap as HashMap;
use specmark_primitives::SpecDocument;
use specmark_state::{BookmarkStore, KeyValueStore, SeenLedger};
use tracing::{debug, info, trace};

use crate::annotate::{
	Activated, Activation, Annotator, AnnotatorRegistry, AuthorLabeler, BADGE_CLASS_PREFIX, BOOKMARK_WRAPPER_CLASS, BookmarkAnnotator,
	NEW_API_BADGE_CLASS, NEW_API_CLASS, NewApiAnnotator, PassContext, PassReport, STATUS_CLASS_PREFIX, StatusAnnotator,
};
use crate::bridge::ChangeBridge;
use crate::config::EngineConfig;
use crate::correlate::correlate;
use crate::documents::Documents;
use crate::view::{NodeId, Slot, ViewTree};

/// Owns the annotator pipeline, the stores it reads and writes, the click
/// bindings it produced and its change bridge.
#[derive(Debug)]
pub struct Engine {
	spec: SpecDocument,
	documents: Documents,
	config: EngineConfig,
	ledger: SeenLedger,
	bookmarks: BookmarkStore,
	annotators: AnnotatorRegistry,
	side_tasks: AnnotatorRegistry,
	activations: HashMap<NodeId, Activation>,
	bridge: ChangeBridge,
}

impl Engine {
	/// Engine with empty pipelines. `store` backs both the ledger and the
	/// bookmark list.
	pub fn new(spec: SpecDocument, documents: Documents, store: Arc<dyn KeyValueStore>, config: EngineConfig) -> Self {
		let ledger = SeenLedger::new(store.clone())
			.with_threshold_days(config.seen.threshold_days)
			.with_policy(config.seen.policy);
		Self {
			spec,
			documents,
			config,
			ledger,
			bookmarks: BookmarkStore::new(store),
			annotators: AnnotatorRegistry::new(),
			side_tasks: AnnotatorRegistry::new(),
			activations: HashMap::default(),
			bridge: ChangeBridge::new(),
		}
	}

	/// Engine with the status, NEW and bookmark annotators and the author
	/// labeling side task.
	pub fn with_default_annotators(spec: SpecDocument, documents: Documents, store: Arc<dyn KeyValueStore>, config: EngineConfig) -> Self {
		let mut engine = Self::new(spec, documents, store, config);
		engine.register(NewApiAnnotator);
		engine.register(StatusAnnotator);
		engine.register(BookmarkAnnotator);
		engine.register_side_task(AuthorLabeler);
		engine
	}

	pub fn register(&mut self, annotator: impl Annotator + 'static) {
		self.annotators.register(annotator);
	}

	/// Registers a task that runs after the annotators on every pass.
	pub fn register_side_task(&mut self, task: impl Annotator + 'static) {
		self.side_tasks.register(task);
	}

	pub fn spec(&self) -> &SpecDocument {
		&self.spec
	}

	/// Replaces the specification, e.g. after the renderer reloads it.
	pub fn set_spec(&mut self, spec: SpecDocument) {
		self.spec = spec;
	}

	pub fn documents(&self) -> &Documents {
		&self.documents
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn ledger(&self) -> &SeenLedger {
		&self.ledger
	}

	pub fn bookmarks(&self) -> &BookmarkStore {
		&self.bookmarks
	}

	pub fn bridge(&self) -> &ChangeBridge {
		&self.bridge
	}

	/// Elements that currently respond to [`activate`](Self::activate).
	pub fn activation(&self, element: NodeId) -> Option<&Activation> {
		self.activations.get(&element)
	}

	pub fn apply_all(&mut self, view: &mut dyn ViewTree) -> PassReport {
		self.apply_all_at(view, Utc::now())
	}

	/// Correlates every rendered block and runs the annotators, then the side
	/// tasks, on each. Uncorrelated blocks are skipped.
	pub fn apply_all_at(&mut self, view: &mut dyn ViewTree, now: DateTime<Utc>) -> PassReport {
		let pass = PassContext {
			now,
			ledger: &self.ledger,
			bookmarks: &self.bookmarks,
			documents: &self.documents,
			config: &self.config,
		};
		let mut report = PassReport::default();
		let mut activations = Vec::new();

		for block in view.operation_blocks() {
			let Some(ctx) = correlate(view, block, &self.spec) else {
				report.skipped += 1;
				continue;
			};
			report.correlated += 1;
			self.annotators.apply(view, &ctx, &pass, &mut report, &mut activations);
			self.side_tasks.apply(view, &ctx, &pass, &mut report, &mut activations);
		}

		report.activations = activations.len();
		self.activations.retain(|id, _| view.contains(*id));
		self.activations.extend(activations.into_iter().map(|a| (a.element, a)));
		debug!(
			correlated = report.correlated,
			skipped = report.skipped,
			activations = report.activations,
			failures = report.failures.len(),
			"annotation pass complete"
		);
		report
	}

	pub fn activate(&mut self, view: &mut dyn ViewTree, element: NodeId) -> Option<Activated> {
		self.activate_at(view, element, Utc::now())
	}

	/// Runs the command bound to `element`, as a click would. One-shot
	/// bindings are consumed. Returns `None` when nothing is bound.
	pub fn activate_at(&mut self, view: &mut dyn ViewTree, element: NodeId, now: DateTime<Utc>) -> Option<Activated> {
		if !view.contains(element) {
			self.activations.remove(&element);
			trace!(%element, "activation target detached");
			return None;
		}
		let activation = self.activations.get(&element)?;
		let command = activation.command.clone();
		if activation.once {
			self.activations.remove(&element);
		}
		Some(command.execute(view, &self.ledger, &self.bookmarks, now))
	}

	/// Runs the initial pass and starts watching `root` for re-renders.
	pub fn on_render_complete(&mut self, view: &mut dyn ViewTree, root: NodeId) -> PassReport {
		let report = self.apply_all(view);
		self.start(view, root);
		info!(correlated = report.correlated, "initial annotation pass complete");
		report
	}

	pub fn start(&mut self, view: &mut dyn ViewTree, root: NodeId) {
		self.bridge.start(view, root);
	}

	pub fn stop(&mut self, view: &mut dyn ViewTree) {
		self.bridge.stop(view);
	}

	pub fn pump(&mut self, view: &mut dyn ViewTree) -> Option<PassReport> {
		self.pump_at(view, Utc::now())
	}

	/// Applies a pass if the bridge has queued mutations. The subscription is
	/// disconnected for the duration of the pass.
	pub fn pump_at(&mut self, view: &mut dyn ViewTree, now: DateTime<Utc>) -> Option<PassReport> {
		let records = self.bridge.begin_batch(view)?;
		trace!(records = records.len(), "re-running annotation pass");
		let report = self.apply_all_at(view, now);
		self.bridge.end_batch(view);
		Some(report)
	}

	/// Rendered NEW badges.
	pub fn new_api_count(&self, view: &dyn ViewTree) -> usize {
		view.find_all_by_class(view.root(), NEW_API_BADGE_CLASS).len()
	}

	/// Removes status badges, status classes and bookmark controls.
	pub fn reset_status_highlights(&mut self, view: &mut dyn ViewTree) {
		for block in view.operation_blocks() {
			if let Some(wrapper) = view.slot(block, Slot::DescriptionWrapper) {
				for badge in view.find_all_by_class_prefix(wrapper, BADGE_CLASS_PREFIX) {
					if let Err(e) = view.remove(badge) {
						trace!(%badge, error = %e, "status badge already detached");
					}
				}
			}
			for class in view.classes(block).into_iter().filter(|c| c.starts_with(STATUS_CLASS_PREFIX)) {
				if let Err(e) = view.remove_class(block, &class) {
					trace!(%block, error = %e, "failed to clear status class");
				}
			}
			for control in view.find_all_by_class(block, BOOKMARK_WRAPPER_CLASS) {
				if let Err(e) = view.remove(control) {
					trace!(%control, error = %e, "bookmark control already detached");
				}
			}
		}
		self.activations.retain(|id, _| view.contains(*id));
	}

	/// Removes NEW badges and the highlight class.
	pub fn reset_new_api_highlights(&mut self, view: &mut dyn ViewTree) {
		for block in view.operation_blocks() {
			for badge in view.find_all_by_class(block, NEW_API_BADGE_CLASS) {
				if let Err(e) = view.remove(badge) {
					trace!(%badge, error = %e, "NEW badge already detached");
				}
			}
			if let Err(e) = view.remove_class(block, NEW_API_CLASS) {
				trace!(%block, error = %e, "failed to clear NEW highlight");
			}
		}
		self.activations.retain(|id, _| view.contains(*id));
	}
}
