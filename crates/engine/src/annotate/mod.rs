//! Annotator pipeline.
//!
//! An [`Annotator`] decorates one correlated operation and returns the
//! [`Activation`]s for any clickable element it inserted. The engine keeps the
//! activations and runs their [`Command`] when the element is clicked, so
//! annotators never hold on to view handles or callbacks between passes.
//!
//! Every annotator must be idempotent: a pass may visit the same block any
//! number of times, so each one checks for its own marker before inserting.

use chrono::{DateTime, Utc};
use specmark_primitives::{BookmarkIdentity, OperationKey};
use specmark_state::{BookmarkStore, SeenCategory, SeenLedger, StoreError};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::correlate::OperationContext;
use crate::documents::Documents;
use crate::view::{NodeId, Slot, ViewError, ViewTree};

mod author;
mod bookmark;
mod new_api;
mod status;

pub use author::{AUTHOR_MARK, AuthorLabeler, has_author_prefix};
pub use bookmark::{BOOKMARK_CLASS, BOOKMARK_WRAPPER_CLASS, BOOKMARKED_CLASS, BookmarkAnnotator, bookmark_icon};
pub use new_api::{NEW_API_BADGE_CLASS, NEW_API_CLASS, NewApiAnnotator};
pub use status::{BADGE_CLASS_PREFIX, STATUS_CLASS_PREFIX, StatusAnnotator};

#[derive(Debug, Error)]
pub enum AnnotateError {
	#[error(transparent)]
	View(#[from] ViewError),
	#[error("operation block has no {0:?} slot")]
	MissingSlot(Slot),
	#[error(transparent)]
	Store(#[from] StoreError),
	#[error("{0}")]
	Custom(String),
}

/// Read-only state shared by every annotator during one pass.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
	pub now: DateTime<Utc>,
	pub ledger: &'a SeenLedger,
	pub bookmarks: &'a BookmarkStore,
	pub documents: &'a Documents,
	pub config: &'a EngineConfig,
}

pub trait Annotator {
	fn name(&self) -> &'static str;

	fn annotate(&self, view: &mut dyn ViewTree, ctx: &OperationContext<'_>, pass: &PassContext<'_>) -> Result<Vec<Activation>, AnnotateError>;
}

/// Action bound to a clickable element.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	/// Records a dismissal, then removes `badge` and `cleared_class` from `block`.
	Dismiss {
		key: OperationKey,
		category: SeenCategory,
		block: NodeId,
		badge: NodeId,
		cleared_class: String,
	},
	/// Flips bookmark membership and redraws `control`.
	ToggleBookmark { identity: BookmarkIdentity, control: NodeId },
}

/// Result of running a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Activated {
	Dismissed { key: OperationKey, category: SeenCategory },
	Bookmark { identity: BookmarkIdentity, bookmarked: bool },
}

impl Command {
	/// Applies the command. View errors are logged; the store write has
	/// already happened by then.
	pub fn execute(&self, view: &mut dyn ViewTree, ledger: &SeenLedger, bookmarks: &BookmarkStore, now: DateTime<Utc>) -> Activated {
		match self {
			Self::Dismiss {
				key,
				category,
				block,
				badge,
				cleared_class,
			} => {
				ledger.mark_dismissed_at(key, *category, now);
				if let Err(e) = view.remove(*badge) {
					trace!(%key, error = %e, "dismissed badge already gone");
				}
				if let Err(e) = view.remove_class(*block, cleared_class) {
					trace!(%key, error = %e, "dismissed block already gone");
				}
				debug!(%key, %category, "badge dismissed");
				Activated::Dismissed {
					key: key.clone(),
					category: *category,
				}
			}
			Self::ToggleBookmark { identity, control } => {
				let bookmarked = bookmarks.toggle(identity);
				if let Err(e) = bookmark::redraw(view, *control, bookmarked) {
					trace!(sub_tag = %identity.sub_tag_name, error = %e, "bookmark control already gone");
				}
				Activated::Bookmark {
					identity: identity.clone(),
					bookmarked,
				}
			}
		}
	}
}

/// Clickable element and what clicking it does.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
	pub element: NodeId,
	pub command: Command,
	/// Dropped after the first click.
	pub once: bool,
}

impl Activation {
	pub fn once(element: NodeId, command: Command) -> Self {
		Self { element, command, once: true }
	}

	pub fn persistent(element: NodeId, command: Command) -> Self {
		Self {
			element,
			command,
			once: false,
		}
	}
}

/// Annotator that failed on one operation.
#[derive(Debug)]
pub struct AnnotatorFailure {
	pub annotator: &'static str,
	pub key: OperationKey,
	pub error: AnnotateError,
}

/// Outcome of one pass over the view.
#[derive(Debug, Default)]
pub struct PassReport {
	/// Blocks matched to a specification operation.
	pub correlated: usize,
	/// Blocks that could not be matched.
	pub skipped: usize,
	pub activations: usize,
	pub failures: Vec<AnnotatorFailure>,
}

impl PassReport {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Ordered list of annotators.
#[derive(Default)]
pub struct AnnotatorRegistry {
	annotators: Vec<Box<dyn Annotator>>,
}

impl std::fmt::Debug for AnnotatorRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.names()).finish()
	}
}

impl AnnotatorRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `annotator`; annotators run in registration order.
	pub fn register(&mut self, annotator: impl Annotator + 'static) {
		self.annotators.push(Box::new(annotator));
	}

	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.annotators.iter().map(|a| a.name())
	}

	pub fn len(&self) -> usize {
		self.annotators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.annotators.is_empty()
	}

	/// Runs every annotator on `ctx`. A failing annotator is logged and
	/// recorded in `report`; the rest still run.
	pub fn apply(
		&self,
		view: &mut dyn ViewTree,
		ctx: &OperationContext<'_>,
		pass: &PassContext<'_>,
		report: &mut PassReport,
		activations: &mut Vec<Activation>,
	) {
		for annotator in &self.annotators {
			match annotator.annotate(view, ctx, pass) {
				Ok(produced) => activations.extend(produced),
				Err(error) => {
					warn!(annotator = annotator.name(), key = %ctx.key, error = %error, "annotator failed");
					report.failures.push(AnnotatorFailure {
						annotator: annotator.name(),
						key: ctx.key.clone(),
						error,
					});
				}
			}
		}
	}
}
