use specmark_state::SeenCategory;
use tracing::debug;

use super::{Activation, AnnotateError, Annotator, Command, PassContext};
use crate::correlate::OperationContext;
use crate::view::{Element, ViewTree};

/// Block class prefix, followed by the status label.
pub const STATUS_CLASS_PREFIX: &str = "status-";
/// Badge class prefix, followed by the status label.
pub const BADGE_CLASS_PREFIX: &str = "badge-";

/// Marks operations with the work status found in the status map.
///
/// Badges for dismissible glyphs disappear on click and stay hidden while the
/// ledger reports the operation as dismissed.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusAnnotator;

impl Annotator for StatusAnnotator {
	fn name(&self) -> &'static str {
		"status"
	}

	fn annotate(&self, view: &mut dyn ViewTree, ctx: &OperationContext<'_>, pass: &PassContext<'_>) -> Result<Vec<Activation>, AnnotateError> {
		let Some(status_map) = pass.documents.status.as_ref() else {
			return Ok(Vec::new());
		};
		let Some(status) = status_map.resolve(&ctx.path, &ctx.summary_text) else {
			return Ok(Vec::new());
		};
		let Some(wrapper) = ctx.description_wrapper else {
			return Ok(Vec::new());
		};

		let dismissible = pass.config.status.is_dismissible(status.glyph);
		if dismissible && pass.ledger.is_recently_dismissed_at(&ctx.key, pass.now) {
			return Ok(Vec::new());
		}

		let status_class = format!("{STATUS_CLASS_PREFIX}{}", status.label);
		view.add_class(ctx.block, &status_class)?;

		let badge_class = format!("{BADGE_CLASS_PREFIX}{}", status.label);
		if view.find_by_class(wrapper, &badge_class).is_some() {
			return Ok(Vec::new());
		}
		let badge = view.append(
			wrapper,
			Element::new("span")
				.with_class(badge_class)
				.with_text(status.label)
				.with_attribute("data-status", status.label),
		)?;
		debug!(key = %ctx.key, status = status.label, dismissible, "status badge added");

		if !dismissible {
			return Ok(Vec::new());
		}
		Ok(vec![Activation::once(
			badge,
			Command::Dismiss {
				key: ctx.key.clone(),
				category: SeenCategory::Status,
				block: ctx.block,
				badge,
				cleared_class: status_class,
			},
		)])
	}
}
