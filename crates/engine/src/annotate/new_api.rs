use specmark_state::SeenCategory;
use tracing::debug;

use super::{Activation, AnnotateError, Annotator, Command, PassContext};
use crate::correlate::OperationContext;
use crate::view::{Element, ViewTree};

pub const NEW_API_BADGE_CLASS: &str = "new-api-badge";
/// Highlight class of a block carrying a NEW badge.
pub const NEW_API_CLASS: &str = "new-api";

/// Flags operations created within the configured number of days.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewApiAnnotator;

impl Annotator for NewApiAnnotator {
	fn name(&self) -> &'static str {
		"new-api"
	}

	fn annotate(&self, view: &mut dyn ViewTree, ctx: &OperationContext<'_>, pass: &PassContext<'_>) -> Result<Vec<Activation>, AnnotateError> {
		let Some(created) = pass.documents.created.as_ref() else {
			return Ok(Vec::new());
		};
		let Some(operation_id) = ctx.operation.operation_id.as_deref() else {
			return Ok(Vec::new());
		};
		if !created.is_recently_created(operation_id, pass.now, pass.config.new_api.threshold_days) {
			return Ok(Vec::new());
		}
		if pass.ledger.is_recently_dismissed_at(&ctx.key, pass.now) {
			return Ok(Vec::new());
		}
		let Some(wrapper) = ctx.description_wrapper else {
			return Ok(Vec::new());
		};
		if view.find_by_class(wrapper, NEW_API_BADGE_CLASS).is_some() {
			return Ok(Vec::new());
		}

		let badge = view.append(wrapper, Element::new("span").with_class(NEW_API_BADGE_CLASS).with_text("NEW"))?;
		view.add_class(ctx.block, NEW_API_CLASS)?;
		debug!(key = %ctx.key, operation_id, "NEW badge added");

		Ok(vec![Activation::once(
			badge,
			Command::Dismiss {
				key: ctx.key.clone(),
				category: SeenCategory::NewApi,
				block: ctx.block,
				badge,
				cleared_class: NEW_API_CLASS.to_string(),
			},
		)])
	}
}
