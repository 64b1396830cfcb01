//! Prefixes operation descriptions with their author.

use tracing::trace;

use super::{Activation, AnnotateError, Annotator, PassContext};
use crate::correlate::OperationContext;
use crate::view::{Slot, ViewTree};

pub const AUTHOR_MARK: char = '✎';

/// Whether `text` already starts with `✎ <author> :`, ignoring whitespace
/// around the author.
pub fn has_author_prefix(text: &str, author: &str) -> bool {
	text.trim_start()
		.strip_prefix(AUTHOR_MARK)
		.map(str::trim_start)
		.and_then(|rest| rest.strip_prefix(author))
		.is_some_and(|rest| rest.trim_start().starts_with(':'))
}

/// Rewrites the description body to `✎ <author> : <text>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthorLabeler;

impl Annotator for AuthorLabeler {
	fn name(&self) -> &'static str {
		"author"
	}

	fn annotate(&self, view: &mut dyn ViewTree, ctx: &OperationContext<'_>, pass: &PassContext<'_>) -> Result<Vec<Activation>, AnnotateError> {
		let Some(body) = view.slot(ctx.block, Slot::DescriptionBody) else {
			return Ok(Vec::new());
		};
		let author = ctx
			.operation
			.operation_id
			.as_deref()
			.and_then(|id| pass.documents.created.as_ref()?.author(id))
			.unwrap_or(pass.config.labels.unknown_author.as_str());

		let text = view.text(body).unwrap_or_default();
		let text = text.trim();
		if has_author_prefix(text, author) {
			return Ok(Vec::new());
		}
		trace!(key = %ctx.key, author, "labelling description");
		view.set_text(body, &format!("{AUTHOR_MARK} {author} : {text}"))?;
		Ok(Vec::new())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefix_detection_tolerates_spacing() {
		assert!(has_author_prefix("✎ kim : Fetches", "kim"));
		assert!(has_author_prefix("  ✎kim: Fetches", "kim"));
		assert!(!has_author_prefix("✎ lee : Fetches", "kim"));
		assert!(!has_author_prefix("kim : Fetches", "kim"));
		assert!(!has_author_prefix("", "kim"));
	}
}
