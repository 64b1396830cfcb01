use super::{Activation, AnnotateError, Annotator, Command, PassContext};
use crate::correlate::OperationContext;
use crate::view::{Element, NodeId, ViewError, ViewTree};

pub const BOOKMARK_CLASS: &str = "bookmark-toggle";
pub const BOOKMARK_WRAPPER_CLASS: &str = "bookmark-wrapper";
/// Extra class of a control whose operation is bookmarked.
pub const BOOKMARKED_CLASS: &str = "bookmarked";

/// Icon text for a control in the given state.
pub const fn bookmark_icon(bookmarked: bool) -> &'static str {
	if bookmarked { "bookmark" } else { "bookmark_add" }
}

/// Inserts a persistent bookmark toggle into each operation summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct BookmarkAnnotator;

impl Annotator for BookmarkAnnotator {
	fn name(&self) -> &'static str {
		"bookmark"
	}

	fn annotate(&self, view: &mut dyn ViewTree, ctx: &OperationContext<'_>, pass: &PassContext<'_>) -> Result<Vec<Activation>, AnnotateError> {
		let Some(summary) = ctx.summary else {
			return Ok(Vec::new());
		};
		let bookmarked = pass.bookmarks.contains(&ctx.identity);
		if let Some(existing) = view.find_by_class(summary, BOOKMARK_CLASS) {
			// Membership may have changed through the store since the last pass.
			redraw(view, existing, bookmarked)?;
			return Ok(Vec::new());
		}

		let wrapper = view.append(summary, Element::new("div").with_class(BOOKMARK_WRAPPER_CLASS))?;
		let mut control = Element::new("span").with_class(BOOKMARK_CLASS).with_text(bookmark_icon(bookmarked));
		if bookmarked {
			control = control.with_class(BOOKMARKED_CLASS);
		}
		let control = view.append(wrapper, control)?;

		Ok(vec![Activation::persistent(
			control,
			Command::ToggleBookmark {
				identity: ctx.identity.clone(),
				control,
			},
		)])
	}
}

pub(super) fn redraw(view: &mut dyn ViewTree, control: NodeId, bookmarked: bool) -> Result<(), ViewError> {
	view.set_text(control, bookmark_icon(bookmarked))?;
	if bookmarked {
		view.add_class(control, BOOKMARKED_CLASS)
	} else {
		view.remove_class(control, BOOKMARKED_CLASS)
	}
}
