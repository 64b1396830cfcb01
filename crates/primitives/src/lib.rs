//! Core types shared by every specmark crate: operation keys, bookmark
//! identities, the specification document model and the backend metadata maps.

/// Bookmark identities and the path-segment mapping shared with the filter.
pub mod identity;
/// Status glyph and creation-date metadata documents.
pub mod metadata;
/// Operation keys and HTTP method helpers.
pub mod operation;
/// Specification document model (tags, paths, operations).
pub mod document;

pub use document::{Operation, PathItem, SpecDocument, TagObject};
pub use identity::{BookmarkIdentity, PathSegments, compose_path};
pub use metadata::{ControllerMeta, CreatedDateMap, MethodMeta, StatusMap, StatusMatch, day_difference};
pub use operation::{HTTP_METHODS, OperationKey, ParseKeyError, is_http_method};
