//! Annotation and seen-state engine.
//!
//! An [`Engine`] correlates rendered operation blocks of a [`ViewTree`] with
//! the specification, runs its annotators over each one, binds the clickable
//! elements they insert to [`Command`]s, and re-runs the pipeline on mutation
//! batches delivered through its [`ChangeBridge`].
//!
//! ```ignore
//! let loaded = load_documents(&DirectorySource::new(dir)).await?;
//! let mut view = HeadlessView::render(&loaded.spec);
//! let mut engine = Engine::with_default_annotators(loaded.spec, loaded.documents, store, config);
//! let root = view.root();
//! engine.on_render_complete(&mut view, root);
//! // ... renderer mutates the view ...
//! engine.pump(&mut view);
//! ```

pub mod annotate;
pub mod bridge;
pub mod config;
pub mod correlate;
pub mod documents;
mod engine;
pub mod view;

pub use annotate::{Activated, Activation, AnnotateError, Annotator, AnnotatorRegistry, Command, PassContext, PassReport};
pub use bridge::{BridgeState, ChangeBridge};
pub use config::{ConfigError, EngineConfig, load_config};
pub use correlate::{OperationContext, correlate};
pub use documents::{DirectorySource, DocumentError, DocumentSource, Documents, LoadedDocuments, load_documents};
pub use engine::Engine;
pub use view::{Element, HeadlessView, NodeId, Slot, ViewError, ViewTree};
