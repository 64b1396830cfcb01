//! Browser-local state of the annotation engine.
//!
//! Everything here sits on a [`KeyValueStore`]: a synchronous, best-effort
//! string store with no transactions. Reads always go back to the store and
//! writes go straight through, so independently constructed ledgers and
//! bookmark stores over the same store never see stale data.
//!
//! Persisted layout:
//!
//! | key | value |
//! |---|---|
//! | `seenApis` | `{ "METHOD path": { "type": "status" \| "new", "timestamp": ISO-8601 } }` |
//! | `usedPath` | `[ { rootTagName, subTagName, method, rootPath, subPath } ]` |
//! | `apiTreeOrder` | `[ rootId, ... ]` |
//! | `apiTreeStructure` | opaque sidebar structure JSON |

pub mod bookmarks;
pub mod file_store;
pub mod layout;
pub mod ledger;
pub mod store;

pub use bookmarks::{BookmarkStore, USED_PATH_KEY};
pub use file_store::JsonFileStore;
pub use layout::{SidebarLayout, TREE_ORDER_KEY, TREE_STRUCTURE_KEY};
pub use ledger::{RearmPolicy, SEEN_KEY, SeenCategory, SeenLedger, SeenRecord, SeenVerdict, classify, elapsed_days};
pub use store::{KeyValueStore, MemoryStore, ScopedStore, StoreError, read_json, write_json};
