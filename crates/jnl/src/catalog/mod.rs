mod entry;
pub use entry::Entry;

mod index;
pub use index::CatalogIndex;

mod snapshot;
pub use snapshot::{EntryRecord, Snapshot};
