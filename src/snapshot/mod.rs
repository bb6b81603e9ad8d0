//! Versioned snapshot store split into submodules:
//! - store.rs: `SnapshotStore` (open/lock, load, single active slot).
//! - view.rs: `NamespaceView` (get/has/scan over one namespace).
//! - format.rs: on-disk layout (manifest, version files, checksums).
//! - builder.rs: `StoreBuilder` fixture writer.

pub mod builder;
pub mod format;
pub mod store;
pub mod view;

pub use builder::StoreBuilder;
pub use store::{SnapshotStore, StoreConfig};
pub use view::NamespaceView;
