//! # statebisect
//!
//! Operator diagnostic for a versioned, multi-namespace key-value state
//! store: load any retained historical version read-only, and bisect the
//! version history to find the exact version at which a key appeared in
//! (or disappeared from) a namespace.
//!
//! ## Core Concepts
//!
//! - **Versions**: each committed block produces a new immutable snapshot
//!   of every namespace; old versions stay queryable until pruned
//! - **Namespace views**: read-only accessors scoped to one sub-store at
//!   the loaded version; invalidated by construction on the next load
//! - **Bisection**: binary search over versions driven by a monotonic
//!   presence predicate
//!
//! ## Example
//!
//! ```ignore
//! use statebisect::{DiagnosticSession, SessionRequest, SnapshotStore, StoreConfig};
//!
//! let store = SnapshotStore::open(StoreConfig::new("./node-home/data"))?;
//! let mut session = DiagnosticSession::new(store);
//!
//! let report = session.run(&SessionRequest::new("stake", power_key))?;
//! println!("{:?}", report.outcome);
//! ```

pub mod bisect;
pub mod error;
pub mod session;
pub mod snapshot;
pub mod types;

// Re-exports
pub use bisect::{bisect, BisectOutcome, BisectReport, Orientation, Probe};
pub use error::{Result, StoreError};
pub use session::{DiagnosticSession, SessionReport, SessionRequest};
pub use snapshot::{NamespaceView, SnapshotStore, StoreBuilder, StoreConfig};
pub use types::{CommitId, Hash, Version};
