//! Diagnostic session: drives the bisector against a live store.

use crate::bisect::{bisect, BisectOutcome, Orientation, Probe};
use crate::error::{Result, StoreError};
use crate::snapshot::SnapshotStore;
use crate::types::{CommitId, Version};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One inspection request: which key, where, over what range.
#[derive(Clone, Debug)]
pub struct SessionRequest {
    /// Namespace to inspect.
    pub namespace: String,

    /// Key whose presence is bisected on.
    pub key: Vec<u8>,

    /// Lower search bound; defaults to the store's retained floor.
    pub low: Option<Version>,

    /// Upper search bound; defaults to the latest committed version.
    pub high: Option<Version>,

    /// Search orientation; `FalseToTrue` finds where the key appeared.
    pub orientation: Orientation,

    /// Hard probe budget; safety net against a runaway search.
    pub max_probes: Option<u32>,
}

impl SessionRequest {
    pub fn new(namespace: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            low: None,
            high: None,
            orientation: Orientation::FalseToTrue,
            max_probes: None,
        }
    }
}

/// Outcome of one diagnostic run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub namespace: String,

    /// Hex encoding of the inspected key.
    pub key: String,

    /// Bounds actually searched after defaulting.
    pub low: Version,
    pub high: Version,

    pub orientation: Orientation,
    pub outcome: BisectOutcome,

    /// Every version checked, in probe order, with the lookup result.
    pub probes: Vec<Probe>,

    /// Commit of the last version loaded during the search.
    pub last_commit: Option<CommitId>,
}

/// Orchestrates load-and-inspect cycles over the store.
///
/// The session is the only component that performs loads; the bisector
/// sees nothing but a predicate over versions.
pub struct DiagnosticSession {
    store: SnapshotStore,
}

impl DiagnosticSession {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// The underlying store, for follow-up inspection after a run.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SnapshotStore {
        &mut self.store
    }

    /// Run one end-to-end bisection.
    ///
    /// Validates the namespace up front, defaults the range to the
    /// retained history, and probes by loading each candidate version and
    /// checking the key. A store failure mid-search aborts the run and
    /// surfaces the error together with the last successfully loaded
    /// version in the logs.
    pub fn run(&mut self, request: &SessionRequest) -> Result<SessionReport> {
        self.run_with_observer(request, |_| {})
    }

    /// Like [`run`](Self::run), calling `observer` after every probe so a
    /// caller can stream progress as the search narrows.
    pub fn run_with_observer(
        &mut self,
        request: &SessionRequest,
        mut observer: impl FnMut(&Probe),
    ) -> Result<SessionReport> {
        if !self
            .store
            .namespaces()
            .iter()
            .any(|n| n == &request.namespace)
        {
            return Err(StoreError::UnknownNamespace(request.namespace.clone()));
        }

        // Explicit bounds are clamped to the retained history: a request
        // reaching below the pruning floor or past the latest commit
        // searches what is actually there. The report carries the clamped
        // bounds.
        let floor = self.store.retained_floor();
        let latest = self.store.latest_version();
        let low = request.low.unwrap_or(floor).max(floor);
        let high = request.high.unwrap_or(latest).min(latest);

        info!(
            namespace = %request.namespace,
            key = %hex::encode(&request.key),
            low = low.0,
            high = high.0,
            "starting bisection"
        );

        let store = &mut self.store;
        let namespace = request.namespace.as_str();
        let key = request.key.as_slice();

        let result = bisect(low, high, request.orientation, request.max_probes, |v| {
            store.load(v)?;
            let view = store.namespace(namespace)?;
            let present = view.has(key);
            info!(version = v.0, present, "probed version");
            observer(&Probe {
                version: v,
                result: present,
            });
            Ok(present)
        });

        let last_commit = self.store.active_commit();
        let report = match result {
            Ok(r) => r,
            Err(e) => {
                if let Some(commit) = last_commit {
                    warn!(last_good = %commit, "search aborted; last loaded version noted");
                }
                return Err(e);
            }
        };

        match report.outcome {
            BisectOutcome::Boundary(b) => info!(boundary = b.0, "transition located"),
            BisectOutcome::NoTransition => info!("no transition over the searched range"),
        }

        Ok(SessionReport {
            namespace: request.namespace.clone(),
            key: hex::encode(&request.key),
            low,
            high,
            orientation: report.orientation,
            outcome: report.outcome,
            probes: report.probes,
            last_commit,
        })
    }
}
