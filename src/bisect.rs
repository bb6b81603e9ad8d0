//! Bisection over a closed version range.
//!
//! Finds the boundary version at which a monotonic predicate changes truth
//! value. The search is pure: each candidate version is handed to a caller
//! supplied probe, which typically loads the version and inspects a
//! namespace. The bisector itself never touches the store.
//!
//! Correctness depends on the predicate being monotonic over the searched
//! range. That precondition is the caller's to guarantee; the endpoints are
//! sampled first, so a violation that is visible at the range ends fails
//! fast with [`StoreError::MonotonicityViolation`] instead of producing a
//! meaningless boundary. A violation confined to the interior cannot be
//! detected and yields an arbitrary transition point.

use crate::error::{Result, StoreError};
use crate::types::Version;
use serde::{Deserialize, Serialize};

/// Which way the predicate transitions across the range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Predicate is false below the boundary and true from it on.
    FalseToTrue,
    /// Predicate is true below the boundary and false from it on.
    TrueToFalse,
}

/// One predicate evaluation: the version probed and the raw result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub version: Version,
    pub result: bool,
}

/// Result of a completed search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BisectOutcome {
    /// Smallest version at which the predicate holds (for
    /// [`Orientation::FalseToTrue`]; symmetrically for the other
    /// orientation, the smallest version at which it no longer holds).
    Boundary(Version),

    /// The predicate never changed value over the searched range. This is
    /// a reportable outcome, not an error.
    NoTransition,
}

/// Full account of one bisection run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BisectReport {
    pub low: Version,
    pub high: Version,
    pub orientation: Orientation,
    pub outcome: BisectOutcome,

    /// Every probe performed, in order.
    pub probes: Vec<Probe>,
}

/// Bisect `[low, high]` for the version where `probe` changes value.
///
/// Probes the endpoints first, then halves the interior until
/// `high - low <= 1`. Equal endpoint values mean the predicate is constant
/// over the range: the search terminates with
/// [`BisectOutcome::NoTransition`] rather than looping. A probe error
/// aborts the search and propagates unchanged.
///
/// `max_probes`, when set, is a hard budget; a monotonic predicate always
/// converges within `ceil(log2(high - low)) + 2` probes, so the budget only
/// fires on runaway searches.
pub fn bisect<F>(
    low: Version,
    high: Version,
    orientation: Orientation,
    max_probes: Option<u32>,
    mut probe: F,
) -> Result<BisectReport>
where
    F: FnMut(Version) -> Result<bool>,
{
    if low > high {
        return Err(StoreError::InvalidRange { low, high });
    }

    let mut probes = Vec::new();
    let mut run = |version: Version, probes: &mut Vec<Probe>| -> Result<bool> {
        if let Some(budget) = max_probes {
            if probes.len() as u32 >= budget {
                return Err(StoreError::ProbeBudgetExhausted { budget });
            }
        }
        let result = probe(version)?;
        probes.push(Probe { version, result });
        // Normalize so the loop below always searches false -> true.
        Ok(match orientation {
            Orientation::FalseToTrue => result,
            Orientation::TrueToFalse => !result,
        })
    };

    let report = |outcome, probes| BisectReport {
        low,
        high,
        orientation,
        outcome,
        probes,
    };

    let at_low = run(low, &mut probes)?;
    if low == high {
        // A single version cannot exhibit a transition.
        return Ok(report(BisectOutcome::NoTransition, probes));
    }

    let at_high = run(high, &mut probes)?;
    match (at_low, at_high) {
        (true, true) | (false, false) => {
            return Ok(report(BisectOutcome::NoTransition, probes));
        }
        (true, false) => {
            return Err(StoreError::MonotonicityViolation { low, high });
        }
        (false, true) => {}
    }

    // Invariant: predicate is false at lo, true at hi. The gap strictly
    // shrinks every iteration, so termination is guaranteed.
    let mut lo = low;
    let mut hi = high;
    while hi.distance(lo) > 1 {
        let mid = lo.midpoint(hi);
        if run(mid, &mut probes)? {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Ok(report(BisectOutcome::Boundary(hi), probes))
}
