//! The cost ledger.
//!
//! An append-only, insertion-ordered record of every cost charge accrued
//! during a run. The ledger is pure data: triggers write into it through
//! [`CostLedger::record`], the report scheduler and tests read from it.
//! All mutation happens on the single simulation timeline, so no internal
//! locking is needed.

use serde::{Deserialize, Serialize};

use crate::error::{CostError, CostResult};
use crate::types::{ResourceId, SimTime};

/// One cost charge: a resource accrued `amount` at simulation time `time`.
///
/// Immutable once recorded. Timestamps of a single resource's tuples are
/// monotonically non-decreasing because they are produced by one periodic
/// trigger on a monotonic clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostTuple {
    /// The resource that accrued the cost
    pub resource_id: ResourceId,
    /// Simulation time of the charge
    pub time: SimTime,
    /// The charged amount
    pub amount: f64,
}

/// Append-only store of cost tuples.
#[derive(Debug, Default)]
pub struct CostLedger {
    tuples: Vec<CostTuple>,
}

impl CostLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cost tuple.
    ///
    /// A negative or non-finite amount is a caller programming error and is
    /// rejected as `InvalidInput` with nothing committed; it is never
    /// silently clamped.
    pub fn record(
        &mut self,
        resource_id: impl Into<ResourceId>,
        time: SimTime,
        amount: f64,
    ) -> CostResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CostError::InvalidInput(format!(
                "cost amount must be a non-negative number, got {amount}"
            )));
        }
        self.tuples.push(CostTuple {
            resource_id: resource_id.into(),
            time,
            amount,
        });
        Ok(())
    }

    /// Returns all tuples in insertion order.
    pub fn tuples(&self) -> &[CostTuple] {
        &self.tuples
    }

    /// Returns the tuples of one resource, in insertion order.
    pub fn by_resource(&self, resource_id: &str) -> Vec<&CostTuple> {
        self.tuples
            .iter()
            .filter(|t| t.resource_id == resource_id)
            .collect()
    }

    /// Returns the total cost accrued so far.
    pub fn total_cost(&self) -> f64 {
        self.tuples.iter().map(|t| t.amount).sum()
    }

    /// Returns the cost accrued strictly after simulation time `t`.
    pub fn cost_since(&self, t: SimTime) -> f64 {
        self.tuples
            .iter()
            .filter(|tuple| tuple.time > t)
            .map(|tuple| tuple.amount)
            .sum()
    }

    /// Returns the number of recorded tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Exports the ledger to CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("resource_id,time,amount\n");
        for t in &self.tuples {
            csv.push_str(&format!("{},{},{}\n", t.resource_id, t.time, t.amount));
        }
        csv
    }
}
