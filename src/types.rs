//! Core type definitions for the cost accrual framework.
//!
//! This module defines the fundamental types used throughout the crate.

/// Simulation time in seconds.
///
/// All trigger occurrences, cost tuples, and report samples share the same
/// `SimTime` representation, provided by the simulation clock. Within a run
/// the clock is monotonically non-decreasing.
pub type SimTime = f64;

/// Unique, stable identifier of a simulated resource.
///
/// Opaque to this crate; assigned by the surrounding topology model and
/// unique within a run.
pub type ResourceId = String;

/// Unique identifier for a periodic trigger.
///
/// Assigned by the scheduler when a trigger is created; callers hold it
/// wrapped in a `TriggerHandle`.
pub type TriggerId = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_aliases() {
        let time: SimTime = 10.5;
        let resource: ResourceId = "server-1".to_string();
        let trigger: TriggerId = 7;

        assert_eq!(time, 10.5);
        assert_eq!(resource, "server-1");
        assert_eq!(trigger, 7);
    }
}
