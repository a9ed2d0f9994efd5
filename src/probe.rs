//! Reporting pipeline seam.
//!
//! Cost samples leave this crate through the [`ProbeSink`] trait. The
//! surrounding metrics framework provides the real sink; [`MemorySink`]
//! is a simple recording implementation for tests and examples.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::types::SimTime;

/// The kind of cost metric a report trigger produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Cost accrued since the previous report firing.
    CostOverTime,
    /// Cumulative cost accrued since the start of the run.
    AggregatedCostOverTime,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::CostOverTime => write!(f, "cost_over_time"),
            MetricKind::AggregatedCostOverTime => write!(f, "aggregated_cost_over_time"),
        }
    }
}

/// A single cost measurement forwarded to the reporting pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// The metric this sample belongs to
    pub metric: MetricKind,
    /// The measuring point the sample was taken at
    pub measuring_point: String,
    /// Simulation time at which the sample was taken
    pub time: SimTime,
    /// The measured cost value
    pub value: f64,
}

/// Consumer of cost samples.
///
/// Implementations must not block: samples are emitted synchronously from
/// trigger actions on the simulation timeline, so any downstream I/O has to
/// be fire-and-forget or already asynchronous at a lower layer.
pub trait ProbeSink {
    /// Delivers one sample to the reporting pipeline.
    fn emit_sample(&self, metric: MetricKind, measuring_point: &str, time: SimTime, value: f64);
}

/// A probe sink that records every sample in memory.
///
/// Useful for verifying report output in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    samples: RefCell<Vec<Sample>>,
}

impl MemorySink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded samples in emission order.
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.borrow().clone()
    }

    /// Returns the recorded samples for one metric, in emission order.
    pub fn by_metric(&self, metric: MetricKind) -> Vec<Sample> {
        self.samples
            .borrow()
            .iter()
            .filter(|s| s.metric == metric)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.borrow().len()
    }

    /// Returns true if no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.borrow().is_empty()
    }
}

impl ProbeSink for MemorySink {
    fn emit_sample(&self, metric: MetricKind, measuring_point: &str, time: SimTime, value: f64) {
        self.samples.borrow_mut().push(Sample {
            metric,
            measuring_point: measuring_point.to_string(),
            time,
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.emit_sample(MetricKind::CostOverTime, "env", 10.0, 5.0);
        sink.emit_sample(MetricKind::AggregatedCostOverTime, "env", 10.0, 15.0);

        assert_eq!(sink.len(), 2);
        let samples = sink.samples();
        assert_eq!(samples[0].metric, MetricKind::CostOverTime);
        assert_eq!(samples[0].value, 5.0);
        assert_eq!(samples[1].value, 15.0);
    }

    #[test]
    fn test_by_metric_filter() {
        let sink = MemorySink::new();
        sink.emit_sample(MetricKind::CostOverTime, "env", 0.0, 1.0);
        sink.emit_sample(MetricKind::AggregatedCostOverTime, "env", 0.0, 1.0);
        sink.emit_sample(MetricKind::CostOverTime, "env", 10.0, 2.0);

        let raw = sink.by_metric(MetricKind::CostOverTime);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1].time, 10.0);
    }

    #[test]
    fn test_metric_kind_serialization() {
        let json = serde_json::to_string(&MetricKind::CostOverTime).unwrap();
        assert_eq!(json, "\"cost_over_time\"");

        let kind: MetricKind = serde_json::from_str("\"aggregated_cost_over_time\"").unwrap();
        assert_eq!(kind, MetricKind::AggregatedCostOverTime);
    }
}
