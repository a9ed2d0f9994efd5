//! Environment-level aggregate cost reporting.
//!
//! If the environment declares a report interval, the [`ReportScheduler`]
//! creates one periodic trigger per requested metric kind. Each firing
//! samples the ledger and forwards the value to the reporting pipeline,
//! time-stamped with the simulation clock at fire time. Report triggers are
//! never keyed by resource and are independent of per-resource triggers.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::CostResult;
use crate::ledger::CostLedger;
use crate::model::ReportConfig;
use crate::probe::{MetricKind, ProbeSink};
use crate::scheduler::{SimScheduler, TriggerHandle};

/// Owns the environment-wide report triggers.
#[derive(Default)]
pub struct ReportScheduler {
    handles: Vec<TriggerHandle>,
}

impl ReportScheduler {
    /// Creates a report scheduler with no triggers configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the report triggers described by `report`.
    ///
    /// One trigger per metric kind, all firing at the report interval
    /// starting at the current simulation time:
    /// - `CostOverTime` forwards the cost recorded since its previous
    ///   firing (everything ever recorded, on the first).
    /// - `AggregatedCostOverTime` forwards the cumulative ledger total.
    pub fn configure(
        &mut self,
        report: &ReportConfig,
        scheduler: &mut SimScheduler,
        ledger: &Rc<RefCell<CostLedger>>,
        sink: &Rc<dyn ProbeSink>,
    ) -> CostResult<()> {
        if report.metrics.is_empty() {
            tracing::warn!("report interval configured but no metric kinds requested");
        }

        for metric in &report.metrics {
            let handle = match metric {
                MetricKind::CostOverTime => {
                    let ledger = Rc::clone(ledger);
                    let sink = Rc::clone(sink);
                    let point = report.measuring_point.clone();
                    // Window position in the ledger, advanced on every fire.
                    let mut cursor = 0usize;
                    scheduler.schedule_repeating(
                        0.0,
                        report.interval,
                        Box::new(move |time| {
                            let ledger = ledger.borrow();
                            let tuples = ledger.tuples();
                            let value: f64 = tuples[cursor..].iter().map(|t| t.amount).sum();
                            cursor = tuples.len();
                            sink.emit_sample(MetricKind::CostOverTime, &point, time, value);
                            Ok(())
                        }),
                    )?
                }
                MetricKind::AggregatedCostOverTime => {
                    let ledger = Rc::clone(ledger);
                    let sink = Rc::clone(sink);
                    let point = report.measuring_point.clone();
                    scheduler.schedule_repeating(
                        0.0,
                        report.interval,
                        Box::new(move |time| {
                            let value = ledger.borrow().total_cost();
                            sink.emit_sample(
                                MetricKind::AggregatedCostOverTime,
                                &point,
                                time,
                                value,
                            );
                            Ok(())
                        }),
                    )?
                }
            };
            self.handles.push(handle);
            tracing::debug!(
                "configured {metric} report trigger with interval {}",
                report.interval
            );
        }
        Ok(())
    }

    /// Returns the handles of all configured report triggers.
    pub fn handles(&self) -> &[TriggerHandle] {
        &self.handles
    }

    /// Returns the number of configured report triggers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no report trigger is configured.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels all report triggers. Idempotent.
    pub fn cancel_all(&mut self, scheduler: &mut SimScheduler) {
        for handle in self.handles.drain(..) {
            scheduler.cancel(handle);
        }
    }
}
