//! Topology synchronization.
//!
//! The [`CostObserver`] keeps the set of periodic cost triggers consistent
//! with a live, mutating topology. At initialization it performs one full
//! scan of the existing model; afterwards it consumes the change
//! notification stream and routes each event to the completion detector,
//! the trigger registry, or nowhere (structural changes are ignored).
//!
//! All errors raised while interpreting events are handled locally per the
//! error policy: a broken cost specification leaves its resource unpriced
//! and the run continues.

use std::cell::RefCell;
use std::rc::Rc;

use crate::detector::{CompletionDetector, CompletionPolicy};
use crate::error::CostResult;
use crate::ledger::CostLedger;
use crate::model::{ModelEvent, ResourceModel};
use crate::probe::ProbeSink;
use crate::registry::TriggerRegistry;
use crate::report::ReportScheduler;
use crate::scheduler::SimScheduler;
use crate::spec::CostSpec;

/// Statistics collected by the observer.
#[derive(Clone, Debug, Default)]
pub struct ObserverStats {
    /// Total change events routed
    pub events_routed: u64,
    /// Cost specifications that completed and created a trigger
    pub completions: u64,
    /// Structural changes ignored
    pub structural_ignored: u64,
    /// Resources left unpriced due to a broken specification
    pub config_errors: u64,
}

/// Observes the topology and drives the trigger lifecycle.
pub struct CostObserver {
    registry: TriggerRegistry,
    detector: CompletionDetector,
    reports: ReportScheduler,
    ledger: Rc<RefCell<CostLedger>>,
    sink: Rc<dyn ProbeSink>,
    stats: ObserverStats,
}

impl CostObserver {
    /// Creates an observer with the default completion policy.
    pub fn new(ledger: Rc<RefCell<CostLedger>>, sink: Rc<dyn ProbeSink>) -> Self {
        Self::with_policy(ledger, sink, CompletionPolicy::default())
    }

    /// Creates an observer with an explicit completion policy.
    pub fn with_policy(
        ledger: Rc<RefCell<CostLedger>>,
        sink: Rc<dyn ProbeSink>,
        policy: CompletionPolicy,
    ) -> Self {
        Self {
            registry: TriggerRegistry::new(),
            detector: CompletionDetector::with_policy(policy),
            reports: ReportScheduler::new(),
            ledger,
            sink,
            stats: ObserverStats::default(),
        }
    }

    /// Performs the one-time initial scan of the existing topology.
    ///
    /// Configures the environment-wide report triggers if a report interval
    /// is declared, then prices every marked resource that already bears a
    /// complete cost specification, synthesizing the completion directly.
    /// Marked resources whose specification is still partial are seeded
    /// into the detector so later field notifications can complete them.
    ///
    /// # Errors
    /// Propagates an invalid report configuration; per-resource
    /// specification problems are logged and handled locally.
    pub fn initialize(
        &mut self,
        model: &ResourceModel,
        scheduler: &mut SimScheduler,
    ) -> CostResult<()> {
        if let Some(report) = model.report() {
            self.reports
                .configure(report, scheduler, &self.ledger, &self.sink)?;
        }

        for resource in model.resources() {
            if !resource.priced {
                continue;
            }
            match CostSpec::from_fields(&resource.fields) {
                Ok(spec) => {
                    if self
                        .registry
                        .on_spec_complete(&resource.id, &spec, scheduler, &self.ledger)?
                    {
                        self.stats.completions += 1;
                    }
                }
                Err(err) => {
                    tracing::debug!(
                        "resource {} is marked priced but not fully specified yet ({err}); \
                         waiting for field notifications",
                        resource.id
                    );
                    self.detector.seed(&resource.id, &resource.fields);
                }
            }
        }
        Ok(())
    }

    /// Routes one change notification.
    ///
    /// The model must already reflect the change described by the event so
    /// that marker queries see the post-change state.
    pub fn handle_event(
        &mut self,
        model: &ResourceModel,
        event: &ModelEvent,
        scheduler: &mut SimScheduler,
    ) {
        self.stats.events_routed += 1;
        match event {
            ModelEvent::ResourceAdded { id } => {
                tracing::debug!("resource {id} added; no action until its cost fields complete");
            }
            ModelEvent::ResourceRemoved { id } => {
                self.detector.forget(id);
                if self.registry.on_resource_removed(id, scheduler) {
                    tracing::debug!("cancelled cost trigger of removed resource {id}");
                }
            }
            ModelEvent::FieldSet { id, field, value } => {
                if !model.has_pricing_marker(id) {
                    return;
                }
                match self.detector.observe(id, field, value.clone()) {
                    Ok(Some(spec)) => {
                        match self
                            .registry
                            .on_spec_complete(id, &spec, scheduler, &self.ledger)
                        {
                            Ok(true) => self.stats.completions += 1,
                            Ok(false) => {} // duplicate completion, benign
                            Err(err) => {
                                self.stats.config_errors += 1;
                                tracing::error!(
                                    "could not create cost trigger for resource {id}: {err}; \
                                     resource stays unpriced"
                                );
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        self.stats.config_errors += 1;
                        tracing::error!(
                            "cost specification of resource {id} is unusable: {err}; \
                             resource stays unpriced for the remainder of the run"
                        );
                    }
                }
            }
            ModelEvent::StructuralChange { description } => {
                self.stats.structural_ignored += 1;
                tracing::debug!("ignoring structural change: {description}");
            }
        }
    }

    /// Returns the trigger registry.
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Returns the report scheduler.
    pub fn reports(&self) -> &ReportScheduler {
        &self.reports
    }

    /// Returns the observer statistics.
    pub fn stats(&self) -> &ObserverStats {
        &self.stats
    }

    /// Exports observer statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "events_routed": self.stats.events_routed,
            "completions": self.stats.completions,
            "structural_ignored": self.stats.structural_ignored,
            "config_errors": self.stats.config_errors,
            "active_resource_triggers": self.registry.len(),
            "report_triggers": self.reports.len(),
        })
    }
}
