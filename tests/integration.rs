//! Integration tests for the cost accrual engine.
//!
//! These tests verify end-to-end scenarios including:
//! - Incremental pricing of a resource through field notifications
//! - Trigger cancellation on resource removal mid-run
//! - Environment-wide aggregate reports running alongside resource triggers

use std::cell::RefCell;
use std::rc::Rc;

use centime::{
    CostLedger, CostObserver, MemorySink, MetricKind, ModelEvent, ProbeSink, ReportConfig,
    Resource, ResourceModel, SimScheduler,
};

// ============================================================================
// Test Harness
// ============================================================================

/// Bundles the pieces an embedding simulation would wire together.
struct Harness {
    model: ResourceModel,
    scheduler: SimScheduler,
    observer: CostObserver,
    ledger: Rc<RefCell<CostLedger>>,
    sink: Rc<MemorySink>,
}

impl Harness {
    fn new(model: ResourceModel) -> Self {
        let ledger = Rc::new(RefCell::new(CostLedger::new()));
        let sink = Rc::new(MemorySink::new());
        let mut observer =
            CostObserver::new(Rc::clone(&ledger), Rc::clone(&sink) as Rc<dyn ProbeSink>);
        let mut scheduler = SimScheduler::new();
        observer
            .initialize(&model, &mut scheduler)
            .expect("initialization succeeds");
        Self {
            model,
            scheduler,
            observer,
            ledger,
            sink,
        }
    }

    /// Applies the event to the model, then routes it to the observer.
    fn emit(&mut self, event: ModelEvent) {
        self.model.apply(&event);
        self.observer
            .handle_event(&self.model, &event, &mut self.scheduler);
    }

    fn run_until(&mut self, time: f64) {
        self.scheduler.run_until(time);
    }

    fn total_cost(&self) -> f64 {
        self.ledger.borrow().total_cost()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// A resource priced at t = 0 with amount 5, interval 10 charges exactly
/// (R, 0, 5), (R, 10, 5), (R, 20, 5) by t = 25.
#[test]
fn test_incremental_pricing_charges_on_interval() {
    let mut h = Harness::new(ResourceModel::new());

    h.emit(ModelEvent::added("R"));
    h.model.set_priced("R", true);
    h.emit(ModelEvent::field_set("R", "amount", 5.0));
    h.emit(ModelEvent::field_set("R", "interval", 10.0));
    // Exactly one trigger exists once the terminal field arrives.
    assert_eq!(h.observer.registry().len(), 0);
    h.emit(ModelEvent::field_set("R", "unit", "USD"));
    assert_eq!(h.observer.registry().len(), 1);

    h.run_until(25.0);

    let ledger = h.ledger.borrow();
    let tuples = ledger.by_resource("R");
    let observed: Vec<(f64, f64)> = tuples.iter().map(|t| (t.time, t.amount)).collect();
    assert_eq!(observed, vec![(0.0, 5.0), (10.0, 5.0), (20.0, 5.0)]);
}

/// Removing a priced resource between charges stops its accrual: no tuple
/// with timestamp 20 exists after removal at t = 15.
#[test]
fn test_removal_mid_run_stops_accrual() {
    let mut model = ResourceModel::new();
    model.add_resource(
        Resource::new("R")
            .priced()
            .with_field("amount", 5.0)
            .with_field("unit", "USD")
            .with_field("interval", 10.0),
    );
    let mut h = Harness::new(model);

    h.run_until(15.0);
    h.emit(ModelEvent::removed("R"));
    h.run_until(100.0);

    let ledger = h.ledger.borrow();
    let tuples = ledger.by_resource("R");
    assert_eq!(tuples.len(), 2);
    assert!(tuples.iter().all(|t| t.time < 15.0));
    assert_eq!(h.observer.registry().len(), 0);
}

/// A report interval of 100 with both metric kinds produces exactly two
/// report triggers firing at t = 0, 100, 200, regardless of how many
/// resources exist.
#[test]
fn test_report_triggers_fire_on_report_interval() {
    let mut model = ResourceModel::new();
    model.add_resource(
        Resource::new("R")
            .priced()
            .with_field("amount", 1.0)
            .with_field("unit", "USD")
            .with_field("interval", 10.0),
    );
    model.set_report(ReportConfig::new(
        100.0,
        vec![MetricKind::CostOverTime, MetricKind::AggregatedCostOverTime],
    ));
    let mut h = Harness::new(model);

    assert_eq!(h.observer.reports().len(), 2);

    h.run_until(200.0);

    for metric in [MetricKind::CostOverTime, MetricKind::AggregatedCostOverTime] {
        let samples = h.sink.by_metric(metric);
        let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 100.0, 200.0]);
    }

    // Report triggers were created before the resource trigger, so at a
    // shared firing time the sample is taken before that instant's charge:
    // the aggregate at t = 200 sees the 20 charges at t = 0..190.
    let aggregated = h.sink.by_metric(MetricKind::AggregatedCostOverTime);
    assert_eq!(aggregated[2].value, 20.0);
}

/// Report triggers outlive resource triggers: cancelling every resource
/// leaves the report cadence untouched.
#[test]
fn test_reports_survive_resource_cancellation() {
    let mut model = ResourceModel::new();
    model.add_resource(
        Resource::new("R")
            .priced()
            .with_field("amount", 2.0)
            .with_field("unit", "USD")
            .with_field("interval", 10.0),
    );
    model.set_report(ReportConfig::new(
        100.0,
        vec![MetricKind::AggregatedCostOverTime],
    ));
    let mut h = Harness::new(model);

    h.run_until(50.0);
    h.emit(ModelEvent::removed("R"));
    h.run_until(300.0);

    let samples = h.sink.by_metric(MetricKind::AggregatedCostOverTime);
    assert_eq!(samples.len(), 4); // t = 0, 100, 200, 300
    // The running total freezes after removal.
    assert_eq!(samples[1].value, samples[3].value);
}

/// The registry size always equals the number of priced, present resources.
#[test]
fn test_registry_tracks_priced_present_resources() {
    let mut h = Harness::new(ResourceModel::new());

    for id in ["a", "b", "c"] {
        h.emit(ModelEvent::added(id));
        h.model.set_priced(id, true);
        h.emit(ModelEvent::field_set(id, "amount", 1.0));
        h.emit(ModelEvent::field_set(id, "interval", 10.0));
        h.emit(ModelEvent::field_set(id, "unit", "USD"));
    }
    assert_eq!(h.observer.registry().len(), 3);

    h.emit(ModelEvent::removed("b"));
    assert_eq!(h.observer.registry().len(), 2);
    assert!(h.observer.registry().contains("a"));
    assert!(!h.observer.registry().contains("b"));
    assert!(h.observer.registry().contains("c"));
}

/// Resources without the pricing marker accrue nothing no matter which
/// fields they carry.
#[test]
fn test_marker_gates_accrual() {
    let mut h = Harness::new(ResourceModel::new());

    h.emit(ModelEvent::added("free"));
    h.emit(ModelEvent::field_set("free", "amount", 100.0));
    h.emit(ModelEvent::field_set("free", "interval", 1.0));
    h.emit(ModelEvent::field_set("free", "unit", "USD"));

    h.run_until(50.0);

    assert_eq!(h.total_cost(), 0.0);
    assert_eq!(h.observer.registry().len(), 0);
}

/// Two resources priced in a known order charge deterministically at
/// shared firing times.
#[test]
fn test_equal_time_charges_are_ordered_by_creation() {
    let mut model = ResourceModel::new();
    for id in ["first", "second"] {
        model.add_resource(
            Resource::new(id)
                .priced()
                .with_field("amount", 1.0)
                .with_field("unit", "USD")
                .with_field("interval", 10.0),
        );
    }
    let mut h = Harness::new(model);

    h.run_until(10.0);

    let ledger = h.ledger.borrow();
    let ids: Vec<&str> = ledger.tuples().iter().map(|t| t.resource_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "first", "second"]);
}

/// Observer statistics reflect the run.
#[test]
fn test_export_stats_end_to_end() {
    let mut h = Harness::new(ResourceModel::new());

    h.emit(ModelEvent::added("R"));
    h.model.set_priced("R", true);
    h.emit(ModelEvent::field_set("R", "amount", 5.0));
    h.emit(ModelEvent::field_set("R", "interval", 10.0));
    h.emit(ModelEvent::field_set("R", "unit", "USD"));
    h.emit(ModelEvent::structural("rack rewired"));
    h.run_until(20.0);

    let stats = h.observer.export_stats();
    assert_eq!(stats["completions"], 1);
    assert_eq!(stats["structural_ignored"], 1);
    assert_eq!(stats["active_resource_triggers"], 1);

    let sched_stats = h.scheduler.export_stats();
    assert_eq!(sched_stats["fires_executed"], 3);
    assert_eq!(sched_stats["actions_failed"], 0);
}
