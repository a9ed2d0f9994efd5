//! # Centime Cost Accrual Engine
//!
//! A cost-accrual core for discrete-event simulations of resource
//! topologies. Resources carrying a pricing marker accrue operating cost on
//! a fixed interval; the engine keeps the set of periodic cost triggers
//! consistent with a topology that mutates while the simulation runs.
//!
//! ## Design Principles
//!
//! - **Observer-Driven**: Triggers are never configured up front. They are
//!   created the instant a resource's multi-field cost specification
//!   completes and cancelled the instant the resource leaves the topology.
//! - **Single Timeline**: All triggers fire on one logical simulation
//!   clock (`SimTime`); equal-time firings execute in creation order.
//! - **Local Error Handling**: A broken cost specification leaves its
//!   resource unpriced and the run continues. Nothing propagates out of
//!   event handling.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use centime::{
//!     CostLedger, CostObserver, MemorySink, ModelEvent, ProbeSink, Resource,
//!     ResourceModel, SimScheduler,
//! };
//!
//! let ledger = Rc::new(RefCell::new(CostLedger::new()));
//! let sink: Rc<dyn ProbeSink> = Rc::new(MemorySink::new());
//!
//! // One priced resource charging 5 USD every 10 seconds.
//! let mut model = ResourceModel::new();
//! model.add_resource(
//!     Resource::new("web-1")
//!         .priced()
//!         .with_field("amount", 5.0)
//!         .with_field("unit", "USD")
//!         .with_field("interval", 10.0),
//! );
//!
//! let mut scheduler = SimScheduler::new();
//! let mut observer = CostObserver::new(Rc::clone(&ledger), Rc::clone(&sink));
//! observer.initialize(&model, &mut scheduler).unwrap();
//!
//! scheduler.run_until(25.0);
//! assert_eq!(ledger.borrow().total_cost(), 15.0); // charges at t = 0, 10, 20
//!
//! // The resource leaves the topology; its trigger stops firing.
//! let event = ModelEvent::removed("web-1");
//! model.apply(&event);
//! observer.handle_event(&model, &event, &mut scheduler);
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use centime::config::ScenarioConfig;
//!
//! let config = ScenarioConfig::from_yaml_file("scenario.yaml")?;
//! let model = config.build_model();
//! // ... initialize the observer against the model
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod ledger;
pub mod model;
pub mod observer;
pub mod probe;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod spec;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigError, ScenarioConfig, ScenarioConfigBuilder};
pub use detector::{CompletionDetector, CompletionPolicy};
pub use error::{CostError, CostResult};
pub use ledger::{CostLedger, CostTuple};
pub use model::{FieldValue, ModelEvent, ReportConfig, Resource, ResourceModel};
pub use observer::{CostObserver, ObserverStats};
pub use probe::{MemorySink, MetricKind, ProbeSink, Sample};
pub use registry::TriggerRegistry;
pub use report::ReportScheduler;
pub use scheduler::{SchedulerStats, SimScheduler, TriggerHandle, TriggerState};
pub use spec::CostSpec;
pub use types::{ResourceId, SimTime, TriggerId};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// centime::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
