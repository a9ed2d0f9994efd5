//! The trigger registry.
//!
//! Maps each priced resource to its active periodic cost trigger and owns
//! the trigger's lifecycle: created the instant the resource's cost
//! specification completes, cancelled the instant the resource leaves the
//! topology. At most one trigger exists per resource.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::CostResult;
use crate::ledger::CostLedger;
use crate::scheduler::{SimScheduler, TriggerHandle};
use crate::spec::CostSpec;
use crate::types::ResourceId;

/// Registry of active per-resource cost triggers.
///
/// Invariant: a key is present iff its resource currently has a complete
/// cost specification and has not been removed — so `len()` equals the
/// number of currently priced, currently present resources.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    triggers: HashMap<ResourceId, TriggerHandle>,
}

impl TriggerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a completed cost specification for a resource.
    ///
    /// Creates a periodic trigger that charges `spec.amount` into the ledger
    /// every `spec.interval` seconds, first charge at the current simulation
    /// time. Returns `Ok(false)` without touching anything if the resource
    /// already has a trigger: re-notification of an already-complete
    /// specification is expected benign behavior, not an error.
    pub fn on_spec_complete(
        &mut self,
        id: &ResourceId,
        spec: &CostSpec,
        scheduler: &mut SimScheduler,
        ledger: &Rc<RefCell<CostLedger>>,
    ) -> CostResult<bool> {
        if self.triggers.contains_key(id) {
            tracing::debug!("resource {id} already has an active cost trigger; ignoring");
            return Ok(false);
        }
        spec.validate()?;

        let resource = id.clone();
        let amount = spec.amount;
        let unit = spec.unit.clone();
        let ledger = Rc::clone(ledger);
        let handle = scheduler.schedule_repeating(
            0.0,
            spec.interval,
            Box::new(move |time| {
                tracing::info!(
                    "{resource} caused operation cost of {amount} {unit} at time {time}"
                );
                ledger.borrow_mut().record(resource.clone(), time, amount)
            }),
        )?;

        self.triggers.insert(id.clone(), handle);
        Ok(true)
    }

    /// Handles removal of a resource from the topology.
    ///
    /// Cancels and forgets its trigger if one exists; removal of a resource
    /// that was never priced is normal and a no-op. Returns whether a
    /// trigger was cancelled.
    pub fn on_resource_removed(&mut self, id: &str, scheduler: &mut SimScheduler) -> bool {
        match self.triggers.remove(id) {
            Some(handle) => {
                scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Returns true if the resource currently has an active trigger.
    pub fn contains(&self, id: &str) -> bool {
        self.triggers.contains_key(id)
    }

    /// Returns the trigger handle for a resource, if any.
    pub fn handle(&self, id: &str) -> Option<TriggerHandle> {
        self.triggers.get(id).copied()
    }

    /// Returns the number of active per-resource triggers.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Returns true if no resource is currently priced.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
