//! Periodic triggers and the simulation scheduler.
//!
//! A [`PeriodicTrigger`] fires repeatedly at a fixed interval until
//! cancelled, each firing invoking a caller-supplied action with the current
//! simulation time. The [`SimScheduler`] owns all trigger entries, advances
//! the simulation clock, and fires pending triggers in deterministic order.
//!
//! The scheduler is single-threaded by construction: all firings execute
//! synchronously on the caller's timeline, so actions must complete before
//! the clock advances to the next occurrence.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{CostError, CostResult};
use crate::types::{SimTime, TriggerId};

/// The action invoked at every firing of a trigger.
///
/// An `Err` is caught at the trigger boundary, logged, and does not stop the
/// trigger from re-arming: a missed charge is worse than a crashed run.
pub type TriggerAction = Box<dyn FnMut(SimTime) -> CostResult<()>>;

/// Lifecycle state of a periodic trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// Armed; will fire at its next occurrence
    Scheduled,
    /// Cancelled; terminal, will never fire again
    Cancelled,
}

/// Opaque handle to a scheduled trigger.
///
/// The scheduler retains logical ownership of the trigger; holders of a
/// handle can only cancel it or query its state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriggerHandle(TriggerId);

impl TriggerHandle {
    /// Returns the underlying trigger id.
    pub fn id(&self) -> TriggerId {
        self.0
    }
}

/// A periodic trigger entry owned by the scheduler.
struct PeriodicTrigger {
    interval: SimTime,
    next_fire: SimTime,
    state: TriggerState,
    /// Creation-order sequence number; breaks ties between triggers due at
    /// the same time so firing order is reproducible across runs.
    seq: u64,
    /// Dropped on cancellation so captured resources are released early.
    action: Option<TriggerAction>,
}

/// A pending occurrence in the fire queue.
#[derive(Clone, Copy, Debug)]
struct FireAt {
    time: SimTime,
    seq: u64,
    trigger: TriggerId,
}

impl PartialEq for FireAt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FireAt {}

impl PartialOrd for FireAt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FireAt {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the earliest occurrence pops
        // first, with creation order breaking time ties.
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Statistics collected by the scheduler.
#[derive(Clone, Debug, Default)]
pub struct SchedulerStats {
    /// Total trigger firings executed
    pub fires_executed: u64,
    /// Firings whose action returned an error
    pub actions_failed: u64,
    /// Triggers created over the lifetime of the scheduler
    pub triggers_created: u64,
    /// Triggers cancelled
    pub triggers_cancelled: u64,
}

/// The simulation scheduler: clock plus periodic trigger table.
///
/// # Example
///
/// ```
/// use centime::scheduler::SimScheduler;
///
/// let mut sched = SimScheduler::new();
/// let handle = sched
///     .schedule_repeating(0.0, 10.0, Box::new(|_time| Ok(())))
///     .unwrap();
/// sched.run_until(35.0); // fires at t = 0, 10, 20, 30
/// sched.cancel(handle);
/// assert_eq!(sched.stats().fires_executed, 4);
/// ```
pub struct SimScheduler {
    current_time: SimTime,
    triggers: HashMap<TriggerId, PeriodicTrigger>,
    queue: BinaryHeap<FireAt>,
    next_id: TriggerId,
    next_seq: u64,
    stats: SchedulerStats,
}

impl SimScheduler {
    /// Creates a new scheduler with the clock at zero.
    pub fn new() -> Self {
        Self {
            current_time: 0.0,
            triggers: HashMap::new(),
            queue: BinaryHeap::new(),
            next_id: 0,
            next_seq: 0,
            stats: SchedulerStats::default(),
        }
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Schedules a new periodic trigger.
    ///
    /// The first firing happens `first_occurrence` seconds from now (zero
    /// fires at the current time), then every `interval` seconds until
    /// cancelled.
    ///
    /// # Errors
    /// `InvalidInput` if `interval` is not positive and finite, or
    /// `first_occurrence` is negative or non-finite. Nothing is scheduled.
    pub fn schedule_repeating(
        &mut self,
        first_occurrence: SimTime,
        interval: SimTime,
        action: TriggerAction,
    ) -> CostResult<TriggerHandle> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(CostError::InvalidInput(format!(
                "trigger interval must be positive, got {interval}"
            )));
        }
        if !first_occurrence.is_finite() || first_occurrence < 0.0 {
            return Err(CostError::InvalidInput(format!(
                "first occurrence must be non-negative, got {first_occurrence}"
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        let next_fire = self.current_time + first_occurrence;
        self.triggers.insert(
            id,
            PeriodicTrigger {
                interval,
                next_fire,
                state: TriggerState::Scheduled,
                seq,
                action: Some(action),
            },
        );
        self.queue.push(FireAt {
            time: next_fire,
            seq,
            trigger: id,
        });
        self.stats.triggers_created += 1;

        tracing::debug!(
            "scheduled trigger {id} with interval {interval}, first firing at {next_fire}"
        );
        Ok(TriggerHandle(id))
    }

    /// Cancels a trigger.
    ///
    /// Idempotent: cancelling an already-cancelled or unknown trigger is a
    /// no-op. The cancelled entry's pending occurrence is discarded lazily
    /// when it surfaces in the queue, so a cancel never mutates the fire
    /// queue mid-iteration.
    pub fn cancel(&mut self, handle: TriggerHandle) {
        if let Some(trigger) = self.triggers.get_mut(&handle.0) {
            if trigger.state == TriggerState::Scheduled {
                trigger.state = TriggerState::Cancelled;
                trigger.action = None;
                self.stats.triggers_cancelled += 1;
                tracing::debug!("cancelled trigger {}", handle.0);
            }
        }
    }

    /// Returns the state of a trigger, or `None` if it was never scheduled
    /// or already reaped.
    pub fn state(&self, handle: TriggerHandle) -> Option<TriggerState> {
        self.triggers.get(&handle.0).map(|t| t.state)
    }

    /// Returns the next firing time of a trigger, if it is still scheduled.
    pub fn next_fire(&self, handle: TriggerHandle) -> Option<SimTime> {
        self.triggers
            .get(&handle.0)
            .filter(|t| t.state == TriggerState::Scheduled)
            .map(|t| t.next_fire)
    }

    /// Returns the number of currently scheduled (not cancelled) triggers.
    pub fn active_triggers(&self) -> usize {
        self.triggers
            .values()
            .filter(|t| t.state == TriggerState::Scheduled)
            .count()
    }

    /// Returns the time of the earliest pending occurrence, pruning
    /// cancelled entries from the head of the queue.
    pub fn peek_next(&mut self) -> Option<SimTime> {
        while let Some(top) = self.queue.peek() {
            match self.triggers.get(&top.trigger) {
                Some(t) if t.state == TriggerState::Scheduled => return Some(top.time),
                _ => {
                    if let Some(stale) = self.queue.pop() {
                        self.triggers.remove(&stale.trigger);
                    }
                }
            }
        }
        None
    }

    /// Fires the next pending trigger, advancing the clock to its occurrence
    /// time. Returns false if no trigger is pending.
    pub fn step(&mut self) -> bool {
        while let Some(fire) = self.queue.pop() {
            let entry = match self.triggers.get_mut(&fire.trigger) {
                Some(entry) => entry,
                None => continue,
            };
            if entry.state == TriggerState::Cancelled {
                self.triggers.remove(&fire.trigger);
                continue;
            }

            if fire.time > self.current_time {
                self.current_time = fire.time;
            }
            let now = self.current_time;

            let result = match entry.action.as_mut() {
                Some(action) => action(now),
                None => Ok(()),
            };

            // Re-arm before inspecting the result: a failing action must not
            // prevent the next occurrence.
            entry.next_fire = fire.time + entry.interval;
            let rearm = FireAt {
                time: entry.next_fire,
                seq: entry.seq,
                trigger: fire.trigger,
            };
            self.queue.push(rearm);

            self.stats.fires_executed += 1;
            if let Err(err) = result {
                self.stats.actions_failed += 1;
                tracing::error!(
                    "trigger {} action failed at time {now}: {err}; trigger stays scheduled",
                    fire.trigger
                );
            }
            return true;
        }
        false
    }

    /// Fires all triggers due at or before `target` in time order, then
    /// advances the clock to `target`.
    pub fn run_until(&mut self, target: SimTime) {
        while matches!(self.peek_next(), Some(t) if t <= target) {
            self.step();
        }
        if target > self.current_time {
            self.current_time = target;
        }
    }

    /// Returns the scheduler statistics.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Exports scheduler statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "current_time": self.current_time,
            "active_triggers": self.active_triggers(),
            "fires_executed": self.stats.fires_executed,
            "actions_failed": self.stats.actions_failed,
            "triggers_created": self.stats.triggers_created,
            "triggers_cancelled": self.stats.triggers_cancelled,
        })
    }
}

impl Default for SimScheduler {
    fn default() -> Self {
        Self::new()
    }
}
