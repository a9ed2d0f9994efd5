//! Trigger lifecycle tests against the public scheduler API.
//!
//! These exercise the scheduling guarantees the rest of the engine depends
//! on: fixed-interval firing, deterministic equal-time ordering, idempotent
//! cancellation, and failure isolation between trigger actions.

use std::cell::RefCell;
use std::rc::Rc;

use centime::{CostError, SimScheduler, TriggerState};

#[test]
fn test_first_firing_at_schedule_time() {
    let mut sched = SimScheduler::new();
    let times = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&times);
    sched
        .schedule_repeating(
            0.0,
            7.5,
            Box::new(move |t| {
                recorded.borrow_mut().push(t);
                Ok(())
            }),
        )
        .unwrap();

    sched.run_until(20.0);

    assert_eq!(*times.borrow(), vec![0.0, 7.5, 15.0]);
}

#[test]
fn test_trigger_created_mid_run_fires_from_now() {
    let mut sched = SimScheduler::new();
    sched.run_until(42.0);

    let times = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&times);
    sched
        .schedule_repeating(
            0.0,
            10.0,
            Box::new(move |t| {
                recorded.borrow_mut().push(t);
                Ok(())
            }),
        )
        .unwrap();

    sched.run_until(65.0);

    assert_eq!(*times.borrow(), vec![42.0, 52.0, 62.0]);
}

#[test]
fn test_cancel_between_occurrences() {
    let mut sched = SimScheduler::new();
    let count = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&count);
    let handle = sched
        .schedule_repeating(
            0.0,
            10.0,
            Box::new(move |_| {
                *counter.borrow_mut() += 1;
                Ok(())
            }),
        )
        .unwrap();

    sched.run_until(15.0);
    assert_eq!(*count.borrow(), 2);

    sched.cancel(handle);
    assert_eq!(sched.state(handle), Some(TriggerState::Cancelled));
    sched.run_until(1000.0);

    assert_eq!(*count.borrow(), 2);
    assert_eq!(sched.active_triggers(), 0);
}

#[test]
fn test_double_cancel_counts_once() {
    let mut sched = SimScheduler::new();
    let handle = sched
        .schedule_repeating(0.0, 10.0, Box::new(|_| Ok(())))
        .unwrap();

    sched.cancel(handle);
    sched.cancel(handle);

    assert_eq!(sched.stats().triggers_cancelled, 1);
}

#[test]
fn test_independent_triggers_interleave_by_time() {
    let mut sched = SimScheduler::new();
    let log: Rc<RefCell<Vec<(String, f64)>>> = Rc::new(RefCell::new(Vec::new()));

    for (name, interval) in [("slow", 10.0), ("fast", 4.0)] {
        let log = Rc::clone(&log);
        sched
            .schedule_repeating(
                0.0,
                interval,
                Box::new(move |t| {
                    log.borrow_mut().push((name.to_string(), t));
                    Ok(())
                }),
            )
            .unwrap();
    }

    sched.run_until(10.0);

    let fired: Vec<(String, f64)> = log.borrow().clone();
    assert_eq!(
        fired,
        vec![
            ("slow".to_string(), 0.0),
            ("fast".to_string(), 0.0),
            ("fast".to_string(), 4.0),
            ("fast".to_string(), 8.0),
            ("slow".to_string(), 10.0),
        ]
    );
}

#[test]
fn test_failing_trigger_does_not_poison_others() {
    let mut sched = SimScheduler::new();
    let healthy = Rc::new(RefCell::new(0u32));

    sched
        .schedule_repeating(
            0.0,
            10.0,
            Box::new(|_| Err(CostError::Action("sink offline".to_string()))),
        )
        .unwrap();
    let counter = Rc::clone(&healthy);
    sched
        .schedule_repeating(
            0.0,
            10.0,
            Box::new(move |_| {
                *counter.borrow_mut() += 1;
                Ok(())
            }),
        )
        .unwrap();

    sched.run_until(30.0);

    assert_eq!(*healthy.borrow(), 4);
    assert_eq!(sched.stats().actions_failed, 4);
    // The failing trigger is still armed.
    assert_eq!(sched.active_triggers(), 2);
}

#[test]
fn test_fractional_intervals_accumulate_from_fire_time() {
    let mut sched = SimScheduler::new();
    let times = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&times);
    sched
        .schedule_repeating(
            0.0,
            0.25,
            Box::new(move |t| {
                recorded.borrow_mut().push(t);
                Ok(())
            }),
        )
        .unwrap();

    sched.run_until(1.0);

    assert_eq!(times.borrow().len(), 5); // t = 0, 0.25, 0.5, 0.75, 1.0
    assert_eq!(sched.current_time(), 1.0);
}
