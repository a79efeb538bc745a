//! Integration tests for concurrent tracker access.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use vigil_core::{AgentReport, CollisionTracker, ControlMode, SystemMode};

#[test]
fn test_concurrent_upserts_distinct_ids() {
    let tracker = Arc::new(CollisionTracker::new());
    let threads: u32 = 8;
    let per_thread: u32 = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let id = format!("agent_{t}_{i}");
                    // Spread out far enough that nothing is at risk.
                    let x = f64::from(t * per_thread + i) * 1_000.0;
                    tracker
                        .ingest_agent(AgentReport::planar(&id, "CAR", 10.0, x, 0.0))
                        .unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(tracker.list_agents().len(), (threads * per_thread) as usize);
    assert_eq!(tracker.current_warnings().count, 0);
}

#[test]
fn test_concurrent_upserts_same_id_last_writer_wins() {
    let tracker = Arc::new(CollisionTracker::new());

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for i in 0..100u32 {
                    let velocity = f64::from(t * 100 + i);
                    tracker
                        .ingest_agent(AgentReport::planar("shared", "CAR", velocity, 0.0, 0.0))
                        .unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let agents = tracker.list_agents();
    assert_eq!(agents.len(), 1);
    // Whichever write landed last, it is one complete record.
    let agent = &agents[0];
    assert_eq!(agent.id, "shared");
    assert!(agent.planar.is_some());
    assert!(agent.velocity >= 0.0 && agent.velocity < 800.0);
}

#[test]
fn test_readers_always_see_complete_snapshots() {
    let tracker = Arc::new(CollisionTracker::new());
    let done = Arc::new(AtomicBool::new(false));

    // Readers check that every published warning has its partner: with
    // exactly two agents the snapshot is either empty or a full pair.
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    let view = tracker.current_warnings();
                    assert!(view.count == 0 || view.count == 2, "torn snapshot: {}", view.count);
                    if let Some(a) = view.warnings.get("A") {
                        let b = &view.warnings["B"];
                        assert_eq!(a.peer, "B");
                        assert_eq!(b.peer, "A");
                        assert_eq!(a.distance, b.distance);
                        assert_eq!(a.safe_distance, b.safe_distance);
                    }
                }
            })
        })
        .collect();

    tracker
        .ingest_agent(AgentReport::planar("B", "CAR", 0.0, 10.0, 0.0))
        .unwrap();
    for i in 0..500 {
        // Alternate between risky and safe speeds.
        let velocity = if i % 2 == 0 { 20.0 } else { 1.0 };
        tracker
            .ingest_agent(AgentReport::planar("A", "CAR", velocity, 0.0, 0.0))
            .unwrap();
    }

    done.store(true, Ordering::Relaxed);
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn test_final_snapshot_reflects_all_mutations() {
    let tracker = Arc::new(CollisionTracker::new());

    let writers: Vec<_> = (0..6u32)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for i in 0..40u32 {
                    let id = format!("pair_{t}_{i}");
                    let x = f64::from(t * 40 + i) * 10_000.0;
                    tracker
                        .ingest_agent(AgentReport::planar(&format!("{id}_a"), "CAR", 30.0, x, 0.0))
                        .unwrap();
                    tracker
                        .ingest_agent(AgentReport::planar(&format!("{id}_b"), "BIKE", 0.0, x + 1.0, 0.0))
                        .unwrap();
                }
            })
        })
        .collect();

    let toggler = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            for i in 0..50 {
                let mode = if i % 2 == 0 { "ADAS" } else { "HUMAN" };
                tracker.set_modes(None, Some(mode)).unwrap();
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    toggler.join().unwrap();

    // Every pair sits 1 unit apart at relative speed 30: always at risk.
    assert_eq!(tracker.list_agents().len(), 6 * 40 * 2);
    assert_eq!(tracker.current_warnings().count, 6 * 40 * 2);
    assert_eq!(tracker.modes().current_control_mode(), ControlMode::Human);
    assert_eq!(tracker.modes().current_system_mode(), SystemMode::Indoor);
}

#[test]
fn test_reset_racing_ingests_leaves_consistent_warnings() {
    for _ in 0..50 {
        let tracker = Arc::new(CollisionTracker::new());

        let resetters: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..5 {
                        tracker.reset_all();
                    }
                })
            })
            .collect();

        let ingesters: Vec<_> = (0..4u32)
            .map(|t| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for i in 0..5u32 {
                        let x = f64::from(t * 5 + i) * 10_000.0;
                        tracker
                            .ingest_agent(AgentReport::planar(&format!("r{t}_{i}_a"), "CAR", 20.0, x, 0.0))
                            .unwrap();
                        tracker
                            .ingest_agent(AgentReport::planar(&format!("r{t}_{i}_b"), "CAR", 0.0, x + 10.0, 0.0))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in resetters.into_iter().chain(ingesters) {
            handle.join().unwrap();
        }

        let expected = tracker
            .engine()
            .detect(
                &tracker.list_agents(),
                tracker.modes().current_system_mode(),
                tracker.modes().reaction_time_multiplier(),
            )
            .unwrap();
        assert_eq!(*tracker.current_warnings().warnings, expected);
    }
}

#[test]
fn test_detection_is_deterministic() {
    let tracker = CollisionTracker::new();
    for (id, v, x) in [("c", 50.0, 5.0), ("a", 10.0, 0.0), ("b", 30.0, 2.0), ("d", 2.0, 300.0)] {
        tracker
            .ingest_agent(AgentReport::planar(id, "CAR", v, x, 0.0))
            .unwrap();
    }

    let agents = tracker.list_agents();
    let engine = tracker.engine();
    let first = engine.detect(&agents, SystemMode::Indoor, 1.0).unwrap();
    let second = engine.detect(&agents, SystemMode::Indoor, 1.0).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(*tracker.current_warnings().warnings, first);
}
