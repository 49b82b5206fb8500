use crate::sim::{Event, SimTime, Simulator, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct DummyWorld {
    halt_after: Option<u32>,
}

impl World for DummyWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn halted(&self) -> bool {
        self.halt_after == Some(0)
    }
}

struct Push {
    id: u32,
    log: Arc<Mutex<Vec<u32>>>,
}

impl Event for Push {
    fn execute(self: Box<Self>, _sim: &mut Simulator, world: &mut dyn World) {
        let Push { id, log } = *self;
        log.lock().expect("log lock").push(id);
        let w = world.as_any_mut().downcast_mut::<DummyWorld>().expect("dummy world");
        if let Some(n) = w.halt_after.as_mut() {
            *n = n.saturating_sub(1);
        }
    }
}

/// 每 `period` 触发一次的周期事件
struct Periodic {
    period: SimTime,
    log: Arc<Mutex<Vec<u64>>>,
}

impl Event for Periodic {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) {
        self.log.lock().expect("log lock").push(sim.now().0);
        sim.schedule_in(self.period, *self);
    }
}

fn push(id: u32, log: &Arc<Mutex<Vec<u32>>>) -> Push {
    Push {
        id,
        log: Arc::clone(log),
    }
}

#[test]
fn events_run_in_time_order_then_schedule_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    sim.schedule(SimTime(10), push(1, &log));
    sim.schedule(SimTime(5), push(2, &log));
    sim.schedule(SimTime(10), push(3, &log));

    let mut world = DummyWorld::default();
    sim.run(&mut world);

    assert_eq!(&*log.lock().expect("log lock"), &[2, 1, 3]);
    assert_eq!(sim.executed(), 3);
    assert_eq!(sim.now(), SimTime(10));
}

#[test]
fn schedule_in_is_relative_to_now_and_past_times_are_clamped() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();
    sim.run_until(SimTime(100), &mut world);

    sim.schedule_in(SimTime(5), push(1, &log));
    sim.schedule(SimTime(50), push(2, &log));
    sim.run(&mut world);

    assert_eq!(&*log.lock().expect("log lock"), &[2, 1]);
    assert_eq!(sim.now(), SimTime(105));
}

#[test]
fn periodic_event_runs_until_horizon_inclusive() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    sim.schedule(
        SimTime(100),
        Periodic {
            period: SimTime(100),
            log: Arc::clone(&log),
        },
    );
    let mut world = DummyWorld::default();
    sim.run_until(SimTime(1_000), &mut world);

    let times = log.lock().expect("log lock").clone();
    assert_eq!(times, (1..=10).map(|k| k * 100).collect::<Vec<u64>>());
    assert_eq!(sim.now(), SimTime(1_000));
    assert_eq!(sim.pending(), 1);
}

#[test]
fn stop_discards_pending_events_and_ignores_new_ones() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    sim.schedule(SimTime(1), push(1, &log));
    sim.stop();
    sim.schedule(SimTime(2), push(2, &log));
    assert_eq!(sim.pending(), 0);

    let mut world = DummyWorld::default();
    sim.run(&mut world);
    assert!(log.lock().expect("log lock").is_empty());
    assert!(sim.is_stopped());
}

#[test]
fn halted_world_stops_the_run_after_the_current_event() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    for id in 1..=4 {
        sim.schedule(SimTime(u64::from(id)), push(id, &log));
    }
    let mut world = DummyWorld {
        halt_after: Some(2),
    };
    sim.run_until(SimTime(100), &mut world);

    assert_eq!(&*log.lock().expect("log lock"), &[1, 2]);
    assert!(sim.is_stopped());
    assert_eq!(sim.now(), SimTime(2));
    assert_eq!(sim.pending(), 0);
}
