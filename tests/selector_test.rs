mod common;

use std::collections::HashMap;

use cbus_route_select::frame::{opcode, DEFAULT_PRIORITY};
use cbus_route_select::{
    resolve, route, Activation, CandidateSet, ConfigStore, EventIndex, Frame, Millis,
    RouteSelector, SlotNumber,
};

/// Event variables kept in a map, as a host with its own storage would.
struct HostStore {
    slots: HashMap<(usize, u8), u8>,
    window: u8,
}

impl HostStore {
    fn new(window: u8) -> Self {
        Self {
            slots: HashMap::new(),
            window,
        }
    }

    fn set(&mut self, index: u8, values: &[u8]) -> EventIndex {
        for (i, v) in values.iter().enumerate() {
            self.slots.insert((index as usize, i as u8 + 1), *v);
        }
        EventIndex::new(index)
    }
}

impl ConfigStore for HostStore {
    fn slot_value(&self, index: EventIndex, slot: SlotNumber) -> u8 {
        self.slots.get(&(index.get(), *slot)).copied().unwrap_or(0)
    }

    fn timing_window(&self) -> u8 {
        self.window
    }
}

fn frame(op: u8) -> Frame {
    Frame::new(DEFAULT_PRIORITY, 7, op, &[0x00, 0x10, 0x00, 0x01]).unwrap()
}

fn press<const N: usize>(
    selector: &mut RouteSelector<N>,
    store: &HostStore,
    index: EventIndex,
    now: Millis,
) -> Activation {
    selector.on_activation(index, &frame(opcode::ACON), now, store)
}

#[test]
fn press_sequence_scenario() {
    common::init_logging();
    let mut store = HostStore::new(1);
    let a = store.set(0, &[1, 2, 3]);
    let b = store.set(1, &[3, 4, 5]);
    let c = store.set(2, &[3, 9]);
    let mut selector = RouteSelector::<20>::new();

    assert_eq!(press(&mut selector, &store, a, 20_000), Activation::First);
    assert_eq!(press(&mut selector, &store, b, 20_050).route(), Some(route(3)));
    assert_eq!(press(&mut selector, &store, c, 20_400), Activation::First);

    let mut expected = [0; 20];
    expected[..2].copy_from_slice(&[3, 9]);
    assert_eq!(selector.stored().to_slots(), expected);
}

#[test]
fn press_sequence_from_clock_origin() {
    common::init_logging();
    let mut store = HostStore::new(1);
    let a = store.set(0, &[1, 2, 3]);
    let b = store.set(1, &[3, 4, 5]);
    let c = store.set(2, &[3, 9]);
    let mut selector = RouteSelector::<20>::new();

    // inside the first window after 0, resolved against the empty store
    match press(&mut selector, &store, a, 0) {
        Activation::Resolved(decision) => {
            assert_eq!(decision.route(), None);
            assert_eq!(decision.matches(), 0);
        }
        other => panic!("expected an empty decision, got {:?}", other),
    }
    assert_eq!(press(&mut selector, &store, b, 50).route(), Some(route(3)));
    assert_eq!(press(&mut selector, &store, c, 400), Activation::First);

    let mut expected = [0; 20];
    expected[..2].copy_from_slice(&[3, 9]);
    assert_eq!(selector.stored().to_slots(), expected);
    assert_eq!(selector.timer().last(), 400);
}

#[test]
fn tie_break_takes_first_slot() {
    common::init_logging();
    let mut store = HostStore::new(5);
    let first = store.set(0, &[7, 5]);
    let second = store.set(1, &[5, 7, 5]);
    let mut selector = RouteSelector::<3>::new();

    press(&mut selector, &store, first, 1_000);
    match press(&mut selector, &store, second, 1_200) {
        Activation::Resolved(decision) => {
            assert_eq!(decision.route(), Some(route(5)));
            assert_eq!(decision.matches(), 3);
        }
        other => panic!("expected a decision, got {:?}", other),
    }
}

#[test]
fn zero_slots_do_not_match() {
    let mut store = HostStore::new(5);
    let first = store.set(0, &[0, 4, 0]);
    let second = store.set(1, &[0, 0, 6]);
    let mut selector = RouteSelector::<3>::new();

    press(&mut selector, &store, first, 1_000);
    let activation = press(&mut selector, &store, second, 1_100);
    assert_eq!(
        activation,
        Activation::Resolved(resolve(
            &CandidateSet::from_slots([0, 0, 6]),
            &CandidateSet::from_slots([0, 4, 0])
        ))
    );
    assert_eq!(activation.route(), None);
}

#[test]
fn off_events_leave_state_identical() {
    let mut store = HostStore::new(5);
    let a = store.set(0, &[1, 2, 3]);
    let b = store.set(1, &[3, 4, 5]);
    let mut selector = RouteSelector::<3>::new();
    press(&mut selector, &store, a, 1_000);

    for op in [opcode::ACOF, opcode::ASOF, opcode::ACOF3] {
        let data = vec![0; cbus_route_select::frame::data_len(op)];
        let off = Frame::new(DEFAULT_PRIORITY, 7, op, &data).unwrap();
        let before = selector.clone();
        assert_eq!(selector.on_activation(b, &off, 1_100, &store), Activation::Ignored);
        assert_eq!(selector, before);
    }

    // the next on event still resolves against the first press
    assert_eq!(press(&mut selector, &store, b, 1_200).route(), Some(route(3)));
}

#[test]
fn identical_sets_match_every_slot() {
    let mut store = HostStore::new(5);
    let a = store.set(0, &[8, 6, 4, 2]);
    let mut selector = RouteSelector::<4>::new();
    press(&mut selector, &store, a, 1_000);
    match press(&mut selector, &store, a, 1_001) {
        Activation::Resolved(decision) => {
            assert_eq!(decision.matches(), 4);
            assert_eq!(decision.route(), Some(route(8)));
        }
        other => panic!("expected a decision, got {:?}", other),
    }
}
