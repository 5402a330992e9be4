//! Candidate route sets, and the store holding the set from the previous activation.

use crate::config::ConfigStore;
use crate::types::{EventIndex, Route, SlotNumber};

/// The candidate routes of one activation, one per event variable slot.
///
/// Unconfigured slots (value 0 on the wire) are `None`, so they can never
/// take part in a match.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CandidateSet<const N: usize>([Option<Route>; N]);

impl<const N: usize> CandidateSet<N> {
    /// A set with every slot unconfigured.
    pub const fn empty() -> Self {
        Self([None; N])
    }

    /// Build a set from raw slot values.
    pub fn from_slots(values: [u8; N]) -> Self {
        Self(values.map(Route::from_slot))
    }

    /// Read the `N` slots of the learned event at `index`.
    pub fn capture(store: &impl ConfigStore, index: EventIndex) -> Self {
        let mut slots = [None; N];
        for (i, slot) in slots.iter_mut().enumerate() {
            if let Some(number) = SlotNumber::from_index(i) {
                *slot = Route::from_slot(store.slot_value(index, number));
            }
        }
        Self(slots)
    }

    /// Slot contents in slot order, `None` for empty slots.
    pub const fn slots(&self) -> &[Option<Route>; N] {
        &self.0
    }

    /// Configured routes in slot order, duplicates included.
    pub fn routes(&self) -> impl Iterator<Item = Route> + '_ {
        self.0.iter().flatten().copied()
    }

    /// True if any slot holds `route`.
    pub fn contains(&self, route: Route) -> bool {
        self.0.contains(&Some(route))
    }

    /// Wire representation, 0 for unconfigured slots.
    pub fn to_slots(&self) -> [u8; N] {
        self.0.map(|slot| slot.map_or(0, Route::get))
    }
}

impl<const N: usize> Default for CandidateSet<N> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Holds the candidate set captured at the previous activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateStore<const N: usize> {
    stored: CandidateSet<N>,
}

impl<const N: usize> CandidateStore<N> {
    /// A store holding no candidates.
    pub const fn new() -> Self {
        Self {
            stored: CandidateSet::empty(),
        }
    }

    /// Read the candidate set for the learned event at `index`.
    pub fn capture(&self, store: &impl ConfigStore, index: EventIndex) -> CandidateSet<N> {
        CandidateSet::capture(store, index)
    }

    /// Overwrite the stored set.
    pub fn replace(&mut self, set: CandidateSet<N>) {
        self.stored = set;
    }

    /// Candidates of the last activation.
    pub const fn stored(&self) -> &CandidateSet<N> {
        &self.stored
    }
}
