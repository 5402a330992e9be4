//! Table of learned events and their event variables.
//!
//! Each learned event carries `N` event variables. For a route selecting node
//! every variable is a slot holding a candidate route, 0 when unused.

use arrayvec::ArrayVec;
use snafu::{ensure, Snafu};

use core::convert::TryFrom;

use crate::types::{EventId, EventIndex, SlotNumber};

/// Error type for this module
#[derive(Debug, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// No room for another learned event.
    #[snafu(display("Event table full ({} events)", capacity))]
    TableFull { capacity: usize },
    /// More event variables than slots per event.
    #[snafu(display("{} event variables given, at most {} allowed", given, max))]
    TooManyVariables { given: usize, max: usize },
}

/// An event the node reacts to, with its event variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedEvent<const N: usize> {
    pub id: EventId,
    pub variables: [u8; N],
}

/// Up to `CAP` learned events with `N` event variables each.
#[derive(Debug, Clone, Default)]
pub struct EventTable<const N: usize, const CAP: usize> {
    events: ArrayVec<LearnedEvent<N>, CAP>,
}

impl<const N: usize, const CAP: usize> EventTable<N, CAP> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            events: ArrayVec::new(),
        }
    }

    /// Learn `id` with the given event variables, replacing the variables if
    /// the event is already known. Missing trailing variables are set to 0.
    /// # Errors
    /// [`Error::TooManyVariables`] if `variables` is longer than `N`,
    /// [`Error::TableFull`] if a new event doesn't fit.
    pub fn learn(&mut self, id: EventId, variables: &[u8]) -> Result<EventIndex, Error> {
        ensure!(
            variables.len() <= N,
            TooManyVariablesSnafu {
                given: variables.len(),
                max: N
            }
        );
        let mut evs = [0; N];
        evs[..variables.len()].copy_from_slice(variables);

        if let Some(index) = self.lookup(id) {
            self.events[index.get()].variables = evs;
            return Ok(index);
        }
        let index = u8::try_from(self.events.len())
            .ok()
            .filter(|_| !self.events.is_full())
            .map(EventIndex::new);
        match index {
            Some(index) => {
                self.events.push(LearnedEvent { id, variables: evs });
                Ok(index)
            }
            None => TableFullSnafu { capacity: CAP }.fail(),
        }
    }

    /// Remove a learned event. Returns false if it wasn't known.
    ///
    /// Later events move down one index.
    pub fn forget(&mut self, id: EventId) -> bool {
        match self.lookup(id) {
            Some(index) => {
                self.events.remove(index.get());
                true
            }
            None => false,
        }
    }

    /// Index of a learned event.
    pub fn lookup(&self, id: EventId) -> Option<EventIndex> {
        let pos = self.events.iter().position(|e| e.id == id)?;
        u8::try_from(pos).ok().map(EventIndex::new)
    }

    /// The event stored at `index`.
    pub fn get(&self, index: EventIndex) -> Option<&LearnedEvent<N>> {
        self.events.get(index.get())
    }

    /// Raw value of event variable `slot`, 0 if the event or slot doesn't exist.
    pub fn slot_value(&self, index: EventIndex, slot: SlotNumber) -> u8 {
        self.get(index)
            .and_then(|e| e.variables.get(slot.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Learned events in table order.
    pub fn iter(&self) -> impl Iterator<Item = &LearnedEvent<N>> {
        self.events.iter()
    }

    /// Number of learned events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no event has been learned.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
