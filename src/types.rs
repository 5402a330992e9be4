//! This module defines range-checked types for CBUS node numbers, event numbers,
//! CAN ids, event variable slots and routes, meant to simplify correct usage of the API.

use snafu::{ensure, OptionExt, Snafu};

use core::convert::{TryFrom, TryInto};
use core::fmt;
use core::num::NonZeroU8;
use core::ops::Deref;

/// Error type for this module
#[derive(Debug, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The value isn't a valid CBUS node number.
    #[snafu(display("Invalid node number"))]
    InvalidNodeNumber,
    /// The value isn't a valid CBUS event number.
    #[snafu(display("Invalid event number"))]
    InvalidEventNumber,
    /// The value isn't a valid CAN id for a node.
    #[snafu(display("Invalid CAN id"))]
    InvalidCanId,
    /// The value isn't a valid event variable slot.
    #[snafu(display("Invalid slot number"))]
    InvalidSlot,
    /// The value can't be used as a route, zero means "no route".
    #[snafu(display("Invalid route"))]
    InvalidRoute,
}

const fn invalid_node_number() -> InvalidNodeNumberSnafu {
    InvalidNodeNumberSnafu
}

const fn invalid_event_number() -> InvalidEventNumberSnafu {
    InvalidEventNumberSnafu
}

const fn invalid_can_id() -> InvalidCanIdSnafu {
    InvalidCanIdSnafu
}

const fn invalid_slot() -> InvalidSlotSnafu {
    InvalidSlotSnafu
}

const fn invalid_route() -> InvalidRouteSnafu {
    InvalidRouteSnafu
}

/// Monotonic time in milliseconds, as supplied by the host.
///
/// 64 bits wide, so the counter doesn't wrap within any plausible uptime.
pub type Millis = u64;

/// `NodeNumber` identifies a node on the bus, sent big-endian in event frames.
///
/// Node number 0 is used when matching short events, and is not a valid
/// number for the node itself (see [`NodeConfig`](crate::config::NodeConfig)).
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash, Default)]
#[repr(transparent)]
pub struct NodeNumber(u16);

/// Create a new [`NodeNumber`].
pub const fn node(n: u16) -> NodeNumber {
    NodeNumber(n)
}

impl NodeNumber {
    /// Create a new node number.
    /// # Errors
    /// Returns [`Error::InvalidNodeNumber`] if `node` doesn't fit in 16 bits.
    pub fn new(node: impl TryInto<u16>) -> Result<Self, Error> {
        let node = node.try_into().ok().with_context(invalid_node_number)?;
        Ok(Self(node))
    }

    pub(crate) const fn from_bytes(hi: u8, lo: u8) -> Self {
        Self(u16::from_be_bytes([hi, lo]))
    }

    pub(crate) const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl Deref for NodeNumber {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for NodeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `EventNumber` identifies an event produced by a node, or a device number
/// for short events.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash, Default)]
#[repr(transparent)]
pub struct EventNumber(u16);

/// Create a new [`EventNumber`].
pub const fn event(n: u16) -> EventNumber {
    EventNumber(n)
}

impl EventNumber {
    /// Create a new event number.
    /// # Errors
    /// Returns [`Error::InvalidEventNumber`] if `event` doesn't fit in 16 bits.
    pub fn new(event: impl TryInto<u16>) -> Result<Self, Error> {
        let event = event.try_into().ok().with_context(invalid_event_number)?;
        Ok(Self(event))
    }

    pub(crate) const fn from_bytes(hi: u8, lo: u8) -> Self {
        Self(u16::from_be_bytes([hi, lo]))
    }

    pub(crate) const fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl Deref for EventNumber {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Route> for EventNumber {
    fn from(route: Route) -> Self {
        Self(route.get().into())
    }
}

/// Identity of a bus event: the producing node and its event number.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct EventId {
    /// Producer node number, 0 for short events.
    pub node: NodeNumber,
    /// Event number, or device number for short events.
    pub event: EventNumber,
}

impl EventId {
    /// A long event, tied to the producing node.
    pub const fn long(node: NodeNumber, event: EventNumber) -> Self {
        Self { node, event }
    }

    /// A short (device numbered) event, matched regardless of producer.
    pub const fn short(event: EventNumber) -> Self {
        Self {
            node: NodeNumber(0),
            event,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node.0, self.event.0)
    }
}

/// `CanId` is a range-checked \[1, 127\] integer, the node's 7-bit CAN identifier.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct CanId(u8);

/// Create a new [`CanId`], panics if it is out of range.
pub const fn can_id(id: u8) -> CanId {
    if id >= 1 && id <= 127 {
        return CanId(id);
    }
    panic!("Invalid CAN id.")
}

impl CanId {
    /// Create a new CAN id, checking that it is in \[1, 127\].
    /// # Errors
    /// Returns [`Error::InvalidCanId`] if `id` is out of range.
    pub fn new(id: impl TryInto<u8>) -> Result<Self, Error> {
        let id = id.try_into().ok().with_context(invalid_can_id)?;
        ensure!((1..=127).contains(&id), invalid_can_id());
        Ok(Self(id))
    }
}

impl Deref for CanId {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u8> for CanId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// `SlotNumber` is a 1-based event variable position.
///
/// The upper bound depends on the number of slots configured per event,
/// and is checked by whoever indexes with it.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct SlotNumber(u8);

impl SlotNumber {
    /// Create a new slot number, checking that it isn't zero.
    /// # Errors
    /// Returns [`Error::InvalidSlot`] if `slot` is zero or doesn't fit in a byte.
    pub fn new(slot: impl TryInto<u8>) -> Result<Self, Error> {
        let slot = slot.try_into().ok().with_context(invalid_slot)?;
        ensure!(slot >= 1, invalid_slot());
        Ok(Self(slot))
    }

    /// Slot number for the zero-based array position `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        let slot = u8::try_from(index.checked_add(1)?).ok()?;
        Some(Self(slot))
    }

    /// Zero-based array position of this slot.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl Deref for SlotNumber {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Position of a learned event in the event table.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct EventIndex(u8);

impl EventIndex {
    /// Index into the event table.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// The index as a `usize`, for indexing.
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for EventIndex {
    fn from(index: u8) -> Self {
        Self(index)
    }
}

/// `Route` is an application level route identifier, never zero.
///
/// On the wire (event variables and outgoing event numbers) a route is a
/// single byte where 0 means "no route configured". Inside the crate that
/// sentinel is an `Option<Route>` instead.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Copy, Clone, Hash)]
#[repr(transparent)]
pub struct Route(NonZeroU8);

/// Create a new [`Route`], panics if `r` is zero.
pub const fn route(r: u8) -> Route {
    match NonZeroU8::new(r) {
        Some(r) => Route(r),
        None => panic!("Invalid route."),
    }
}

impl Route {
    /// Create a new route, checking that it isn't the "unconfigured" value 0.
    /// # Errors
    /// Returns [`Error::InvalidRoute`] if `route` is zero or doesn't fit in a byte.
    pub fn new(route: impl TryInto<u8>) -> Result<Self, Error> {
        let route = route.try_into().ok().with_context(invalid_route)?;
        NonZeroU8::new(route).map(Self).with_context(invalid_route)
    }

    /// Interpret a raw slot value, 0 meaning no route.
    pub const fn from_slot(value: u8) -> Option<Self> {
        match NonZeroU8::new(value) {
            Some(r) => Some(Self(r)),
            None => None,
        }
    }

    /// The route number.
    pub const fn get(self) -> u8 {
        self.0.get()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<u8> for Route {
    fn eq(&self, other: &u8) -> bool {
        self.get() == *other
    }
}

#[cfg(test)]
mod can_id_tests {
    use super::CanId;

    #[test]
    fn test_valid_can_ids() {
        for n in 1..=127 {
            let id = CanId::new(n).unwrap();
            assert_eq!(*id, n);
        }
    }

    #[test]
    fn test_can_id() {
        assert!(CanId::new(0).is_err());
        assert!(CanId::new(128).is_err());
        assert!(CanId::new(-1).is_err());
        assert_eq!(super::can_id(5), CanId::new(5u16).unwrap());
    }
}


#[cfg(test)]
mod number_tests {
    use super::{EventId, EventNumber, NodeNumber};

    #[test]
    fn test_byte_order() {
        let nn = NodeNumber::new(0x0102).unwrap();
        assert_eq!(nn.to_bytes(), [0x01, 0x02]);
        assert_eq!(NodeNumber::from_bytes(0x01, 0x02), nn);
        assert_eq!(EventNumber::from_bytes(0xff, 0x00), EventNumber::new(0xff00).unwrap());
        assert!(NodeNumber::new(70_000).is_err());
    }

    #[test]
    fn test_short_event_ignores_node() {
        let short = EventId::short(super::event(9));
        assert_eq!(*short.node, 0);
        assert_ne!(short, EventId::long(super::node(1), super::event(9)));
    }
}
