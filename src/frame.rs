//! CBUS frames, and the accessory event opcodes a route selecting node reacts to.
//!
//! A CBUS frame is a standard CAN frame with an 11-bit identifier made of a
//! 4-bit priority and the sender's 7-bit CAN id. The first data byte is the
//! opcode, and the opcode's three most significant bits give the number of
//! data bytes that follow it.

use arrayvec::ArrayVec;
use snafu::{ensure, Snafu};

use crate::types::{CanId, EventId, EventNumber, NodeNumber, Route};

/// Accessory event opcodes.
///
/// Every "off" opcode is its "on" counterpart with the least significant bit set.
pub mod opcode {
    /// Long accessory on
    pub const ACON: u8 = 0x90;
    /// Long accessory off
    pub const ACOF: u8 = 0x91;
    /// Short accessory on
    pub const ASON: u8 = 0x98;
    /// Short accessory off
    pub const ASOF: u8 = 0x99;
    pub const ACON1: u8 = 0xB0;
    pub const ACOF1: u8 = 0xB1;
    pub const ASON1: u8 = 0xB8;
    pub const ASOF1: u8 = 0xB9;
    pub const ACON2: u8 = 0xD0;
    pub const ACOF2: u8 = 0xD1;
    pub const ASON2: u8 = 0xD8;
    pub const ASOF2: u8 = 0xD9;
    pub const ACON3: u8 = 0xF0;
    pub const ACOF3: u8 = 0xF1;
    pub const ASON3: u8 = 0xF8;
    pub const ASOF3: u8 = 0xF9;
}

/// Priority used for frames produced by this crate.
pub const DEFAULT_PRIORITY: u8 = 0b1011;

/// Maximum number of data bytes following the opcode.
pub const MAX_DATA: usize = 7;

/// Data bytes following the opcode.
pub type FrameData = ArrayVec<u8, MAX_DATA>;

/// Error type for this module
#[derive(Debug, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The number of data bytes doesn't match what the opcode requires.
    #[snafu(display("Opcode {:#04x} expects {} data bytes, got {}", opcode, expected, actual))]
    DataLength {
        opcode: u8,
        expected: usize,
        actual: usize,
    },
    /// Priority doesn't fit in four bits.
    #[snafu(display("Invalid priority {}", priority))]
    InvalidPriority { priority: u8 },
    /// CAN id doesn't fit in seven bits.
    #[snafu(display("Invalid CAN id {}", id))]
    InvalidCanId { id: u8 },
}

/// Number of data bytes following `opcode`.
pub const fn data_len(opcode: u8) -> usize {
    (opcode >> 5) as usize
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum EventKind {
    Long,
    Short,
}

fn event_kind(opcode: u8) -> Option<EventKind> {
    if data_len(opcode) < 4 {
        return None;
    }
    match opcode & 0x1f {
        0x10 | 0x11 => Some(EventKind::Long),
        0x18 | 0x19 => Some(EventKind::Short),
        _ => None,
    }
}

/// Returns true if `opcode` is one of the accessory event opcodes in [`opcode`].
pub fn is_accessory_event(opcode: u8) -> bool {
    event_kind(opcode).is_some()
}

/// A single CBUS frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    priority: u8,
    can_id: u8,
    opcode: u8,
    data: FrameData,
}

impl Frame {
    /// Create a frame, checking the header fields and the data length against the opcode.
    /// # Errors
    /// Returns [`Error::DataLength`] if `data` isn't exactly as long as `opcode` requires,
    /// and [`Error::InvalidPriority`] or [`Error::InvalidCanId`] for header fields out of range.
    pub fn new(priority: u8, can_id: u8, opcode: u8, data: &[u8]) -> Result<Self, Error> {
        ensure!(priority <= 0x0f, InvalidPrioritySnafu { priority });
        ensure!(can_id <= 0x7f, InvalidCanIdSnafu { id: can_id });
        let expected = data_len(opcode);
        ensure!(
            data.len() == expected,
            DataLengthSnafu {
                opcode,
                expected,
                actual: data.len()
            }
        );
        let mut buf = FrameData::new();
        buf.extend(data.iter().copied());
        Ok(Self {
            priority,
            can_id,
            opcode,
            data: buf,
        })
    }

    /// An ACON frame from `node` announcing `route` as the event number.
    pub fn route_event(priority: u8, can_id: CanId, node: NodeNumber, route: Route) -> Self {
        let mut data = FrameData::new();
        data.extend(node.to_bytes());
        data.extend(EventNumber::from(route).to_bytes());
        Self {
            priority: priority & 0x0f,
            can_id: *can_id,
            opcode: opcode::ACON,
            data,
        }
    }

    /// 4-bit CAN priority.
    pub const fn priority(&self) -> u8 {
        self.priority
    }

    /// CAN id of the sending node.
    pub const fn can_id(&self) -> u8 {
        self.can_id
    }

    /// CBUS opcode.
    pub const fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Data bytes following the opcode.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True for de-activations: the opcode's least significant bit is set.
    pub const fn is_off(&self) -> bool {
        self.opcode & 0x01 == 0x01
    }

    /// The event this frame carries, if it is an accessory event.
    pub fn event_id(&self) -> Option<EventId> {
        let kind = event_kind(self.opcode)?;
        let d = &self.data;
        let event = EventNumber::from_bytes(d[2], d[3]);
        Some(match kind {
            EventKind::Long => EventId::long(NodeNumber::from_bytes(d[0], d[1]), event),
            EventKind::Short => EventId::short(event),
        })
    }
}
