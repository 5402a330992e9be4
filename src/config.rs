//! Node configuration, and the read-only view of it used by the route selector.

use snafu::{ensure, ResultExt, Snafu};

use core::convert::TryInto;

use crate::events::EventTable;
use crate::frame::DEFAULT_PRIORITY;
use crate::types::{self, CanId, EventIndex, Millis, NodeNumber, SlotNumber};

/// The timing window node variable counts in units of this many milliseconds.
pub const WINDOW_UNIT_MS: Millis = 100;

/// Timing window used until the node variable is set, in [`WINDOW_UNIT_MS`] units.
pub const DEFAULT_TIMING_WINDOW: u8 = 10;

/// Error type for this module
#[derive(Debug, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Invalid node configuration: {}", source))]
    Value { source: types::Error },
    /// Node number 0 is reserved for short events.
    #[snafu(display("Node number 0 can't be used by a node"))]
    ZeroNodeNumber,
    #[snafu(display("Invalid priority {}", priority))]
    Priority { priority: u8 },
}

/// Configuration reads the route selector depends on.
pub trait ConfigStore {
    /// Raw value of event variable `slot` for the learned event at `index`.
    /// Returns 0 for anything that isn't configured.
    fn slot_value(&self, index: EventIndex, slot: SlotNumber) -> u8;

    /// The timing window node variable, in [`WINDOW_UNIT_MS`] units.
    fn timing_window(&self) -> u8;
}

/// Convert the timing window node variable into milliseconds.
pub fn timing_window_ms(config: u8) -> Millis {
    Millis::from(config) * WINDOW_UNIT_MS
}

/// Identity and node variables of a route selecting node.
///
/// ```
/// use cbus_route_select::config::NodeConfig;
/// let config = NodeConfig::new(256, 10).unwrap().with_timing_window(5);
/// assert_eq!(config.timing_window(), 5);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    node_number: NodeNumber,
    can_id: CanId,
    timing_window: u8,
    priority: u8,
}

impl NodeConfig {
    /// # Errors
    /// Returns [`Error::ZeroNodeNumber`] for node number 0, and [`Error::Value`]
    /// if either value is out of range.
    pub fn new(node_number: impl TryInto<u16>, can_id: impl TryInto<u8>) -> Result<Self, Error> {
        let node_number = NodeNumber::new(node_number).context(ValueSnafu)?;
        ensure!(*node_number != 0, ZeroNodeNumberSnafu);
        Ok(Self {
            node_number,
            can_id: CanId::new(can_id).context(ValueSnafu)?,
            timing_window: DEFAULT_TIMING_WINDOW,
            priority: DEFAULT_PRIORITY,
        })
    }

    /// Set the timing window node variable, in [`WINDOW_UNIT_MS`] units.
    pub const fn with_timing_window(mut self, units: u8) -> Self {
        self.timing_window = units;
        self
    }

    /// Set the priority of the frames this node sends.
    /// # Errors
    /// Returns [`Error::Priority`] if `priority` doesn't fit in four bits.
    pub fn with_priority(mut self, priority: u8) -> Result<Self, Error> {
        ensure!(priority <= 0x0f, PrioritySnafu { priority });
        self.priority = priority;
        Ok(self)
    }

    /// Node number used for announced events.
    pub const fn node_number(&self) -> NodeNumber {
        self.node_number
    }

    /// The node's own CAN id.
    pub const fn can_id(&self) -> CanId {
        self.can_id
    }

    /// Timing window in units of 100 ms.
    pub const fn timing_window(&self) -> u8 {
        self.timing_window
    }

    /// CAN priority of announced events.
    pub const fn priority(&self) -> u8 {
        self.priority
    }
}

/// Node variables and learned events, seen through [`ConfigStore`].
#[derive(Debug, Copy, Clone)]
pub struct Settings<'a, const N: usize, const CAP: usize> {
    pub config: &'a NodeConfig,
    pub events: &'a EventTable<N, CAP>,
}

impl<const N: usize, const CAP: usize> ConfigStore for Settings<'_, N, CAP> {
    fn slot_value(&self, index: EventIndex, slot: SlotNumber) -> u8 {
        self.events.slot_value(index, slot)
    }

    fn timing_window(&self) -> u8 {
        self.config.timing_window()
    }
}
