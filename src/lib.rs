//! Sans-io implementation of a route selecting CBUS node.
//!
//! A push button on the layout produces an accessory event. Each learned event
//! carries a set of candidate routes in its event variables. Pressing two
//! buttons within the timing window selects the route both buttons have in
//! common, and the node announces it as an ACON event with the route as the
//! event number.
//!
//! The library does no I/O. Feed GridConnect bytes received from the bus into
//! [`NodeState`] together with a monotonic millisecond clock, and write the
//! bytes it hands back. [`RouteSelector`] can also be driven directly by
//! hosts that do their own frame handling.
//!
//! Diagnostics are reported through the [`log`](https://docs.rs/log) facade.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

mod buffer;
pub mod candidates;
pub mod config;
pub mod events;
pub mod frame;
pub mod gridconnect;
pub mod node;
pub mod resolver;
pub mod selector;
pub mod timer;
pub mod types;

pub use candidates::{CandidateSet, CandidateStore};
pub use config::{ConfigStore, NodeConfig};
pub use events::EventTable;
pub use frame::Frame;
pub use node::NodeState;
pub use resolver::{resolve, Resolution, RouteDecision};
pub use selector::{Activation, RouteSelector};
pub use timer::PressTimer;
pub use types::{
    can_id, event, node, route, CanId, EventId, EventIndex, EventNumber, Millis, NodeNumber,
    Route, SlotNumber,
};
