//! See [`NodeState`] for more details.

use arrayvec::ArrayVec;

use crate::buffer::Buffer;
use crate::config::{NodeConfig, Settings};
use crate::events::EventTable;
use crate::frame::Frame;
use crate::gridconnect::{encode, parse_frame, EncodedFrame, FrameToken};
use crate::selector::RouteSelector;
use crate::types::{Millis, Route};

/// Event variable slots per learned event.
pub const DEFAULT_SLOTS: usize = 20;

/// Number of events a node can learn.
pub const DEFAULT_EVENTS: usize = 32;

/// Route decisions that can wait for transmission.
const OUTBOX_LEN: usize = 16;

/// Route selecting CBUS node, speaking GridConnect.
///
/// This enum represents the different states of the node. It never touches
/// the serial port or the clock itself: received bytes are fed in together
/// with a monotonic millisecond timestamp, and encoded frames are handed back
/// for transmission.
///
/// # Example
///
/// ```
/// use cbus_route_select::{event, node, EventId, NodeConfig, NodeState};
/// # use std::io::{Read, Write, Cursor};
/// # fn connect_serial_interface() -> Result<Cursor<Vec<u8>>,  &'static str>
/// # { Ok(Cursor::new(Vec::new())) }
/// # fn millis() -> u64 { 0 }
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // a button producing event 1 of node 100 offers routes 3, 4 and 5
/// let button = EventId::long(node(100), event(1));
/// let config = NodeConfig::new(256, 10)?.with_timing_window(5);
/// let mut node: NodeState = NodeState::new(config);
/// node.events_mut().learn(button, &[3, 4, 5])?;
/// let mut serial = connect_serial_interface()?;
///
/// 'main: loop {
///        # break // this snippet is only for show
///        node = match node {
///            NodeState::ReceiveData(recv) => {
///                let mut buf = [0; 32];
///                match serial.read(&mut buf) {
///                    Ok(0) | Err(_) => break 'main,
///                    Ok(len) => recv.receive_data(&buf[..len], millis()),
///                }
///            }
///
///            NodeState::SendData(send) => {
///                serial.write_all(send.get_data())?;
///                send.data_sent()
///            }
///        };
/// }
/// # Ok(()) }
///  ```
#[derive(Debug)]
pub enum NodeState<const N: usize = DEFAULT_SLOTS, const CAP: usize = DEFAULT_EVENTS> {
    /// More data needs to be received from the bus. Use receive_data() on the inner struct.
    ReceiveData(ReceiveData<N, CAP>),
    /// A route decision is waiting to be transmitted.
    SendData(SendData<N, CAP>),
}

impl<const N: usize, const CAP: usize> NodeState<N, CAP> {
    /// Create a new node with an empty event table.
    pub fn new(config: NodeConfig) -> Self {
        Self::with_events(config, EventTable::new())
    }

    /// Create a new node with previously learned events.
    pub fn with_events(config: NodeConfig, events: EventTable<N, CAP>) -> Self {
        ReceiveData::new(config, events).into()
    }

    /// The node's configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.state().config
    }

    /// The learned events.
    pub fn events(&self) -> &EventTable<N, CAP> {
        &self.state().events
    }

    /// Mutable access to the learned events, for teaching and unlearning.
    pub fn events_mut(&mut self) -> &mut EventTable<N, CAP> {
        match self {
            Self::ReceiveData(ReceiveData { state }) | Self::SendData(SendData { state, .. }) => {
                &mut state.events
            }
        }
    }

    /// Candidate store and press timer.
    pub fn selector(&self) -> &RouteSelector<N> {
        &self.state().selector
    }

    fn state(&self) -> &CommonState<N, CAP> {
        match self {
            Self::ReceiveData(ReceiveData { state }) | Self::SendData(SendData { state, .. }) => {
                state
            }
        }
    }
}

impl<const N: usize, const CAP: usize> From<ReceiveData<N, CAP>> for NodeState<N, CAP> {
    fn from(x: ReceiveData<N, CAP>) -> Self {
        Self::ReceiveData(x)
    }
}

impl<const N: usize, const CAP: usize> From<SendData<N, CAP>> for NodeState<N, CAP> {
    fn from(x: SendData<N, CAP>) -> Self {
        Self::SendData(x)
    }
}

#[derive(Debug)]
struct CommonState<const N: usize, const CAP: usize> {
    config: NodeConfig,
    events: EventTable<N, CAP>,
    selector: RouteSelector<N>,
    input_buffer: Buffer,
    // timestamp of the bytes in input_buffer
    now: Millis,
    // decisions not yet handed out by SendData, oldest first
    outbox: ArrayVec<Route, OUTBOX_LEN>,
}

impl<const N: usize, const CAP: usize> CommonState<N, CAP> {
    fn handle_frame(&mut self, frame: &Frame) -> Option<Route> {
        if frame.can_id() == *self.config.can_id() {
            log::trace!("Ignoring own frame {:?}", frame);
            return None;
        }
        let Some(event) = frame.event_id() else {
            log::trace!("Ignoring opcode {:#04x}", frame.opcode());
            return None;
        };
        let Some(index) = self.events.lookup(event) else {
            log::trace!("Ignoring unlearned event {}", event);
            return None;
        };

        let settings = Settings {
            config: &self.config,
            events: &self.events,
        };
        self.selector
            .on_activation(index, frame, self.now, &settings)
            .route()
    }

    /// Handle every complete frame in the input buffer.
    fn parse_buffer(&mut self) {
        loop {
            let (consumed, token) = parse_frame(self.input_buffer.as_ref());
            self.input_buffer.consume(consumed);
            match token {
                FrameToken::NeedData => return,
                FrameToken::Ignored => {}
                FrameToken::Frame(frame) => {
                    if let Some(route) = self.handle_frame(&frame) {
                        self.queue(route);
                    }
                }
            }
        }
    }

    fn queue(&mut self, route: Route) {
        if self.outbox.is_full() {
            log::warn!("Too many routes waiting, dropping route {}", self.outbox[0]);
            self.outbox.remove(0);
        }
        self.outbox.push(route);
    }

    fn next_state(mut self) -> NodeState<N, CAP> {
        match self.outbox.pop_at(0) {
            Some(route) => SendData::from_route(self, route),
            None => ReceiveData { state: self }.into(),
        }
    }
}

/// Struct with methods for the "receive data from bus" state.
#[derive(Debug)]
pub struct ReceiveData<const N: usize = DEFAULT_SLOTS, const CAP: usize = DEFAULT_EVENTS> {
    state: CommonState<N, CAP>,
}

impl<const N: usize, const CAP: usize> ReceiveData<N, CAP> {
    /// Create a new node in the "receive" state without the `NodeState` wrapper.
    pub fn new(config: NodeConfig, events: EventTable<N, CAP>) -> Self {
        Self {
            state: CommonState {
                config,
                events,
                selector: RouteSelector::new(),
                input_buffer: Buffer::new(),
                now: 0,
                outbox: ArrayVec::new(),
            },
        }
    }

    /// Feed data received at `now` into the internal buffer, and handle every
    /// complete frame in it.
    ///
    /// Input of any length is taken in pieces that fit the buffer, with the
    /// frames of each piece handled before the next is written. A state
    /// transition will occur if any route was selected; decisions are then
    /// handed out one at a time, in the order they were made.
    pub fn receive_data(mut self, mut data: &[u8], now: Millis) -> NodeState<N, CAP> {
        self.state.now = now;
        while !data.is_empty() {
            let written = self.state.input_buffer.write(data);
            data = &data[written..];
            self.state.parse_buffer();
        }
        self.state.next_state()
    }
}

/// Struct with methods for the "transmit data on bus" state.
///
/// Call [`get_data()`](Self::get_data()) to get a reference to the data to be transmitted,
/// and then call [`data_sent()`](Self::data_sent()) when the data has been handed to the bus.
#[derive(Debug)]
pub struct SendData<const N: usize = DEFAULT_SLOTS, const CAP: usize = DEFAULT_EVENTS> {
    state: CommonState<N, CAP>,
    route: Route,
    data: EncodedFrame,
}

impl<const N: usize, const CAP: usize> SendData<N, CAP> {
    fn from_route(state: CommonState<N, CAP>, route: Route) -> NodeState<N, CAP> {
        let config = &state.config;
        let frame = Frame::route_event(
            config.priority(),
            config.can_id(),
            config.node_number(),
            route,
        );
        let data = encode(&frame);
        Self { state, route, data }.into()
    }

    /// Returns the data to be sent on the bus.
    pub fn get_data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// The route being announced.
    pub const fn route(&self) -> Route {
        self.route
    }

    /// Signals that the data was sent. The next waiting route decision, if
    /// any, is up for sending, otherwise the node goes back to the
    /// `ReceiveData` state.
    pub fn data_sent(self) -> NodeState<N, CAP> {
        self.state.next_state()
    }
}
