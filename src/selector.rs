//! The route selector reacts to each activation of a learned event.
//!
//! It is a two state machine. While *waiting*, an activation only seeds the
//! candidate store. While *armed*, within the timing window of the previous
//! activation, the new candidates are intersected with the stored ones and a
//! route is chosen. Every activation refreshes the store and restarts the
//! window, so the machine free runs for as long as the node does.
//!
//! [`RouteSelector::on_activation`] runs to completion without blocking and
//! must not be re-entered. Give each selector a single owner.

use crate::candidates::{CandidateSet, CandidateStore};
use crate::config::{timing_window_ms, ConfigStore};
use crate::frame::Frame;
use crate::resolver::{resolve, RouteDecision};
use crate::timer::PressTimer;
use crate::types::{EventIndex, Millis, Route};

/// What an activation led to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A de-activation ("off" event), state is untouched.
    Ignored,
    /// Outside the timing window, candidates were stored for the next press.
    First,
    /// Inside the timing window, candidates were resolved.
    Resolved(RouteDecision),
}

impl Activation {
    /// The route to announce on the bus, if any.
    pub fn route(&self) -> Option<Route> {
        match self {
            Self::Resolved(decision) => decision.route(),
            Self::Ignored | Self::First => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSelector<const N: usize> {
    candidates: CandidateStore<N>,
    timer: PressTimer,
}

impl<const N: usize> RouteSelector<N> {
    /// A selector with no stored candidates and the timer at 0.
    pub const fn new() -> Self {
        Self {
            candidates: CandidateStore::new(),
            timer: PressTimer::new(),
        }
    }

    /// Handle one activation of the learned event at `index`, carried by `frame`,
    /// received at `now`.
    pub fn on_activation(
        &mut self,
        index: EventIndex,
        frame: &Frame,
        now: Millis,
        store: &impl ConfigStore,
    ) -> Activation {
        if frame.is_off() {
            log::debug!("Ignoring off event {:#04x} for index {}", frame.opcode(), index.get());
            return Activation::Ignored;
        }

        let window = timing_window_ms(store.timing_window());
        let candidates = self.candidates.capture(store, index);

        let activation = if self.timer.is_subsequent(now, window) {
            let decision = resolve(&candidates, self.candidates.stored());
            log::info!("{}", decision);
            Activation::Resolved(decision)
        } else {
            log::debug!("First press on index {}, waiting {} ms", index.get(), window);
            Activation::First
        };

        self.candidates.replace(candidates);
        self.timer.record_now(now);
        activation
    }

    /// Candidates stored by the last activation.
    pub const fn stored(&self) -> &CandidateSet<N> {
        self.candidates.stored()
    }

    /// Time of the last activation.
    pub const fn timer(&self) -> &PressTimer {
        &self.timer
    }
}
