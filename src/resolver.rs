//! Intersects a new candidate set with the stored one and picks a route.

use core::fmt;

use crate::candidates::CandidateSet;
use crate::types::Route;

/// Outcome of [`resolve`]: the chosen route, and how many slots matched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    route: Option<Route>,
    matches: usize,
}

/// How a [`RouteDecision`] came about.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No candidate in common.
    NoMatch,
    /// Exactly one slot matched.
    Unique(Route),
    /// Several slots matched, the first one won.
    Ambiguous { route: Route, matches: usize },
}

impl RouteDecision {
    /// The selected route, `None` if nothing matched.
    pub const fn route(&self) -> Option<Route> {
        self.route
    }

    /// Number of slots in the new set whose route is also in the stored set.
    pub const fn matches(&self) -> usize {
        self.matches
    }

    /// Wire representation of the route, 0 for no decision.
    pub fn to_byte(&self) -> u8 {
        self.route.map_or(0, Route::get)
    }

    /// Classify the decision by match count.
    pub fn resolution(&self) -> Resolution {
        match (self.route, self.matches) {
            (Some(route), 1) => Resolution::Unique(route),
            (Some(route), matches) => Resolution::Ambiguous { route, matches },
            (None, _) => Resolution::NoMatch,
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolution() {
            Resolution::NoMatch => write!(f, "no possible routes found"),
            Resolution::Unique(route) => write!(f, "1 possible route found, route {}", route),
            Resolution::Ambiguous { route, matches } => {
                write!(f, "{} possible routes found, choosing route {}", matches, route)
            }
        }
    }
}

/// Match every configured slot of `new` against the whole of `stored`.
///
/// Membership isn't position aligned. Every matching slot counts, so a route
/// listed twice in `new` is counted twice. The first matching slot, in slot
/// order, selects the route.
pub fn resolve<const N: usize>(new: &CandidateSet<N>, stored: &CandidateSet<N>) -> RouteDecision {
    let mut matching = new.routes().filter(|route| stored.contains(*route));
    let route = matching.next();
    let matches = route.map_or(0, |_| 1 + matching.count());
    RouteDecision { route, matches }
}
