use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Manager lifecycle states, in the only order they can be visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    Initializing = 0,
    Startable = 1,
    Stoppable = 2,
    Dead = 3,
}

impl LifecycleState {
    /// The single state reachable from this one; `None` once dead
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Initializing => Some(Self::Startable),
            Self::Startable => Some(Self::Stoppable),
            Self::Stoppable => Some(Self::Dead),
            Self::Dead => None,
        }
    }

    /// Whether the registries may be queried in this state
    pub fn allows_queries(self) -> bool {
        matches!(self, Self::Startable | Self::Stoppable)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Initializing,
            1 => Self::Startable,
            2 => Self::Stoppable,
            _ => Self::Dead,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Startable => "startable",
            Self::Stoppable => "stoppable",
            Self::Dead => "dead",
        };
        f.write_str(name)
    }
}

/// Atomic holder for the current lifecycle state.
///
/// Only the transition lock holder calls [`StateCell::advance`]; any thread
/// may call [`StateCell::load`].
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Initializing as u8))
    }

    pub fn load(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to the successor of `from`. Returns the new state.
    pub fn advance(&self, from: LifecycleState) -> LifecycleState {
        let to = from.next().unwrap_or(LifecycleState::Dead);
        self.0.store(to as u8, Ordering::Release);
        to
    }

    /// Jump straight to `Dead` after an aborted initialization
    pub fn terminate(&self) {
        self.0.store(LifecycleState::Dead as u8, Ordering::Release);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
