//! Connection state machine and reconnect policy.
//!
//! # State Machine
//!
//! ```text
//! Idle --open()--> Connecting --transport open--> Open
//! Open/Connecting --transport lost, attempts < max--> Reconnecting
//! Reconnecting --retry timer--> Connecting        (attempts += 1)
//! Open/Connecting --transport lost, attempts >= max--> Failed
//! any --close()--> Idle
//! ```
//!
//! The machine is a plain struct with one method per event kind. It holds no
//! timers or sockets; [`super::ConnectionManager`] performs the side effects
//! it asks for.
//!
//! # Attempt Counter
//!
//! The counter only resets on a successful open. Neither `open()` nor
//! `close()` reset it, so an `open()` after `Failed` that cannot connect
//! fails again straight away.

use std::fmt;
use std::time::Duration;

/// Default delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Default number of reconnect attempts per episode.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected and not trying to.
    #[default]
    Idle,
    /// Establishing a transport connection.
    Connecting,
    /// Connected and receiving messages.
    Open,
    /// Waiting for the reconnect timer.
    Reconnecting,
    /// Reconnect budget spent; needs an explicit `open()`.
    Failed,
}

impl ConnectionState {
    /// True while a connection exists or is being established.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Fixed-delay, bounded reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before each reconnect attempt.
    pub delay: Duration,

    /// Maximum reconnect attempts per episode.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// What the manager must do after a transport loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossAction {
    /// Schedule one reconnect timer.
    Retry {
        /// Attempt number the timer will start (1-based).
        attempt: u32,
        /// Delay before the attempt.
        delay: Duration,
    },
    /// Give up; the machine is now `Failed`.
    GiveUp {
        /// Attempts made in this episode.
        attempts: u32,
    },
    /// Loss reported while not connected (ignored).
    Ignored,
}

/// Pure connection state machine.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    attempts: u32,
    policy: ReconnectPolicy,
}

impl ConnectionMachine {
    /// Create an idle machine.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            attempts: 0,
            policy,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect attempts made since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Request a connection. Returns false (no-op) if already connecting or open.
    pub fn open(&mut self) -> bool {
        if self.state.is_active() {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    /// The transport acknowledged the connection.
    pub fn transport_opened(&mut self) {
        self.state = ConnectionState::Open;
        self.attempts = 0;
    }

    /// The transport closed or errored.
    pub fn transport_lost(&mut self) -> LossAction {
        if !self.state.is_active() {
            return LossAction::Ignored;
        }

        if self.attempts < self.policy.max_attempts {
            self.state = ConnectionState::Reconnecting;
            LossAction::Retry {
                attempt: self.attempts + 1,
                delay: self.policy.delay,
            }
        } else {
            self.state = ConnectionState::Failed;
            LossAction::GiveUp {
                attempts: self.attempts,
            }
        }
    }

    /// The reconnect timer fired. Returns false if no retry was pending.
    pub fn retry_due(&mut self) -> bool {
        if self.state != ConnectionState::Reconnecting {
            return false;
        }
        self.attempts += 1;
        self.state = ConnectionState::Connecting;
        true
    }

    /// Explicit shutdown.
    pub fn close(&mut self) {
        self.state = ConnectionState::Idle;
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
