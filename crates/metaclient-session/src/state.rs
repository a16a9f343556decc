//! Small value types describing where a session is.

use std::fmt;
use std::time::Instant;

use metaclient_protocol::Command;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The protocol state of a metaserver session.
///
/// ```text
///   Offline ──login()──→ Connecting ──LOGIN ack──→ Lobby ⇄ InGame
///      ↑                                             │
///      └──────────────────logout()───────────────────┘
/// ```
///
/// Whether the session is in error is tracked separately (see
/// [`Session::has_error`](crate::Session::has_error)): an error can be
/// raised from any of these states and sticks until a successful relogin
/// or a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection to the metaserver.
    #[default]
    Offline,
    /// A `LOGIN`/`RELOGIN` was sent and we are waiting for the answer.
    Connecting,
    /// Logged in and sitting in the lobby.
    Lobby,
    /// Logged in and hosting, joining, or playing a game.
    InGame,
}

impl SessionState {
    /// `true` in [`Lobby`](Self::Lobby) and [`InGame`](Self::InGame).
    pub fn is_logged_in(self) -> bool {
        matches!(self, SessionState::Lobby | SessionState::InGame)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Offline => "offline",
            SessionState::Connecting => "connecting",
            SessionState::Lobby => "in the lobby",
            SessionState::InGame => "in a game",
        })
    }
}

// ---------------------------------------------------------------------------
// ClientRights
// ---------------------------------------------------------------------------

/// Account level the metaserver grants a client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientRights {
    #[default]
    Unregistered,
    Registered,
    Superuser,
    /// A value this client does not know, kept verbatim.
    Other(String),
}

impl ClientRights {
    /// Parses the wire value. Never fails; unknown values become
    /// [`ClientRights::Other`].
    pub fn from_wire(value: &str) -> Self {
        match value {
            "UNREGISTERED" => ClientRights::Unregistered,
            "REGISTERED" => ClientRights::Registered,
            "SUPERUSER" => ClientRights::Superuser,
            other => ClientRights::Other(other.to_owned()),
        }
    }

    /// The wire value.
    pub fn as_str(&self) -> &str {
        match self {
            ClientRights::Unregistered => "UNREGISTERED",
            ClientRights::Registered => "REGISTERED",
            ClientRights::Superuser => "SUPERUSER",
            ClientRights::Other(other) => other,
        }
    }
}

impl fmt::Display for ClientRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PendingCommand
// ---------------------------------------------------------------------------

/// A request that is blocked on a specific acknowledgment from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    /// Which command we are waiting on (`GAME_CONNECT`, `GAME_OPEN` or
    /// `GAME_START`).
    pub command: Command,
    /// When we give up waiting. `None` after the deadline fired and the
    /// command is parked until a relogin resubmits it.
    pub deadline: Option<Instant>,
}

impl PendingCommand {
    /// `true` if the deadline is set and has passed at `now`.
    pub fn is_overdue(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }
}
