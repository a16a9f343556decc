//! The metaserver client session.
//!
//! This crate holds everything between "a socket that moves frames" and
//! "a lobby the UI can show":
//!
//! 1. **Login** and the automatic **relogin** after a broken connection
//!    ([`Session::login`], [`Session::relogin`], [`Session::pump`])
//! 2. **Lobby state**: the client and game rosters, kept up to date from the
//!    server's full snapshots ([`Roster`], [`Client`], [`Game`])
//! 3. **Chat**, including every system notice the session produces
//!    ([`ChatLog`], [`ChatMessage`])
//! 4. **Games**: hosting, joining and leaving, with one outstanding request
//!    whose answer is awaited ([`PendingCommand`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← calls pump() regularly, renders chat and rosters
//!     ↕
//! Session Layer (this crate)  ← state machine, rosters, chat, recovery
//!     ↕
//! Protocol Layer (below)  ← frames, packets, commands
//!     ↕
//! Transport Layer (below)  ← TCP socket
//! ```

mod chat;
mod config;
mod connection;
mod dispatch;
mod error;
mod messages;
mod reconnect;
mod roster;
mod session;
mod state;

pub use chat::{ChatChannel, ChatLog, ChatMessage, UNKNOWN_SENDER};
pub use config::SessionConfig;
pub use error::SessionError;
pub use messages::{describe, describe_with};
pub use reconnect::{BreakVerdict, ReconnectPolicy};
pub use roster::{Client, Game, Roster, RosterDiff, RosterEntry, diff_by_name};
pub use session::{INGAME_PREFIX, Session};
pub use state::{ClientRights, PendingCommand, SessionState};
