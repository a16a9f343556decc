//! # metaclient
//!
//! Client for the game metaserver: the lobby where players log in, chat,
//! see who is online and find games to join.
//!
//! The work is split across layered crates, re-exported here:
//!
//! | Crate | Concern |
//! |---|---|
//! | `metaclient-transport` | TCP connection |
//! | `metaclient-protocol` | length-prefixed frames of NUL-terminated strings |
//! | `metaclient-session` | login, relogin, rosters, chat, games |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metaclient::prelude::*;
//!
//! # async fn run() -> Result<(), MetaclientError> {
//! metaclient::init_tracing();
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.login("alice", "", false, "localhost", 7395).await?;
//!
//! loop {
//!     session.pump().await;
//!     if session.update_for_games() {
//!         for game in session.games() {
//!             println!("{} ({})", game.name, game.build_id);
//!         }
//!     }
//!     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//! }
//! # }
//! ```

mod error;
mod logging;

use std::path::Path;

use metaclient_session::SessionConfig;

pub use error::MetaclientError;
pub use logging::{DEFAULT_FILTER, default_env_filter, init_tracing};

pub use metaclient_protocol as protocol;
pub use metaclient_session as session;
pub use metaclient_transport as transport;

/// Reads a JSON session config from `path`. Missing fields take their
/// defaults.
///
/// # Errors
/// [`MetaclientError::Io`] if the file cannot be read,
/// [`MetaclientError::Config`] if it is not a valid config.
pub fn load_config(path: impl AsRef<Path>) -> Result<SessionConfig, MetaclientError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = SessionConfig::from_json_str(&text)?;
    tracing::debug!(
        path = %path.display(),
        host = %config.host,
        port = config.port,
        "loaded config"
    );
    Ok(config)
}

/// The names most applications need.
pub mod prelude {
    pub use crate::MetaclientError;
    pub use metaclient_session::{
        ChatChannel, ChatMessage, Client, ClientRights, Game, Session, SessionConfig,
        SessionError, SessionState,
    };
}
