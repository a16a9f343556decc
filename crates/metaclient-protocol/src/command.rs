//! Command names: the first field of every packet.
//!
//! Client and server share one vocabulary. Some names only travel one way
//! (`PONG` is client→server, `PING` is server→client) and some travel both
//! ways with different payloads (`LOGIN` is a request one way and an
//! acknowledgment the other).

use std::fmt;
use std::str::FromStr;

/// A metaserver command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Login,
    Relogin,
    Disconnect,
    Error,
    Ping,
    Pong,
    Time,
    Chat,
    Clients,
    ClientsUpdate,
    Games,
    GamesUpdate,
    GameOpen,
    GameConnect,
    GameStart,
    GameDisconnect,
    Motd,
    Announcement,
}

impl Command {
    /// Every command, in no particular order.
    pub const ALL: [Command; 18] = [
        Command::Login,
        Command::Relogin,
        Command::Disconnect,
        Command::Error,
        Command::Ping,
        Command::Pong,
        Command::Time,
        Command::Chat,
        Command::Clients,
        Command::ClientsUpdate,
        Command::Games,
        Command::GamesUpdate,
        Command::GameOpen,
        Command::GameConnect,
        Command::GameStart,
        Command::GameDisconnect,
        Command::Motd,
        Command::Announcement,
    ];

    /// The literal string sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Login => "LOGIN",
            Command::Relogin => "RELOGIN",
            Command::Disconnect => "DISCONNECT",
            Command::Error => "ERROR",
            Command::Ping => "PING",
            Command::Pong => "PONG",
            Command::Time => "TIME",
            Command::Chat => "CHAT",
            Command::Clients => "CLIENTS",
            Command::ClientsUpdate => "CLIENTS_UPDATE",
            Command::Games => "GAMES",
            Command::GamesUpdate => "GAMES_UPDATE",
            Command::GameOpen => "GAME_OPEN",
            Command::GameConnect => "GAME_CONNECT",
            Command::GameStart => "GAME_START",
            Command::GameDisconnect => "GAME_DISCONNECT",
            Command::Motd => "MOTD",
            Command::Announcement => "ANNOUNCEMENT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_owned()))
    }
}
