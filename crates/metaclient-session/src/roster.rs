//! Lobby rosters: the list of connected clients and the list of open games.
//!
//! The server never sends deltas. Every `CLIENTS`/`GAMES` packet carries the
//! complete list, and we work out who joined and who left by comparing the
//! new snapshot with the previous one.

use std::collections::HashSet;

use metaclient_protocol::{FieldReader, ProtocolError};

use crate::ClientRights;

/// Anything that lives in a roster and is identified by name.
pub trait RosterEntry {
    /// The unique key within one snapshot.
    fn name(&self) -> &str;
}

/// A client connected to the metaserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub name: String,
    pub build_id: String,
    /// The game this client is in, if any.
    pub game: Option<String>,
    pub rights: ClientRights,
    /// Score as reported by the server. Kept as text; the server does not
    /// promise a numeric format.
    pub points: String,
}

impl RosterEntry for Client {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A game announced on the metaserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub name: String,
    pub build_id: String,
    /// Whether the host can be reached by other players.
    pub connectable: bool,
}

impl RosterEntry for Game {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Reads the body of a `CLIENTS` packet (everything after the command).
pub(crate) fn read_clients(r: &mut FieldReader<'_>) -> Result<Vec<Client>, ProtocolError> {
    let count: usize = r.number("client count")?;
    (0..count)
        .map(|_| -> Result<Client, ProtocolError> {
            let name = r.string("client name")?.to_owned();
            let build_id = r.string("client build id")?.to_owned();
            let game = r.string("client game")?;
            let rights = ClientRights::from_wire(r.string("client type")?);
            let points = r.string("client points")?.to_owned();
            Ok(Client {
                name,
                build_id,
                game: (!game.is_empty()).then(|| game.to_owned()),
                rights,
                points,
            })
        })
        .collect()
}

/// Reads the body of a `GAMES` packet (everything after the command).
pub(crate) fn read_games(r: &mut FieldReader<'_>) -> Result<Vec<Game>, ProtocolError> {
    let count: usize = r.number("game count")?;
    (0..count)
        .map(|_| -> Result<Game, ProtocolError> {
            Ok(Game {
                name: r.string("game name")?.to_owned(),
                build_id: r.string("game build id")?.to_owned(),
                connectable: r.bool("game connectable")?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diffing
// ---------------------------------------------------------------------------

/// Names that appeared and disappeared between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    /// In the new snapshot but not the old one, in new-snapshot order.
    pub joined: Vec<String>,
    /// In the old snapshot but not the new one, in old-snapshot order.
    pub left: Vec<String>,
}

impl RosterDiff {
    /// `true` if nothing changed by name.
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }
}

/// Compares two snapshots by name.
///
/// Two passes of set difference over immutable inputs:
/// `new − old` is who joined, `old − new` is who left.
pub fn diff_by_name<T: RosterEntry>(old: &[T], new: &[T]) -> RosterDiff {
    let old_names: HashSet<&str> = old.iter().map(RosterEntry::name).collect();
    let new_names: HashSet<&str> = new.iter().map(RosterEntry::name).collect();

    RosterDiff {
        joined: new
            .iter()
            .map(RosterEntry::name)
            .filter(|name| !old_names.contains(name))
            .map(str::to_owned)
            .collect(),
        left: old
            .iter()
            .map(RosterEntry::name)
            .filter(|name| !new_names.contains(name))
            .map(str::to_owned)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The committed snapshot of one roster plus its change flag.
#[derive(Debug, Clone)]
pub struct Roster<T> {
    entries: Vec<T>,
    /// Whether a snapshot was received since the last reset.
    initialized: bool,
    /// Set on every change, cleared by [`Roster::take_dirty`].
    dirty: bool,
}

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            initialized: false,
            dirty: false,
        }
    }
}

impl<T: RosterEntry> Roster<T> {
    /// Commits a new snapshot and returns what changed.
    ///
    /// The first snapshot after a reset is never diffed: entering the lobby
    /// would otherwise announce every client as "joined".
    pub fn replace(&mut self, snapshot: Vec<T>) -> RosterDiff {
        let diff = if self.initialized {
            diff_by_name(&self.entries, &snapshot)
        } else {
            RosterDiff::default()
        };
        self.entries = snapshot;
        self.initialized = true;
        self.dirty = true;
        diff
    }
}

impl<T> Roster<T> {
    /// The last committed snapshot.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Returns whether the roster changed since the last call, and clears
    /// the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Flags the roster as changed without touching its contents.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Forgets everything, including that a snapshot was ever received.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
