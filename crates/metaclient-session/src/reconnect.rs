//! When to give up on a connection, and when to give up on reconnecting.
//!
//! [`ReconnectPolicy`] is pure bookkeeping: it never touches a socket and
//! takes the current time as an argument, so every decision can be tested
//! with hand-picked instants. The [`Session`](crate::Session) feeds it
//! events and acts on its answers.
//!
//! Two questions are answered here:
//!
//! - **Is the server still there?** The metaserver sends `PING`
//!   periodically. If none arrived within the ping window the connection
//!   is considered dead even though the socket looks fine.
//! - **Should a broken socket be retried?** Normally yes, once. But if the
//!   socket already broke twice within the flood window, the server (or
//!   the network) is in a bad way and reconnecting in a tight loop would
//!   only make it worse.

use std::time::{Duration, Instant};

/// What to do about a socket that just broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakVerdict {
    /// Try one relogin.
    Reconnect,
    /// Too many breaks too quickly: go offline and stay there.
    GiveUp,
}

/// Ping watchdog and broken-socket flood protection.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    ping_timeout: Duration,
    flood_window: Duration,
    last_ping_at: Instant,
    /// The two most recent breaks, newest first.
    broken: [Option<Instant>; 2],
}

impl ReconnectPolicy {
    /// Creates a policy whose ping clock starts at `now`.
    pub fn new(ping_timeout: Duration, flood_window: Duration, now: Instant) -> Self {
        Self {
            ping_timeout,
            flood_window,
            last_ping_at: now,
            broken: [None, None],
        }
    }

    /// Records a `PING` (or anything else that proves the server is alive,
    /// such as a freshly opened connection).
    pub fn record_ping(&mut self, now: Instant) {
        self.last_ping_at = now;
    }

    /// When the server was last known to be alive.
    pub fn last_ping_at(&self) -> Instant {
        self.last_ping_at
    }

    /// `true` if the server has been silent for longer than the ping window.
    pub fn ping_overdue(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_ping_at) > self.ping_timeout
    }

    /// Records a broken socket at `now` and decides whether to reconnect.
    ///
    /// Gives up when both previously recorded breaks lie within the flood
    /// window of `now`. A give-up is not recorded: the session goes offline
    /// and [`reset`](Self::reset) clears the history anyway.
    pub fn record_break(&mut self, now: Instant) -> BreakVerdict {
        let recent = |at: Option<Instant>| {
            at.is_some_and(|t| now.saturating_duration_since(t) < self.flood_window)
        };
        if recent(self.broken[0]) && recent(self.broken[1]) {
            tracing::warn!(
                window = ?self.flood_window,
                "metaserver connection keeps breaking, giving up"
            );
            return BreakVerdict::GiveUp;
        }
        self.broken = [Some(now), self.broken[0]];
        BreakVerdict::Reconnect
    }

    /// Forgets break history and restarts the ping clock.
    pub fn reset(&mut self, now: Instant) {
        self.broken = [None, None];
        self.last_ping_at = now;
    }
}
