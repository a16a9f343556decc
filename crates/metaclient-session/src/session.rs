//! The metaserver session: one client's conversation with the lobby.
//!
//! A [`Session`] owns the socket, the protocol state, the rosters and the
//! chat transcript. It is driven from outside: the caller invokes the
//! explicit operations (`login`, `join_game`, `send`, ...) and calls
//! [`Session::pump`] regularly (every frame, or on a timer) to process
//! whatever the server sent in the meantime.
//!
//! # Recovery without recursion
//!
//! A broken connection is never repaired from deep inside packet handling.
//! The handlers only *raise a flag* (`relogin_requested`), and `pump`
//! performs the relogin at the top level once the current packets are
//! processed. Relogin itself only reads and dispatches while it waits for
//! its answer, so a second failure during recovery raises the flag again
//! instead of recursing.

use std::time::Instant;

use metaclient_protocol::{Command, Packet};
use metaclient_transport::{Connector, TcpConnector, TransportError};

use crate::chat::{ChatLog, ChatMessage};
use crate::connection::ConnectionHandle;
use crate::messages::describe;
use crate::reconnect::{BreakVerdict, ReconnectPolicy};
use crate::roster::{Client, Game, Roster};
use crate::{ClientRights, PendingCommand, SessionConfig, SessionError, SessionState};

/// Prefix of system chat lines that are mirrored into a running game.
pub const INGAME_PREFIX: &str = "METASERVER: ";

/// A client session with the metaserver.
///
/// Generic over the [`Connector`] so tests can swap the socket out. The
/// default is plain TCP.
pub struct Session<C: Connector = TcpConnector> {
    config: SessionConfig,
    connector: C,
    pub(crate) conn: Option<ConnectionHandle<C::Connection>>,

    pub(crate) state: SessionState,
    pub(crate) error: bool,

    // -- identity, kept so a relogin can present it again ---------------
    pub(crate) client_name: String,
    pub(crate) client_rights: ClientRights,
    password: String,
    register: bool,
    host: String,
    port: u16,

    // -- game -----------------------------------------------------------
    pub(crate) game_name: String,
    pub(crate) game_ip: Option<String>,
    pub(crate) pending: Option<PendingCommand>,

    // -- lobby ----------------------------------------------------------
    pub(crate) clients: Roster<Client>,
    pub(crate) games: Roster<Game>,
    pub(crate) refresh_clients: bool,
    pub(crate) refresh_games: bool,

    chat: ChatLog,
    ingame_chat: Vec<ChatMessage>,

    pub(crate) time_offset: i64,
    pub(crate) policy: ReconnectPolicy,
    pub(crate) relogin_requested: bool,
}

impl Session<TcpConnector> {
    /// Creates an offline session that connects over TCP.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Session<C> {
    /// Creates an offline session that opens connections through
    /// `connector`.
    pub fn with_connector(config: SessionConfig, connector: C) -> Self {
        let policy =
            ReconnectPolicy::new(config.ping_timeout, config.flood_window, Instant::now());
        Self {
            host: config.host.clone(),
            port: config.port,
            config,
            connector,
            conn: None,
            state: SessionState::Offline,
            error: false,
            client_name: String::new(),
            client_rights: ClientRights::default(),
            password: String::new(),
            register: false,
            game_name: String::new(),
            game_ip: None,
            pending: None,
            clients: Roster::default(),
            games: Roster::default(),
            refresh_clients: true,
            refresh_games: true,
            chat: ChatLog::default(),
            ingame_chat: Vec::new(),
            time_offset: 0,
            policy,
            relogin_requested: false,
        }
    }

    // -----------------------------------------------------------------------
    // Login / logout
    // -----------------------------------------------------------------------

    /// Connects to `host:port` and logs in as `nick`.
    ///
    /// Waits up to `reply_timeout` for the server's answer. On success the
    /// session is in the lobby and [`client_name`](Self::client_name) holds
    /// the name the server assigned, which may differ from `nick`.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] unless offline.
    /// - [`SessionError::Connection`] if the socket cannot be opened.
    /// - [`SessionError::ServerRejected`] if the server refuses the login.
    ///   The session is offline with the error flag set.
    /// - [`SessionError::Timeout`] if no answer arrives. The session
    ///   disconnects with `NO_ANSWER`.
    pub async fn login(
        &mut self,
        nick: &str,
        password: &str,
        register: bool,
        host: &str,
        port: u16,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Offline {
            return Err(SessionError::InvalidState {
                operation: "login",
                state: self.state,
            });
        }
        self.reset();
        self.password = password.to_owned();
        self.register = register;
        self.host = host.to_owned();
        self.port = port;

        self.open_connection().await?;

        let mut packet = Packet::new(Command::Login)
            .arg(self.config.protocol_version.to_string())
            .arg(nick)
            .arg(self.config.build_id.as_str())
            .arg(metaclient_protocol::encode_bool(register));
        if register {
            packet = packet.arg(password);
        }

        self.state = SessionState::Connecting;
        tracing::info!(nick, host, port, register, "logging in to metaserver");

        let result = self.submit_login(packet, Command::Login).await;
        match result {
            Ok(()) => {
                tracing::info!(
                    name = %self.client_name,
                    rights = %self.client_rights,
                    "logged in to metaserver"
                );
                Ok(())
            }
            Err(SessionError::Timeout { command }) => {
                self.logout("NO_ANSWER").await;
                Err(SessionError::Timeout { command })
            }
            Err(e @ SessionError::ServerRejected { .. }) => Err(e),
            Err(e) => {
                // Lost the socket or got garbage before the lobby.
                if self.state != SessionState::Offline {
                    self.close_connection().await;
                    self.reset();
                }
                self.set_error();
                Err(e)
            }
        }
    }

    /// Logs in again with the identity of the last successful login.
    ///
    /// Used after the connection broke. On success the session is back in
    /// the lobby with the error flag cleared, and a game request that was
    /// still waiting for its answer is sent again.
    ///
    /// # Errors
    /// - [`SessionError::InvalidState`] if there is no error to recover from
    ///   or no previous login.
    /// - Any error of [`login`](Self::login). The session is left offline
    ///   with the error flag set, but keeps its identity so the caller may
    ///   try again.
    pub async fn relogin(&mut self) -> Result<(), SessionError> {
        if !self.error || self.client_name.is_empty() {
            return Err(SessionError::InvalidState {
                operation: "relogin",
                state: self.state,
            });
        }
        self.relogin_requested = false;
        self.close_connection().await;

        if let Err(e) = self.open_connection().await {
            self.state = SessionState::Offline;
            return Err(e);
        }

        let mut packet = Packet::new(Command::Relogin)
            .arg(self.config.protocol_version.to_string())
            .arg(self.client_name.as_str())
            .arg(self.config.build_id.as_str())
            .arg(metaclient_protocol::encode_bool(self.register));
        if self.register {
            packet = packet.arg(self.password.as_str());
        }

        self.error = false;
        self.state = SessionState::Connecting;
        tracing::info!(name = %self.client_name, "logging in to metaserver again");

        if let Err(e) = self.submit_login(packet, Command::Relogin).await {
            tracing::warn!(error = %e, "relogin failed");
            self.close_connection().await;
            self.state = SessionState::Offline;
            self.relogin_requested = false;
            self.set_error();
            return Err(e);
        }

        self.refresh_clients = true;
        self.refresh_games = true;
        if self.error {
            // Broke again right after the answer; the next pump retries and
            // the request stays pending until then.
            return Ok(());
        }
        self.resubmit_pending().await
    }

    /// Sends `DISCONNECT reason`, closes the socket and resets the session.
    ///
    /// Safe to call in any state. The chat transcript survives.
    pub async fn logout(&mut self, reason: &str) {
        if let Some(handle) = self.conn.as_mut() {
            let packet = Packet::new(Command::Disconnect).arg(reason);
            if let Err(e) = handle.send(&packet).await {
                tracing::debug!(error = %e, "could not say goodbye to metaserver");
            }
            handle.close().await;
        }
        tracing::info!(reason, "logged out of metaserver");
        self.system_chat(describe(reason));
        self.reset();
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    /// Asks to join the game `name` and waits for its address.
    ///
    /// Returns as soon as the request is sent; [`ip`](Self::ip) becomes
    /// `Some` when the server answers.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless logged in.
    pub async fn join_game(&mut self, name: &str) -> Result<(), SessionError> {
        self.require_logged_in("join_game")?;
        self.game_name = name.to_owned();
        self.state = SessionState::InGame;
        self.arm_pending(Command::GameConnect);
        tracing::info!(game = name, "joining game");
        self.transmit(Packet::new(Command::GameConnect).arg(name)).await
    }

    /// Announces a newly hosted game called `name`.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless logged in.
    pub async fn open_game(&mut self, name: &str) -> Result<(), SessionError> {
        self.require_logged_in("open_game")?;
        self.game_name = name.to_owned();
        self.state = SessionState::InGame;
        self.arm_pending(Command::GameOpen);
        tracing::info!(game = name, "opening game");
        self.transmit(Packet::new(Command::GameOpen).arg(name).arg("1024"))
            .await
    }

    /// Tells the server the hosted game has started.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless logged in.
    pub async fn announce_game_start(&mut self) -> Result<(), SessionError> {
        self.require_logged_in("announce_game_start")?;
        self.state = SessionState::InGame;
        self.arm_pending(Command::GameStart);
        tracing::info!(game = %self.game_name, "starting game");
        self.transmit(Packet::new(Command::GameStart)).await
    }

    /// Leaves the current game and returns to the lobby.
    ///
    /// Allowed while a relogin is pending; without a live socket only the
    /// local state changes.
    ///
    /// # Errors
    /// [`SessionError::InvalidState`] unless logged in.
    pub async fn leave_game(&mut self) -> Result<(), SessionError> {
        if !self.state.is_logged_in() {
            return Err(SessionError::InvalidState {
                operation: "leave_game",
                state: self.state,
            });
        }
        tracing::info!(game = %self.game_name, "leaving game");
        self.game_ip = None;
        self.pending = None;
        self.state = SessionState::Lobby;
        if self.conn.is_none() {
            return Ok(());
        }
        self.transmit(Packet::new(Command::GameDisconnect)).await
    }

    // -----------------------------------------------------------------------
    // Chat
    // -----------------------------------------------------------------------

    /// Sends a chat line typed by the user.
    ///
    /// - `@name text` sends `text` privately to `name` and echoes it into
    ///   the local transcript.
    /// - For superusers, `/motd text` and `/announcement text` set the
    ///   message of the day or broadcast an announcement.
    /// - Anything else is a public message.
    ///
    /// Problems the user can fix (not connected, malformed private message)
    /// are reported through system chat, not as errors.
    ///
    /// # Errors
    /// [`SessionError::Protocol`] if the text cannot be encoded.
    pub async fn send(&mut self, text: &str) -> Result<(), SessionError> {
        if !self.state.is_logged_in() || self.error {
            self.system_chat(
                "Message could not be sent: You are not connected to the metaserver!",
            );
            return Ok(());
        }

        if let Some(rest) = text.strip_prefix('@') {
            return match rest.split_once(' ') {
                Some((recipient, body)) if !recipient.is_empty() && !body.is_empty() => {
                    self.transmit(Packet::new(Command::Chat).arg(body).arg(recipient))
                        .await?;
                    let echo = ChatMessage::user(self.client_name.as_str(), recipient, body);
                    self.push_chat(echo);
                    Ok(())
                }
                _ => {
                    self.system_chat(
                        "Message could not be sent: Was this supposed to be a private message?",
                    );
                    Ok(())
                }
            };
        }

        if self.client_rights == ClientRights::Superuser {
            let slash_command = text.strip_prefix('/').and_then(|c| c.split_once(' '));
            if let Some((command, argument)) = slash_command {
                let command = match command {
                    "motd" => Some(Command::Motd),
                    "announcement" => Some(Command::Announcement),
                    _ => None,
                };
                if let Some(command) = command {
                    tracing::info!(%command, "sending superuser command");
                    return self.transmit(Packet::new(command).arg(argument)).await;
                }
            }
        }

        self.transmit(Packet::new(Command::Chat).arg(text).arg("")).await
    }

    // -----------------------------------------------------------------------
    // Pump
    // -----------------------------------------------------------------------

    /// Processes everything the server sent since the last call.
    ///
    /// Also requests roster refreshes, checks the ping and reply deadlines,
    /// and performs a relogin if anything above decided the connection is
    /// dead. Never waits for the network except during that relogin.
    pub async fn pump(&mut self) {
        if self.conn.is_some() && !self.error && !self.relogin_requested {
            if let Err(e) = self.receive().await {
                tracing::debug!(error = %e, "metaserver communication interrupted");
            }

            if self.state == SessionState::Lobby && !self.error {
                self.request_rosters().await;
            }

            let now = Instant::now();
            if !self.error && self.pending.is_some_and(|p| p.is_overdue(now)) {
                if let Some(pending) = self.pending.as_mut() {
                    tracing::warn!(command = %pending.command, "metaserver did not answer in time");
                    // Parked until the relogin sends it again.
                    pending.deadline = None;
                }
                self.set_error();
                self.relogin_requested = true;
            }

            if !self.error && self.state.is_logged_in() && self.policy.ping_overdue(now) {
                tracing::warn!(
                    last_ping = ?now.saturating_duration_since(self.policy.last_ping_at()),
                    "metaserver stopped sending PING"
                );
                self.set_error();
                self.relogin_requested = true;
            }
        }

        if std::mem::take(&mut self.relogin_requested) {
            self.recover().await;
        }
    }

    /// Tries one relogin; if that fails the session goes offline for good.
    async fn recover(&mut self) {
        if !self.error {
            self.set_error();
        }
        match self.relogin().await {
            Ok(()) => tracing::info!("reconnected to metaserver"),
            Err(e) => {
                tracing::warn!(error = %e, "could not reconnect to metaserver, going offline");
                self.reset();
                self.set_error();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session is in error. Cleared by a successful relogin
    /// or a new login.
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// The name the server assigned at login. Empty until then.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_rights(&self) -> &ClientRights {
        &self.client_rights
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The game we are hosting or joining. Empty in the lobby.
    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    /// Address of the game host, once the server answered `GAME_CONNECT`.
    pub fn ip(&self) -> Option<&str> {
        self.game_ip.as_deref()
    }

    /// Server clock minus local clock, in seconds, from the last `TIME`.
    pub fn time_offset(&self) -> i64 {
        self.time_offset
    }

    /// When the server was last known to be alive.
    pub fn last_ping_at(&self) -> Instant {
        self.policy.last_ping_at()
    }

    /// The game request still waiting for an answer, if any.
    pub fn pending_command(&self) -> Option<Command> {
        self.pending.map(|p| p.command)
    }

    /// The clients in the lobby. Empty while the session is in error.
    pub fn clients(&self) -> &[Client] {
        if self.error { &[] } else { self.clients.entries() }
    }

    /// The open games. Empty while the session is in error.
    pub fn games(&self) -> &[Game] {
        if self.error { &[] } else { self.games.entries() }
    }

    /// `true` once after every change to [`clients`](Self::clients).
    pub fn update_for_clients(&mut self) -> bool {
        self.clients.take_dirty()
    }

    /// `true` once after every change to [`games`](Self::games).
    pub fn update_for_games(&mut self) -> bool {
        self.games.take_dirty()
    }

    /// The full chat transcript.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// System messages that arrived while in a game, prefixed for display
    /// in the game's own chat. Each message is returned once.
    pub fn take_ingame_system_chat(&mut self) -> Vec<ChatMessage> {
        std::mem::take(&mut self.ingame_chat)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Returns to the pristine offline state. Chat survives.
    pub(crate) fn reset(&mut self) {
        self.conn = None;
        self.state = SessionState::Offline;
        self.error = false;
        self.client_name.clear();
        self.client_rights = ClientRights::default();
        self.password.clear();
        self.register = false;
        self.host = self.config.host.clone();
        self.port = self.config.port;
        self.game_name.clear();
        self.game_ip = None;
        self.pending = None;
        self.clients.clear();
        self.games.clear();
        self.refresh_clients = true;
        self.refresh_games = true;
        self.time_offset = 0;
        self.policy.reset(Instant::now());
        self.relogin_requested = false;
    }

    /// Raises the error flag. The rosters turn empty, so they are flagged
    /// as changed.
    pub(crate) fn set_error(&mut self) {
        self.error = true;
        self.clients.mark_dirty();
        self.games.mark_dirty();
    }

    pub(crate) fn system_chat(&mut self, body: impl Into<String>) {
        self.push_chat(ChatMessage::system(body));
    }

    pub(crate) fn push_chat(&mut self, message: ChatMessage) {
        if message.is_system() && self.state == SessionState::InGame {
            let mut mirrored = message.clone();
            mirrored.body = format!("{INGAME_PREFIX}{}", message.body);
            self.ingame_chat.push(mirrored);
        }
        self.chat.push(message);
    }

    fn require_logged_in(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.state.is_logged_in() && !self.error {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn arm_pending(&mut self, command: Command) {
        self.pending = Some(PendingCommand {
            command,
            deadline: Some(Instant::now() + self.config.reply_timeout),
        });
    }

    /// Sends a game request again after a relogin.
    async fn resubmit_pending(&mut self) -> Result<(), SessionError> {
        let Some(pending) = self.pending else {
            return Ok(());
        };
        let game = self.game_name.clone();
        tracing::info!(command = %pending.command, game = %game, "resubmitting game request");
        match pending.command {
            Command::GameConnect => self.join_game(&game).await,
            Command::GameOpen => self.open_game(&game).await,
            Command::GameStart => self.announce_game_start().await,
            _ => {
                self.pending = None;
                Ok(())
            }
        }
    }

    async fn request_rosters(&mut self) {
        if std::mem::take(&mut self.refresh_clients) {
            if let Err(e) = self.transmit(Packet::new(Command::Clients)).await {
                tracing::debug!(error = %e, "could not request client list");
            }
        }
        if std::mem::take(&mut self.refresh_games) {
            if let Err(e) = self.transmit(Packet::new(Command::Games)).await {
                tracing::debug!(error = %e, "could not request game list");
            }
        }
    }

    /// Opens a fresh connection to the current host and port.
    async fn open_connection(&mut self) -> Result<(), SessionError> {
        tracing::debug!(host = %self.host, port = self.port, "connecting to metaserver");
        let connected = tokio::time::timeout(
            self.config.reply_timeout,
            self.connector.connect(&self.host, self.port),
        )
        .await;

        let conn = match connected {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "could not connect to metaserver");
                self.system_chat(format!(
                    "Could not establish a connection to the metaserver at {}:{}.",
                    self.host, self.port
                ));
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!("connecting to metaserver timed out");
                return Err(SessionError::Timeout {
                    command: "connect".to_string(),
                });
            }
        };

        let handle = ConnectionHandle::new(conn, self.config.max_frame_len);
        tracing::debug!(connection = %handle.id(), "connected to metaserver");
        self.conn = Some(handle);
        self.policy.record_ping(Instant::now());
        Ok(())
    }

    async fn close_connection(&mut self) {
        if let Some(mut handle) = self.conn.take() {
            handle.close().await;
        }
    }

    /// Sends `packet` and waits until the session leaves `Connecting`.
    async fn submit_login(&mut self, packet: Packet, command: Command) -> Result<(), SessionError> {
        let Some(handle) = self.conn.as_mut() else {
            return Err(TransportError::ConnectionClosed("not connected".into()).into());
        };
        handle.send(&packet).await?;

        let deadline = tokio::time::Instant::now() + self.config.reply_timeout;
        loop {
            let received = self.receive().await;
            match self.state {
                // The answer arrived. A break right after it is left to pump.
                SessionState::Lobby | SessionState::InGame => return Ok(()),
                SessionState::Offline => {
                    received?;
                    return Err(TransportError::ConnectionClosed(
                        "logged out while waiting for login".into(),
                    )
                    .into());
                }
                SessionState::Connecting => {
                    // Still no answer, so a broken socket fails this attempt
                    // instead of scheduling another one.
                    self.relogin_requested = false;
                    received?;
                }
            }

            let Some(handle) = self.conn.as_ref() else {
                return Err(TransportError::ConnectionClosed("not connected".into()).into());
            };
            let waited = tokio::time::timeout_at(deadline, handle.readable()).await;
            match waited {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.connection_broken();
                    self.relogin_requested = false;
                    return Err(e.into());
                }
                Err(_) => {
                    tracing::warn!(%command, "metaserver did not answer login");
                    return Err(SessionError::Timeout {
                        command: command.to_string(),
                    });
                }
            }
        }
    }

    /// Reads what the socket has and dispatches every complete packet.
    ///
    /// # Errors
    /// The socket broke or the stream was garbage. Either way the session
    /// has already reacted (error flag, system chat, relogin scheduled or
    /// logout) before this returns.
    pub(crate) async fn receive(&mut self) -> Result<(), SessionError> {
        let Some(handle) = self.conn.as_mut() else {
            return Ok(());
        };
        if let Err(e) = handle.poll_read() {
            self.connection_broken();
            return Err(e.into());
        }

        loop {
            let Some(handle) = self.conn.as_mut() else {
                return Ok(());
            };
            match handle.next_packet() {
                Ok(Some(packet)) => self.handle_packet(packet).await?,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "metaserver sent a malformed packet");
                    self.logout("PROTOCOL_ERROR").await;
                    self.set_error();
                    self.system_chat(format!("Something went wrong: {e}"));
                    return Err(e.into());
                }
            }
        }

        if self.conn.as_ref().is_some_and(ConnectionHandle::is_closed_and_drained) {
            self.connection_broken();
            let closed = "metaserver closed the connection".to_string();
            return Err(TransportError::ConnectionClosed(closed).into());
        }
        Ok(())
    }

    /// Sends a packet on the live connection.
    ///
    /// A socket failure is not the caller's problem: it is reported through
    /// system chat and repaired by the next [`pump`](Self::pump).
    pub(crate) async fn transmit(&mut self, packet: Packet) -> Result<(), SessionError> {
        let Some(handle) = self.conn.as_mut() else {
            return Err(TransportError::ConnectionClosed("not connected".into()).into());
        };
        match handle.send(&packet).await {
            Ok(()) => Ok(()),
            Err(SessionError::Connection(e)) => {
                tracing::warn!(
                    error = %e,
                    command = packet.command_name().unwrap_or_default(),
                    "sending to metaserver failed"
                );
                self.connection_broken();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The socket is gone. Decide whether to relogin or give up.
    fn connection_broken(&mut self) {
        if let Some(handle) = self.conn.take() {
            tracing::warn!(connection = %handle.id(), "lost connection to metaserver");
        }
        self.set_error();
        self.system_chat(describe("CONNECTION_LOST"));

        match self.policy.record_break(Instant::now()) {
            BreakVerdict::Reconnect => self.relogin_requested = true,
            BreakVerdict::GiveUp => {
                self.system_chat(
                    "The connection keeps breaking. Staying offline; please log in again later.",
                );
                self.reset();
                self.set_error();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_offline_and_clean() {
        let session = Session::new(SessionConfig::default());

        assert_eq!(session.state(), SessionState::Offline);
        assert!(!session.has_error());
        assert!(session.client_name().is_empty());
        assert_eq!(session.ip(), None);
        assert!(session.chat().is_empty());
    }

    #[test]
    fn test_set_error_flags_both_rosters() {
        let mut session = Session::new(SessionConfig::default());

        session.set_error();

        assert!(session.update_for_clients());
        assert!(session.update_for_games());
        assert!(session.clients().is_empty());
    }

    #[test]
    fn test_system_chat_in_game_is_mirrored_with_prefix() {
        let mut session = Session::new(SessionConfig::default());
        session.system_chat("lobby only");
        session.state = SessionState::InGame;
        session.system_chat("server restarting");
        session.push_chat(ChatMessage::user("bob", "", "hi"));

        let mirrored = session.take_ingame_system_chat();

        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].body, "METASERVER: server restarting");
        assert_eq!(session.chat().len(), 3);
    }

    #[tokio::test]
    async fn test_leave_game_while_error_flag_set_returns_to_lobby() {
        let mut session = Session::new(SessionConfig::default());
        session.state = SessionState::InGame;
        session.game_ip = Some("10.0.0.7".into());
        session.set_error();

        session.leave_game().await.unwrap();

        assert_eq!(session.state(), SessionState::Lobby);
        assert_eq!(session.ip(), None);
        assert!(session.pending_command().is_none());
    }

    #[tokio::test]
    async fn test_leave_game_while_offline_is_invalid_state() {
        let mut session = Session::new(SessionConfig::default());

        let result = session.leave_game().await;

        assert!(matches!(result, Err(SessionError::InvalidState { .. })));
    }

    #[test]
    fn test_reset_keeps_chat_and_clears_identity() {
        let mut session = Session::new(SessionConfig::default());
        session.client_name = "Alice".into();
        session.state = SessionState::Lobby;
        session.system_chat("hello");
        session.set_error();

        session.reset();

        assert_eq!(session.state(), SessionState::Offline);
        assert!(!session.has_error());
        assert!(session.client_name().is_empty());
        assert_eq!(session.chat().len(), 1);
    }
}
