//! What the session does with each packet the server sends.

use std::time::Instant;

use metaclient_protocol::{Command, FieldReader, Packet, ProtocolError};
use metaclient_transport::Connector;

use crate::chat::{ChatChannel, ChatMessage, unix_now};
use crate::messages::{describe, describe_with};
use crate::roster::{read_clients, read_games};
use crate::{Session, SessionError, SessionState};

impl<C: Connector> Session<C> {
    /// Handles one incoming packet.
    ///
    /// Malformed packets are fatal while connecting (the server probably
    /// speaks another protocol version) and merely reported once logged
    /// in.
    ///
    /// # Errors
    /// [`SessionError::ServerRejected`] when the server refuses a login,
    /// or [`SessionError::Protocol`] for a bad packet while connecting.
    pub(crate) async fn handle_packet(&mut self, packet: Packet) -> Result<(), SessionError> {
        let mut r = packet.reader();
        let Some(name) = r.optional() else {
            tracing::warn!("ignoring empty packet from metaserver");
            return Ok(());
        };
        let command = name.parse::<Command>().ok();
        tracing::trace!(command = name, fields = r.remaining(), "received from metaserver");

        // DISCONNECT is honored in every state.
        if command == Some(Command::Disconnect) {
            let reason = r.optional().unwrap_or_default();
            tracing::info!(reason, "metaserver disconnected us");
            self.system_chat(describe(reason));
            if reason == "CLIENT_TIMEOUT" {
                self.set_error();
                self.relogin_requested = true;
            }
            return Ok(());
        }

        if self.state == SessionState::Connecting {
            let result = self.handle_connecting(command, name, &mut r).await;
            if let Err(SessionError::Protocol(e)) = &result {
                tracing::warn!(error = %e, "login conversation failed");
                let text = format!("Something went wrong: {e}");
                self.logout("PROTOCOL_ERROR").await;
                self.set_error();
                self.system_chat(text);
            }
            return result;
        }

        match self.handle_logged_in(command, name, &mut r).await {
            Err(SessionError::Protocol(e)) => {
                tracing::warn!(error = %e, command = name, "ignoring bad packet from metaserver");
                self.system_chat(format!("Received a bad {name} packet from the metaserver: {e}"));
                Ok(())
            }
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Connecting
    // -----------------------------------------------------------------------

    async fn handle_connecting(
        &mut self,
        command: Option<Command>,
        name: &str,
        r: &mut FieldReader<'_>,
    ) -> Result<(), SessionError> {
        match command {
            Some(Command::Login) => {
                let client_name = r.string("client name")?.to_owned();
                let rights = r.string("client rights")?;
                self.client_rights = crate::ClientRights::from_wire(rights);
                self.client_name = client_name;
                self.state = SessionState::Lobby;
                Ok(())
            }
            Some(Command::Relogin) => {
                self.state = SessionState::Lobby;
                self.system_chat("Successfully reconnected to the metaserver!");
                Ok(())
            }
            Some(Command::Error) => {
                let failed = r.string("failed command")?;
                let reason = r.optional().unwrap_or_default();
                if failed != "LOGIN" && failed != "RELOGIN" {
                    return Err(ProtocolError::UnexpectedCommand {
                        command: format!("ERROR {failed}"),
                        state: SessionState::Connecting.to_string(),
                    }
                    .into());
                }
                tracing::warn!(command = failed, reason, "metaserver rejected login");
                let rejected = SessionError::ServerRejected {
                    command: failed.to_owned(),
                    reason: reason.to_owned(),
                };
                self.logout(reason).await;
                self.set_error();
                Err(rejected)
            }
            _ => Err(ProtocolError::UnexpectedCommand {
                command: name.to_owned(),
                state: SessionState::Connecting.to_string(),
            }
            .into()),
        }
    }

    // -----------------------------------------------------------------------
    // Lobby and game
    // -----------------------------------------------------------------------

    async fn handle_logged_in(
        &mut self,
        command: Option<Command>,
        name: &str,
        r: &mut FieldReader<'_>,
    ) -> Result<(), SessionError> {
        match command {
            Some(Command::Login | Command::Relogin) => {
                self.system_chat(format!(
                    "WARNING: Received a {name} command although we are not in CONNECTING state."
                ));
            }

            Some(Command::Time) => {
                let server_time: i64 = r.number("server time")?;
                let local = i64::try_from(unix_now()).unwrap_or(i64::MAX);
                self.time_offset = server_time.saturating_sub(local);
                tracing::debug!(offset = self.time_offset, "metaserver clock offset");
                self.system_chat(format!(
                    "Server time offset is {} second(s).",
                    self.time_offset
                ));
            }

            Some(Command::Ping) => {
                self.policy.record_ping(Instant::now());
                self.transmit(Packet::new(Command::Pong)).await?;
            }

            Some(Command::Chat) => {
                let sender = r.string("chat sender")?;
                let body = r.string("chat message")?;
                let channel = ChatChannel::from_wire(r.string("chat type")?)?;
                let message = match channel {
                    ChatChannel::System => {
                        let mut message = ChatMessage::system(body);
                        message.sender = sender.to_owned();
                        message
                    }
                    ChatChannel::Private => {
                        ChatMessage::user(sender, self.client_name.as_str(), body)
                    }
                    ChatChannel::Public => ChatMessage::user(sender, "", body),
                };
                self.push_chat(message);
            }

            Some(Command::ClientsUpdate) => self.refresh_clients = true,
            Some(Command::GamesUpdate) => self.refresh_games = true,

            Some(Command::Clients) => {
                let snapshot = read_clients(r)?;
                tracing::debug!(count = snapshot.len(), "client list received");
                let diff = self.clients.replace(snapshot);
                for joined in diff.joined {
                    self.system_chat(format!("{joined} joined the lobby"));
                }
                for left in diff.left {
                    self.system_chat(format!("{left} left the lobby"));
                }
            }

            Some(Command::Games) => {
                let snapshot = read_games(r)?;
                tracing::debug!(count = snapshot.len(), "game list received");
                let diff = self.games.replace(snapshot);
                for opened in diff.joined {
                    self.system_chat(format!("The game {opened} is now available"));
                }
                for closed in diff.left {
                    self.system_chat(format!("The game {closed} has been closed"));
                }
            }

            Some(Command::GameOpen) => self.acknowledge(Command::GameOpen),
            Some(Command::GameStart) => self.acknowledge(Command::GameStart),
            Some(Command::GameConnect) => {
                let address = r.string("game address")?;
                self.acknowledge(Command::GameConnect);
                tracing::info!(game = %self.game_name, address, "game host address received");
                self.game_ip = Some(address.to_owned());
            }

            Some(Command::Error) => self.handle_error(r)?,

            _ => {
                tracing::warn!(command = name, "unknown command from metaserver");
                self.system_chat(format!(
                    "Received an unknown command from the metaserver: {name}"
                ));
            }
        }
        Ok(())
    }

    /// Clears the pending request if the server just answered it.
    fn acknowledge(&mut self, command: Command) {
        match self.pending {
            Some(pending) if pending.command == command => self.pending = None,
            _ => tracing::warn!(%command, "unexpected acknowledgment from metaserver"),
        }
    }

    /// `ERROR <command> <reason> [detail]` while logged in.
    fn handle_error(&mut self, r: &mut FieldReader<'_>) -> Result<(), ProtocolError> {
        let failed = r.string("failed command")?;
        let reason = r.string("reason")?;
        tracing::warn!(command = failed, reason, "metaserver reported an error");

        let text = if failed == Command::Chat.as_str() {
            if reason == "NO_SUCH_USER" {
                let who = r.optional().unwrap_or_default();
                format!(
                    "Chat message could not be sent. {}",
                    describe_with(reason, who)
                )
            } else {
                "Chat message could not be sent.".to_string()
            }
        } else if self.pending.is_some_and(|p| p.command.as_str() == failed) {
            self.pending = None;
            let description = describe(reason);
            if description == reason {
                reason.to_string()
            } else {
                format!("{description} ({reason})")
            }
        } else {
            format!("{failed}: {}", describe(reason))
        };

        self.system_chat(format!("ERROR: {text}"));
        Ok(())
    }
}
