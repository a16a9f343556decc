//! A terminal lobby client.
//!
//! ```text
//! lobby [config.json] <nick>
//! ```
//!
//! Lines typed on stdin go to the lobby chat (`@name text` is private).
//! `/join NAME`, `/host NAME`, `/start` and `/leave` drive games; `/quit`
//! logs out.

use std::time::Duration;

use metaclient::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

const PUMP_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), MetaclientError> {
    metaclient::init_tracing();

    let mut args = std::env::args().skip(1);
    let (config, nick) = match (args.next(), args.next()) {
        (Some(path), Some(nick)) => (metaclient::load_config(path)?, nick),
        (Some(nick), None) => (SessionConfig::default(), nick),
        _ => {
            eprintln!("usage: lobby [config.json] <nick>");
            std::process::exit(2);
        }
    };

    let (host, port) = (config.host.clone(), config.port);
    let mut session = Session::new(config);
    if let Err(e) = session.login(&nick, "", false, &host, port).await {
        print_chat(&session, 0);
        return Err(e.into());
    }
    println!("logged in to {host}:{port} as {}", session.client_name());

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(PUMP_INTERVAL);
    let mut seen = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.pump().await;
                seen = print_chat(&session, seen);
                print_rosters(&mut session);
                if session.state() == SessionState::Offline {
                    eprintln!("disconnected from the metaserver");
                    break;
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line? else {
                    session.logout("CLIENT_LEFT").await;
                    break;
                };
                if !handle_input(&mut session, line.trim_end()).await {
                    break;
                }
            }
        }
    }

    print_chat(&session, seen);
    Ok(())
}

/// Acts on one line of user input. Returns `false` to quit.
async fn handle_input(session: &mut Session, line: &str) -> bool {
    let result = match line.split_once(' ').unwrap_or((line, "")) {
        ("", _) => Ok(()),
        ("/quit", _) => {
            session.logout("CLIENT_LEFT").await;
            return false;
        }
        ("/join", game) if !game.is_empty() => session.join_game(game).await,
        ("/host", game) if !game.is_empty() => session.open_game(game).await,
        ("/start", _) => session.announce_game_start().await,
        ("/leave", _) => session.leave_game().await,
        _ => session.send(line).await,
    };
    if let Err(e) = result {
        eprintln!("{e}");
    }
    true
}

/// Prints chat lines after the first `seen`. Returns the new count.
fn print_chat(session: &Session, seen: usize) -> usize {
    let log = session.chat();
    for message in log.since(seen) {
        match message.channel {
            ChatChannel::System => println!("* {}", message.body),
            ChatChannel::Private => {
                println!("[{} -> {}] {}", message.sender, message.recipient, message.body)
            }
            ChatChannel::Public => println!("<{}> {}", message.sender, message.body),
        }
    }
    log.len()
}

fn print_rosters(session: &mut Session) {
    if session.update_for_clients() {
        let names: Vec<&str> = session.clients().iter().map(|c| c.name.as_str()).collect();
        println!("-- online: {}", names.join(", "));
    }
    if session.update_for_games() {
        for game in session.games() {
            let status = if game.connectable { "open" } else { "unreachable" };
            println!("-- game: {} [{}] {status}", game.name, game.build_id);
        }
    }
}
