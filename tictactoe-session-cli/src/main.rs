use clap::{Parser, Subcommand};
use std::time::Duration;
use tictactoe_session_cli::presentation::HELP;
use tictactoe_session_cli::{
    parse_input, render_board, render_event, render_history, CliError, Input, LogConfig, Result,
};
use tictactoe_session_core::GameMessage;
use tictactoe_session_p2p::{GameSession, IceServer, MatchboxChannel, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tictactoe-cli")]
#[command(version, about = "Peer-to-peer tic-tac-toe over a Matchbox room")]
struct Cli {
    /// Verbose logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level (error, warn, info, debug, trace); overrides -v
    #[arg(long, global = true)]
    log_level: Option<tracing::Level>,

    /// Disable log output entirely
    #[arg(long, global = true, conflicts_with = "log_level")]
    no_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a room and play from the terminal
    Play {
        /// Matchbox signalling server URL
        #[arg(short = 's', long, default_value = "ws://localhost:3536")]
        server: String,

        /// Room to join; both players must use the same name
        #[arg(short = 'r', long, default_value = "tictactoe")]
        room: String,

        /// TURN server URL (optional, format: turn:host:port)
        #[arg(long)]
        turn_server: Option<String>,

        /// TURN username (required if turn-server is set)
        #[arg(long)]
        turn_username: Option<String>,

        /// TURN credential (required if turn-server is set)
        #[arg(long)]
        turn_credential: Option<String>,

        /// How often to poll the channel
        #[arg(long, default_value_t = 50)]
        poll_interval_ms: u64,

        /// How long to wait for peers already in the room before joining the game
        #[arg(long, default_value_t = 1500)]
        settle_ms: u64,
    },

    /// Print the JSON schema of the wire messages
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = match cli.verbose {
        0 => LogConfig::quiet(),
        1 => LogConfig::default(),
        _ => LogConfig::dev(),
    };
    if let Some(level) = cli.log_level {
        log_config = log_config.with_level(level);
    }
    if cli.no_logs {
        log_config = log_config.without_logs();
    }
    log_config.init()?;

    match cli.command {
        Commands::Play {
            server,
            room,
            turn_server,
            turn_username,
            turn_credential,
            poll_interval_ms,
            settle_ms,
        } => {
            let config = build_config(server, room, turn_server, turn_username, turn_credential)?
                .with_poll_interval(poll_interval_ms)
                .with_peer_settle(Duration::from_millis(settle_ms));
            play(config).await?;
        }
        Commands::Schema => {
            let schema = GameMessage::json_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn build_config(
    server: String,
    room: String,
    turn_server: Option<String>,
    turn_username: Option<String>,
    turn_credential: Option<String>,
) -> Result<SessionConfig> {
    let mut config = SessionConfig::new(server).with_room(room);

    if let Some(turn_url) = turn_server {
        match (turn_username, turn_credential) {
            (Some(username), Some(credential)) => {
                info!("Using TURN server: {}", turn_url);
                config = config.with_ice_server(IceServer::turn(turn_url, username, credential));
            }
            _ => {
                return Err(CliError::InvalidConfig(
                    "TURN server requires both username and credential".to_string(),
                ));
            }
        }
    }

    Ok(config)
}

async fn play(config: SessionConfig) -> Result<()> {
    println!("Joining room '{}' at {}", config.room, config.signalling_server);

    let channel = MatchboxChannel::connect(&config).await?;
    let mut session = GameSession::new(channel)?;
    println!("Connected as {}", session.local_id());
    println!("{}", HELP);
    print_events(&mut session);

    let mut interval = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if session.poll() > 0 {
                    print_events(&mut session);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if !handle_input(&mut session, &line) {
                    break;
                }
                print_events(&mut session);
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    println!("Leaving...");
    session.leave();
    // Give the socket a moment to tell the others
    tokio::time::sleep(Duration::from_millis(200)).await;

    Ok(())
}

/// Returns `false` when the player wants to quit
fn handle_input(session: &mut GameSession<MatchboxChannel>, line: &str) -> bool {
    let input = match parse_input(line) {
        Ok(input) => input,
        Err(e) => {
            println!("{}", e);
            return true;
        }
    };

    let result = match input {
        Input::Play(cell) => session.play(cell).map(|_| ()),
        Input::Rematch => session.request_rematch(),
        Input::Say(text) => session.say(text),
        Input::ShowBoard => {
            print!("{}", render_board(session.game().board()));
            println!("{}", render_history(session.game().history()));
            Ok(())
        }
        Input::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Input::Quit => return false,
    };

    if let Err(e) = result {
        warn!("Action failed: {}", e);
        println!("{}", e);
    }
    true
}

fn print_events(session: &mut GameSession<MatchboxChannel>) {
    let local = session.local_id().clone();
    let local_mark = session.session().local_mark();

    for event in session.drain_events() {
        if let Some(text) = render_event(&event, &local, local_mark) {
            if text.ends_with('\n') {
                print!("{}", text);
            } else {
                println!("{}", text);
            }
        }
    }
}
