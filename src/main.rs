use std::io::BufRead;
use std::path::PathBuf;

use broadside::{
    init_logging, Connection, ConsoleUi, Event, FileStats, Game, GameNode, Notice, ShipClass,
    UiEvent, UiSink, DEFAULT_PORT, GRID_SIZE,
};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Host a game and wait for an opponent to connect.
    Host {
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, help = "Fix RNG seed for a reproducible coin flip")]
        seed: Option<u64>,
        #[arg(long, default_value = "broadside_stats.bin")]
        stats: PathBuf,
    },
    /// Join a game hosted by an opponent.
    Join {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, help = "Fix RNG seed for a reproducible coin flip")]
        seed: Option<u64>,
        #[arg(long, default_value = "broadside_stats.bin")]
        stats: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let (name, seed, stats_path, initiator, connected) = match cli.command {
        Commands::Host {
            port,
            name,
            seed,
            stats,
        } => {
            println!("Hosting on port {port}. Waiting for opponent...");
            let conn = Connection::host(port, events_tx.clone()).await;
            (name, seed, stats, true, conn)
        }
        Commands::Join {
            host,
            port,
            name,
            seed,
            stats,
        } => {
            println!("Connecting to {host}:{port}...");
            let conn = Connection::join(&host, port, events_tx.clone()).await;
            (name, seed, stats, false, conn)
        }
    };

    let conn = match connected {
        Ok(conn) => conn,
        Err(e) => {
            // No retry policy in this layer; the game simply does not start.
            ConsoleUi.notify(Notice::Status(format!("Connection failed! {e}")));
            return Ok(());
        }
    };

    let rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_rng(&mut rand::rng()),
    };

    spawn_input_reader(events_tx);
    print_help();

    let mut node = GameNode::new(
        Game::new(name, initiator),
        conn,
        Box::new(ConsoleUi),
        Box::new(FileStats::open(stats_path)),
        rng,
        events_rx,
    );
    node.run().await
}

/// Read commands from stdin on a blocking task and feed them into the
/// node's event channel.
fn spawn_input_reader(events: mpsc::UnboundedSender<Event>) {
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(line.trim()) {
                Some(event) => {
                    if events.send(Event::Ui(event)).is_err() {
                        break;
                    }
                }
                None => print_help(),
            }
        }
    });
}

fn parse_command(line: &str) -> Option<UiEvent> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    match command {
        "ship" => {
            let class = match words.next()? {
                "small" => ShipClass::Small,
                "medium" => ShipClass::Medium,
                "large" => ShipClass::Large,
                _ => return None,
            };
            Some(UiEvent::SelectShip(class))
        }
        "place" => {
            let (row, col) = parse_cell(words.next()?)?;
            Some(UiEvent::PlaceCell { row, col })
        }
        "fire" => {
            let (row, col) = parse_cell(words.next()?)?;
            Some(UiEvent::AttackCell { row, col })
        }
        "ready" => Some(UiEvent::ToggleReady),
        "clear" => Some(UiEvent::ClearCurrent),
        "clearall" => Some(UiEvent::ClearAll),
        "rematch" => Some(UiEvent::Rematch),
        "say" => {
            let text = line.strip_prefix("say")?.trim();
            (!text.is_empty()).then(|| UiEvent::Chat(text.to_string()))
        }
        "board" => Some(UiEvent::ShowBoards),
        "top" => Some(UiEvent::ShowLeaderboard),
        _ => None,
    }
}

/// Cells are addressed column-letter first: `a1` is the top-left corner.
fn parse_cell(token: &str) -> Option<(u8, u8)> {
    let mut chars = token.chars();
    let col_char = chars.next()?.to_ascii_lowercase();
    let col = (col_char as u8).checked_sub(b'a')?;
    let row: u8 = chars.as_str().parse::<u8>().ok()?.checked_sub(1)?;
    (row < GRID_SIZE && col < GRID_SIZE).then_some((row, col))
}

fn print_help() {
    println!(
        "commands: ship <small|medium|large> | place <a1..h8> | fire <a1..h8> | \
         ready | clear | clearall | rematch | say <text> | board | top"
    );
}
