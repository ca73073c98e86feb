//! Presentation seam: the notification set a renderer consumes and the input
//! events it produces. Any frontend (console here, a GUI elsewhere)
//! implements [`UiSink`] and feeds [`UiEvent`]s into the node's event
//! channel.

use crate::config::GRID_SIZE;
use crate::grid::{Cell, Grid};
use crate::ship::ShipClass;
use crate::stats::{LeaderboardRow, MatchRecord};

/// Which of the two boards a cell notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSide {
    Mine,
    Theirs,
}

/// Notifications pushed from the state machine to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// One-line status text.
    Status(String),
    /// A single cell changed state.
    CellChanged {
        side: BoardSide,
        row: u8,
        col: u8,
        state: Cell,
    },
    /// Ships still to place, per class.
    ShipQuota { small: u8, medium: u8, large: u8 },
    /// Turn indicator: is it the local player's turn.
    TurnChanged(bool),
    /// Seconds left on the turn countdown.
    Countdown(u32),
    /// Ready-button state.
    ReadyState(bool),
    /// Opponent announced its display name.
    OpponentName(String),
    /// Incoming chat line.
    Chat(String),
    /// Match concluded; renderer shows the outcome modal with a
    /// play-again decision.
    GameOver { won: bool },
    /// Both boards were wiped for a rematch.
    BoardsCleared,
    /// Snapshot of both boards, answering an explicit render request.
    Boards { mine: Grid, theirs: Grid },
    /// Leaderboard rows, best first.
    Leaderboard(Vec<LeaderboardRow>),
    /// Recent match history, newest first.
    History(Vec<MatchRecord>),
}

/// Input events a frontend delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectShip(ShipClass),
    PlaceCell { row: u8, col: u8 },
    AttackCell { row: u8, col: u8 },
    ToggleReady,
    ClearCurrent,
    ClearAll,
    /// Play-again decision after a concluded match.
    Rematch,
    Chat(String),
    ShowBoards,
    ShowLeaderboard,
}

/// Sink for presentation notifications. Implementations must not block the
/// caller for long; they run on the node's event loop.
pub trait UiSink: Send {
    fn notify(&mut self, notice: Notice);
}

/// Sink that discards everything. Used by tests.
pub struct NullUi;

impl UiSink for NullUi {
    fn notify(&mut self, _notice: Notice) {}
}

/// Line-oriented console renderer for the binary.
pub struct ConsoleUi;

impl ConsoleUi {
    fn print_boards(mine: &Grid, theirs: &Grid) {
        println!("\n  Your fleet            Opponent");
        print!("  ");
        for c in 0..GRID_SIZE {
            print!("{} ", (b'a' + c) as char);
        }
        print!("      ");
        for c in 0..GRID_SIZE {
            print!("{} ", (b'a' + c) as char);
        }
        println!();
        for r in 0..GRID_SIZE {
            print!("{} ", r + 1);
            for c in 0..GRID_SIZE {
                print!("{} ", cell_char(mine.get(r, c).unwrap_or(Cell::Empty)));
            }
            print!("    {} ", r + 1);
            for c in 0..GRID_SIZE {
                print!("{} ", cell_char(theirs.get(r, c).unwrap_or(Cell::Empty)));
            }
            println!();
        }
        println!();
    }
}

fn cell_char(cell: Cell) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::Ship => '#',
        Cell::Hit => 'X',
        Cell::Miss => 'o',
    }
}

impl UiSink for ConsoleUi {
    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Status(text) => println!("* {text}"),
            Notice::CellChanged { .. } => {}
            Notice::ShipQuota {
                small,
                medium,
                large,
            } => {
                println!("* Ships left to place: {small} small, {medium} medium, {large} large")
            }
            Notice::TurnChanged(mine) => {
                if mine {
                    println!("* Your turn");
                } else {
                    println!("* Opponent's turn");
                }
            }
            Notice::Countdown(secs) => {
                // Only the tail of the countdown is worth narrating.
                if secs <= 5 {
                    println!("* {secs}s left!");
                }
            }
            Notice::ReadyState(ready) => {
                println!("* You are {}", if ready { "ready" } else { "not ready" })
            }
            Notice::OpponentName(name) => println!("* Opponent: {name}"),
            Notice::Chat(text) => println!("[chat] {text}"),
            Notice::GameOver { won } => {
                if won {
                    println!("*** YOU WIN! Type 'rematch' to play again ***");
                } else {
                    println!("*** You lose. Type 'rematch' to play again ***");
                }
            }
            Notice::BoardsCleared => println!("* Boards cleared"),
            Notice::Boards { mine, theirs } => Self::print_boards(&mine, &theirs),
            Notice::Leaderboard(rows) => {
                println!("  {:<20} {:>4} {:>6} {:>5}", "player", "wins", "losses", "hits");
                for row in rows {
                    println!(
                        "  {:<20} {:>4} {:>6} {:>5}",
                        row.name, row.wins, row.losses, row.total_hits
                    );
                }
            }
            Notice::History(records) => {
                for rec in records {
                    println!(
                        "  {} vs {} -> {} won ({} / {} hits)",
                        rec.player, rec.opponent, rec.winner, rec.player_hits, rec.opponent_hits
                    );
                }
            }
        }
    }
}
