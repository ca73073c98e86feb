//! Two-player networked naval board game, peer-to-peer over one TCP stream.
//!
//! Both peers run an identical state machine ([`Game`]) kept in agreement
//! purely through the line protocol in [`protocol`]; neither side is
//! authoritative. The hosting side is "initiator" only so exactly one peer
//! performs the opening coin flip.

mod common;
mod config;
mod game;
mod grid;
mod logging;
mod net;
mod node;
mod protocol;
mod ship;
mod stats;
mod timer;
mod ui;

pub use common::RuleError;
pub use config::{DEFAULT_PORT, GRID_SIZE, REQUIRED_HITS, TURN_SECONDS};
pub use game::{Event, Game, Output, Phase};
pub use grid::{Cell, Grid};
pub use logging::init_logging;
pub use net::Connection;
pub use node::GameNode;
pub use protocol::{Message, ProtocolError};
pub use ship::{Axis, PlacementSession, Ship, ShipClass, ShipTally};
pub use stats::{FileStats, LeaderboardRow, MatchRecord, MemoryStats, StatsStore};
pub use timer::{TimerEvent, TurnTimer};
pub use ui::{BoardSide, ConsoleUi, Notice, NullUi, UiEvent, UiSink};
