//! The per-peer game state machine.
//!
//! One explicit state value, mutated only through [`Game::handle`], which
//! consumes a typed event (local input, decoded peer message, or timer
//! expiry) and returns the effects to perform: protocol sends, UI notices,
//! timer arms/stops, and match-record handoffs. The machine itself touches
//! no sockets, clocks or rendering, so every rule is unit-testable with a
//! seeded RNG and nothing else.
//!
//! Both peers run this machine and must derive the same outcome from the
//! message stream alone; there is no arbiter. The "initiator" flag exists
//! solely to decide which side performs the opening coin flip.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::common::RuleError;
use crate::config::{REQUIRED_HITS, TURN_SECONDS};
use crate::grid::{Cell, Grid};
use crate::protocol::Message;
use crate::ship::{PlacementSession, Ship, ShipClass, ShipTally};
use crate::stats::MatchRecord;
use crate::ui::{BoardSide, Notice, UiEvent};

/// Coarse lifecycle phase. Ready/turn flags live next to it because the
/// original protocol treats them as independent of the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingConnection,
    Placing,
    InProgress,
    Concluded { won: bool },
}

/// Everything that can drive the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Transport established; the opponent is on the line.
    Connected,
    /// Transport gone. Terminal.
    ConnectionLost,
    /// Local player input.
    Ui(UiEvent),
    /// Decoded message from the peer.
    Peer(Message),
    /// The local turn countdown expired.
    Timeout,
}

/// Effects the caller performs after a `handle` call, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Send(Message),
    Ui(Notice),
    /// Reset the countdown to full and run it.
    ArmTimer,
    StopTimer,
    /// Hand a concluded match to the persistence collaborator.
    Record(MatchRecord),
}

/// The single mutable game state of one peer.
pub struct Game {
    initiator: bool,
    name: String,
    opponent_name: String,
    phase: Phase,
    my_grid: Grid,
    mirror: Grid,
    ships: Vec<Ship>,
    tally: ShipTally,
    session: Option<PlacementSession>,
    ready: bool,
    opponent_ready: bool,
    my_turn: bool,
    my_hits: u32,
    hits_taken: u32,
    pending_attack: Option<(u8, u8)>,
    rematch_mine: bool,
    rematch_theirs: bool,
}

impl Game {
    /// `initiator` is true for the hosting side; it only gates the coin
    /// flip.
    pub fn new(name: impl Into<String>, initiator: bool) -> Self {
        Self {
            initiator,
            name: name.into(),
            opponent_name: String::new(),
            phase: Phase::AwaitingConnection,
            my_grid: Grid::new(),
            mirror: Grid::new(),
            ships: Vec::new(),
            tally: ShipTally::new(),
            session: None,
            ready: false,
            opponent_ready: false,
            my_turn: false,
            my_hits: 0,
            hits_taken: 0,
            pending_attack: None,
            rematch_mine: false,
            rematch_theirs: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn opponent_ready(&self) -> bool {
        self.opponent_ready
    }

    pub fn my_grid(&self) -> &Grid {
        &self.my_grid
    }

    /// Local reconstruction of the opponent board; never holds `Ship`.
    pub fn mirror(&self) -> &Grid {
        &self.mirror
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn tally(&self) -> ShipTally {
        self.tally
    }

    pub fn session(&self) -> Option<&PlacementSession> {
        self.session.as_ref()
    }

    pub fn my_hits(&self) -> u32 {
        self.my_hits
    }

    pub fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    pub fn pending_attack(&self) -> Option<(u8, u8)> {
        self.pending_attack
    }

    pub fn opponent_name(&self) -> &str {
        if self.opponent_name.is_empty() {
            "Opponent"
        } else {
            &self.opponent_name
        }
    }

    /// Consume one event and produce the effects to apply.
    pub fn handle(&mut self, event: Event, rng: &mut SmallRng) -> Vec<Output> {
        let mut out = Vec::new();
        match event {
            Event::Connected => {
                self.phase = Phase::Placing;
                status(&mut out, "Opponent connected! Place your ships");
            }
            Event::ConnectionLost => {
                out.push(Output::StopTimer);
                status(&mut out, "Connection lost! Game ended");
            }
            Event::Timeout => self.on_timeout(&mut out),
            Event::Ui(ev) => self.on_ui(ev, rng, &mut out),
            Event::Peer(msg) => self.on_peer(msg, rng, &mut out),
        }
        out
    }

    // ---- local input ----------------------------------------------------

    fn on_ui(&mut self, event: UiEvent, rng: &mut SmallRng, out: &mut Vec<Output>) {
        match event {
            UiEvent::SelectShip(class) => self.select_ship(class, out),
            UiEvent::PlaceCell { row, col } => self.place_cell(row, col, out),
            UiEvent::AttackCell { row, col } => self.attack_cell(row, col, out),
            UiEvent::ToggleReady => self.toggle_ready(rng, out),
            UiEvent::ClearCurrent => {
                self.discard_session(out);
                status(out, "Current ship placement cleared");
            }
            UiEvent::ClearAll => self.clear_all(out),
            UiEvent::Rematch => self.request_rematch(out),
            UiEvent::Chat(text) => out.push(Output::Send(Message::Chat(text))),
            UiEvent::ShowBoards => out.push(Output::Ui(Notice::Boards {
                mine: self.my_grid.clone(),
                theirs: self.mirror.clone(),
            })),
            // Served by the node from the stats store; nothing to do here.
            UiEvent::ShowLeaderboard => {}
        }
    }

    fn select_ship(&mut self, class: ShipClass, out: &mut Vec<Output>) {
        if self.tally.remaining(class) == 0 {
            status(out, RuleError::QuotaExhausted(class));
            return;
        }
        // A ship with cells already down must be finished or cleared first.
        if self.session.as_ref().is_some_and(|s| s.placed() > 0) {
            status(out, RuleError::PlacementInProgress);
            return;
        }
        self.discard_session(out);
        self.session = Some(PlacementSession::new(class));
        status(
            out,
            format!(
                "Selected {} ship - Place {} cells",
                class.name(),
                class.size()
            ),
        );
    }

    fn place_cell(&mut self, row: u8, col: u8, out: &mut Vec<Output>) {
        if self.ready {
            status(out, RuleError::AlreadyReady);
            return;
        }
        let Some(session) = self.session.as_mut() else {
            status(out, RuleError::NoShipSelected);
            return;
        };
        if session.is_complete() {
            return;
        }
        match self.my_grid.get(row, col) {
            Ok(Cell::Empty) => {}
            Ok(_) => {
                status(out, RuleError::CellOccupied);
                return;
            }
            Err(e) => {
                status(out, e);
                return;
            }
        }
        if session.contains(row, col) {
            return;
        }
        if let Err(e) = session.try_add(row, col) {
            status(out, e);
            return;
        }
        // session accepted the cell; commit it to the grid
        let _ = self.my_grid.set(row, col, Cell::Ship);
        out.push(Output::Ui(Notice::CellChanged {
            side: BoardSide::Mine,
            row,
            col,
            state: Cell::Ship,
        }));
        if session.is_complete() {
            self.commit_ship(out);
        } else {
            let session = self.session.as_ref().expect("session still open");
            status(
                out,
                format!(
                    "Placed {}/{} cells",
                    session.placed(),
                    session.class().size()
                ),
            );
        }
    }

    fn commit_ship(&mut self, out: &mut Vec<Output>) {
        let session = self.session.take().expect("completed session");
        let class = session.class();
        self.ships.push(session.into_ship());
        self.tally.record(class);
        self.push_quota(out);
        if self.tally.complete() {
            status(out, "All ships placed! Click Ready when done");
        } else {
            status(out, "Ship placed! Select next ship type");
        }
    }

    /// Revert an incomplete session's cells and drop the session.
    fn discard_session(&mut self, out: &mut Vec<Output>) {
        let Some(session) = self.session.take() else {
            return;
        };
        for &(row, col) in session.cells() {
            let _ = self.my_grid.set(row, col, Cell::Empty);
            out.push(Output::Ui(Notice::CellChanged {
                side: BoardSide::Mine,
                row,
                col,
                state: Cell::Empty,
            }));
        }
    }

    fn clear_all(&mut self, out: &mut Vec<Output>) {
        self.session = None;
        self.ships.clear();
        self.tally.reset();
        let snapshot = self.my_grid.clone();
        for (row, col, cell) in snapshot.iter() {
            if cell == Cell::Ship {
                let _ = self.my_grid.set(row, col, Cell::Empty);
                out.push(Output::Ui(Notice::CellChanged {
                    side: BoardSide::Mine,
                    row,
                    col,
                    state: Cell::Empty,
                }));
            }
        }
        self.ready = false;
        out.push(Output::Ui(Notice::ReadyState(false)));
        self.push_quota(out);
        status(out, "All ships cleared");
    }

    fn toggle_ready(&mut self, rng: &mut SmallRng, out: &mut Vec<Output>) {
        if !self.tally.complete() {
            status(out, RuleError::ShipsIncomplete);
            return;
        }
        self.ready = !self.ready;
        out.push(Output::Ui(Notice::ReadyState(self.ready)));
        if self.ready {
            status(out, "Ready! Waiting for opponent...");
            out.push(Output::Send(Message::PlayerName(self.name.clone())));
            out.push(Output::Send(Message::Ready));
            // First of the two coin-flip call sites. If both peers become
            // ready inside the same race window the initiator may flip here
            // and again on the READY it then receives, broadcasting two
            // START lines. Known protocol race, kept as-is.
            if self.opponent_ready && self.initiator {
                self.coin_flip(rng, out);
            }
        } else {
            status(out, "Not ready");
        }
    }

    fn attack_cell(&mut self, row: u8, col: u8, out: &mut Vec<Output>) {
        if !self.ready {
            status(out, RuleError::NotReady);
            return;
        }
        if !self.my_turn {
            status(out, RuleError::NotYourTurn);
            return;
        }
        if self.pending_attack.is_some() {
            // Input is blocked until the outstanding result arrives.
            return;
        }
        match self.mirror.get(row, col) {
            Ok(Cell::Empty) => {}
            Ok(_) => {
                status(out, RuleError::CellAlreadyAttacked);
                return;
            }
            Err(e) => {
                status(out, e);
                return;
            }
        }
        self.pending_attack = Some((row, col));
        out.push(Output::Send(Message::Attack {
            row: row as i8,
            col: col as i8,
        }));
        status(out, "Attacking...");
    }

    fn request_rematch(&mut self, out: &mut Vec<Output>) {
        if !matches!(self.phase, Phase::Concluded { .. }) {
            log::debug!("rematch requested before conclusion, ignored");
            return;
        }
        self.rematch_mine = true;
        out.push(Output::Send(Message::RematchRequest));
        status(out, "Waiting for opponent to accept rematch...");
        if self.rematch_theirs {
            out.push(Output::Send(Message::RematchAccept));
            self.reset_for_rematch(out);
        }
    }

    // ---- peer messages --------------------------------------------------

    fn on_peer(&mut self, msg: Message, rng: &mut SmallRng, out: &mut Vec<Output>) {
        match msg {
            Message::PlayerName(name) => {
                status(out, format!("Playing against {name} - Place your ships"));
                self.opponent_name = name.clone();
                out.push(Output::Ui(Notice::OpponentName(name)));
            }
            Message::Ready => {
                self.opponent_ready = true;
                status(out, "Opponent is ready!");
                // Second coin-flip call site; see toggle_ready.
                if self.ready && self.initiator {
                    self.coin_flip(rng, out);
                }
            }
            Message::Start { initiator_starts } => {
                let my_first = if self.initiator {
                    initiator_starts
                } else {
                    !initiator_starts
                };
                self.start_game(my_first, out);
            }
            Message::Attack { row, col } => self.on_attacked(row, col, out),
            Message::AttackResult { hit } => self.on_attack_result(hit, out),
            Message::Win => {
                // Exactly-once: ignore if we already concluded on our own.
                if !matches!(self.phase, Phase::Concluded { .. }) {
                    self.conclude(false, out);
                }
            }
            Message::RematchRequest => {
                self.rematch_theirs = true;
                status(out, format!("{} wants a rematch!", self.opponent_name()));
                if self.rematch_mine {
                    out.push(Output::Send(Message::RematchAccept));
                    self.reset_for_rematch(out);
                }
            }
            Message::RematchAccept => self.reset_for_rematch(out),
            Message::Chat(text) => out.push(Output::Ui(Notice::Chat(text))),
        }
    }

    fn coin_flip(&mut self, rng: &mut SmallRng, out: &mut Vec<Output>) {
        let initiator_starts: bool = rng.random();
        out.push(Output::Send(Message::Start { initiator_starts }));
        // The initiator is the only flipper, so locally this means us.
        self.start_game(initiator_starts, out);
    }

    fn start_game(&mut self, my_first: bool, out: &mut Vec<Output>) {
        self.phase = Phase::InProgress;
        self.my_turn = my_first;
        self.my_hits = 0;
        self.hits_taken = 0;
        status(
            out,
            if my_first {
                "Game started! Your turn"
            } else {
                "Game started! Opponent's turn"
            },
        );
        out.push(Output::Ui(Notice::TurnChanged(my_first)));
        if my_first {
            out.push(Output::ArmTimer);
            out.push(Output::Ui(Notice::Countdown(TURN_SECONDS)));
        }
    }

    /// Peer attacked our grid, or passed the turn with the sentinel.
    fn on_attacked(&mut self, row: i8, col: i8, out: &mut Vec<Output>) {
        if row == -1 && col == -1 {
            // Opponent's countdown expired; the turn is ours regardless of
            // prior state. Reply with a synthetic miss, touch no cell.
            self.my_turn = true;
            out.push(Output::Ui(Notice::TurnChanged(true)));
            out.push(Output::ArmTimer);
            out.push(Output::Ui(Notice::Countdown(TURN_SECONDS)));
            out.push(Output::Send(Message::AttackResult { hit: false }));
            status(out, "Opponent's time ran out! Your turn");
            return;
        }
        let (row, col) = match (u8::try_from(row), u8::try_from(col)) {
            (Ok(r), Ok(c)) if Grid::in_bounds(r, c) => (r, c),
            _ => {
                log::warn!("dropping attack at invalid coordinate ({row}, {col})");
                return;
            }
        };
        let hit = self.my_grid.get(row, col) == Ok(Cell::Ship);
        if hit {
            let _ = self.my_grid.set(row, col, Cell::Hit);
            out.push(Output::Ui(Notice::CellChanged {
                side: BoardSide::Mine,
                row,
                col,
                state: Cell::Hit,
            }));
            self.hits_taken += 1;
            if let Some(ship) = self.ships.iter_mut().find(|s| s.contains(row, col)) {
                ship.register_hit(row, col);
            }
            out.push(Output::Send(Message::AttackResult { hit: true }));
            // A hit means the attacker keeps firing; our turn flag stays off.
            status(out, "Opponent HIT your ship! Their turn continues");
            if self.hits_taken >= REQUIRED_HITS && !matches!(self.phase, Phase::Concluded { .. }) {
                self.conclude(false, out);
            }
        } else {
            let _ = self.my_grid.set(row, col, Cell::Miss);
            out.push(Output::Ui(Notice::CellChanged {
                side: BoardSide::Mine,
                row,
                col,
                state: Cell::Miss,
            }));
            out.push(Output::Send(Message::AttackResult { hit: false }));
            self.my_turn = true;
            out.push(Output::Ui(Notice::TurnChanged(true)));
            out.push(Output::ArmTimer);
            out.push(Output::Ui(Notice::Countdown(TURN_SECONDS)));
            status(out, "Opponent missed! Your turn");
        }
    }

    /// Result of our own pending attack, applied to the mirror.
    fn on_attack_result(&mut self, hit: bool, out: &mut Vec<Output>) {
        let Some((row, col)) = self.pending_attack.take() else {
            log::warn!("dropping RESULT with no attack pending");
            return;
        };
        if hit {
            let _ = self.mirror.set(row, col, Cell::Hit);
            out.push(Output::Ui(Notice::CellChanged {
                side: BoardSide::Theirs,
                row,
                col,
                state: Cell::Hit,
            }));
            self.my_hits += 1;
            status(
                out,
                format!(
                    "HIT! You get another turn (Hits: {}/{})",
                    self.my_hits, REQUIRED_HITS
                ),
            );
            // Turn is retained; only the countdown restarts.
            out.push(Output::ArmTimer);
            out.push(Output::Ui(Notice::Countdown(TURN_SECONDS)));
            if self.my_hits >= REQUIRED_HITS && !matches!(self.phase, Phase::Concluded { .. }) {
                out.push(Output::Send(Message::Win));
                self.conclude(true, out);
            }
        } else {
            let _ = self.mirror.set(row, col, Cell::Miss);
            out.push(Output::Ui(Notice::CellChanged {
                side: BoardSide::Theirs,
                row,
                col,
                state: Cell::Miss,
            }));
            self.my_turn = false;
            out.push(Output::Ui(Notice::TurnChanged(false)));
            out.push(Output::StopTimer);
            status(out, "MISS! Opponent's turn");
        }
    }

    // ---- timer ----------------------------------------------------------

    fn on_timeout(&mut self, out: &mut Vec<Output>) {
        if !self.my_turn {
            // The timer never runs off-turn; a stray expiry is dropped.
            log::debug!("timeout while not holding the turn, ignored");
            return;
        }
        out.push(Output::Send(Message::timeout_pass()));
        self.my_turn = false;
        self.pending_attack = None;
        out.push(Output::Ui(Notice::TurnChanged(false)));
        out.push(Output::StopTimer);
        status(out, "Time's up! Opponent's turn");
    }

    // ---- conclusion and rematch -----------------------------------------

    fn conclude(&mut self, won: bool, out: &mut Vec<Output>) {
        self.phase = Phase::Concluded { won };
        out.push(Output::StopTimer);
        out.push(Output::Ui(Notice::GameOver { won }));
        let winner = if won {
            self.name.clone()
        } else {
            self.opponent_name().to_string()
        };
        out.push(Output::Record(MatchRecord {
            player: self.name.clone(),
            opponent: self.opponent_name().to_string(),
            winner,
            player_hits: self.my_hits,
            opponent_hits: self.hits_taken,
        }));
    }

    /// Full reset back to placement. Idempotent: running it twice (request
    /// crossing with accept) lands in the same state.
    fn reset_for_rematch(&mut self, out: &mut Vec<Output>) {
        self.my_grid.clear();
        self.mirror.clear();
        self.ships.clear();
        self.tally.reset();
        self.session = None;
        self.ready = false;
        self.opponent_ready = false;
        self.my_turn = false;
        self.my_hits = 0;
        self.hits_taken = 0;
        self.pending_attack = None;
        self.rematch_mine = false;
        self.rematch_theirs = false;
        self.phase = Phase::Placing;
        out.push(Output::StopTimer);
        out.push(Output::Ui(Notice::BoardsCleared));
        out.push(Output::Ui(Notice::ReadyState(false)));
        out.push(Output::Ui(Notice::TurnChanged(false)));
        self.push_quota(out);
        status(out, "Rematch! Place your ships");
    }

    fn push_quota(&mut self, out: &mut Vec<Output>) {
        out.push(Output::Ui(Notice::ShipQuota {
            small: self.tally.remaining(ShipClass::Small),
            medium: self.tally.remaining(ShipClass::Medium),
            large: self.tally.remaining(ShipClass::Large),
        }));
    }
}

fn status(out: &mut Vec<Output>, text: impl ToString) {
    out.push(Output::Ui(Notice::Status(text.to_string())));
}
