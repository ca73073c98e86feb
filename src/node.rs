//! Event-loop glue binding the state machine to its collaborators.
//!
//! All three event sources (network reader, one-second tick, local input)
//! land in one channel consumed here, so the [`Game`] is only ever mutated
//! from this loop. Outputs are applied in the order the machine emitted
//! them.

use rand::rngs::SmallRng;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::game::{Event, Game, Output};
use crate::net::Connection;
use crate::stats::StatsStore;
use crate::timer::{TimerEvent, TurnTimer};
use crate::ui::{Notice, UiEvent, UiSink};

pub struct GameNode {
    game: Game,
    timer: TurnTimer,
    conn: Connection,
    ui: Box<dyn UiSink>,
    stats: Box<dyn StatsStore>,
    rng: SmallRng,
    events: mpsc::UnboundedReceiver<Event>,
}

impl GameNode {
    pub fn new(
        game: Game,
        conn: Connection,
        ui: Box<dyn UiSink>,
        stats: Box<dyn StatsStore>,
        rng: SmallRng,
        events: mpsc::UnboundedReceiver<Event>,
    ) -> Self {
        Self {
            game,
            timer: TurnTimer::new(),
            conn,
            ui,
            stats,
            rng,
            events,
        }
    }

    /// Drive the game until the link drops or every event sender is gone.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut tick = interval(Duration::from_secs(1));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    if !self.dispatch(event) {
                        break;
                    }
                }
                _ = tick.tick() => {
                    match self.timer.tick() {
                        Some(TimerEvent::Tick(secs)) => {
                            self.ui.notify(Notice::Countdown(secs));
                        }
                        Some(TimerEvent::Expired) => {
                            let outputs = self.game.handle(Event::Timeout, &mut self.rng);
                            self.apply(outputs);
                        }
                        None => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Handle one event. Returns `false` when the loop should end.
    fn dispatch(&mut self, event: Event) -> bool {
        match event {
            // Read surface of the stats collaborator; never enters the game.
            Event::Ui(UiEvent::ShowLeaderboard) => {
                self.show_leaderboard();
                true
            }
            Event::ConnectionLost => {
                let outputs = self.game.handle(Event::ConnectionLost, &mut self.rng);
                self.apply(outputs);
                false
            }
            event => {
                let outputs = self.game.handle(event, &mut self.rng);
                self.apply(outputs);
                true
            }
        }
    }

    fn apply(&mut self, outputs: Vec<Output>) {
        for output in outputs {
            match output {
                Output::Send(msg) => self.conn.send(msg),
                Output::Ui(notice) => self.ui.notify(notice),
                Output::ArmTimer => self.timer.arm(),
                Output::StopTimer => self.timer.stop(),
                Output::Record(record) => {
                    // Best-effort by contract: never let persistence touch
                    // game flow.
                    if let Err(e) = self.stats.record_result(&record) {
                        log::warn!("failed to record match result: {e:#}");
                    }
                }
            }
        }
    }

    fn show_leaderboard(&mut self) {
        match self.stats.leaderboard() {
            Ok(rows) => self.ui.notify(Notice::Leaderboard(rows)),
            Err(e) => log::warn!("leaderboard unavailable: {e:#}"),
        }
        match self.stats.history(50) {
            Ok(records) => self.ui.notify(Notice::History(records)),
            Err(e) => log::warn!("history unavailable: {e:#}"),
        }
    }
}
