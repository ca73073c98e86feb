//! End-to-end: two nodes over a real socket pair, from placement through a
//! concluded match, observed only through the UI notification seam.

use std::sync::{Arc, Mutex};

use broadside::{
    BoardSide, Cell, Connection, Event, Game, GameNode, MatchRecord, MemoryStats, Notice,
    ShipClass, StatsStore, UiEvent, UiSink, REQUIRED_HITS,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

struct ChannelUi(mpsc::UnboundedSender<Notice>);

impl UiSink for ChannelUi {
    fn notify(&mut self, notice: Notice) {
        let _ = self.0.send(notice);
    }
}

#[derive(Clone, Default)]
struct SharedStats(Arc<Mutex<MemoryStats>>);

impl StatsStore for SharedStats {
    fn record_result(&mut self, record: &MatchRecord) -> anyhow::Result<()> {
        self.0.lock().unwrap().record_result(record)
    }

    fn leaderboard(&self) -> anyhow::Result<Vec<broadside::LeaderboardRow>> {
        self.0.lock().unwrap().leaderboard()
    }

    fn history(&self, limit: usize) -> anyhow::Result<Vec<MatchRecord>> {
        self.0.lock().unwrap().history(limit)
    }
}

struct Peer {
    events: mpsc::UnboundedSender<Event>,
    notices: mpsc::UnboundedReceiver<Notice>,
    stats: SharedStats,
}

fn spawn_peer(name: &str, stream: TcpStream, initiator: bool, seed: u64) -> Peer {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (notice_tx, notices) = mpsc::unbounded_channel();
    let conn = Connection::start(stream, events_tx.clone());
    let stats = SharedStats::default();
    let mut node = GameNode::new(
        Game::new(name, initiator),
        conn,
        Box::new(ChannelUi(notice_tx)),
        Box::new(stats.clone()),
        SmallRng::seed_from_u64(seed),
        events_rx,
    );
    tokio::spawn(async move { node.run().await });
    Peer {
        events: events_tx,
        notices,
        stats,
    }
}

impl Peer {
    fn ui(&self, event: UiEvent) {
        self.events.send(Event::Ui(event)).unwrap();
    }

    fn place_fleet(&self) {
        let ships: [(ShipClass, u8, &[u8]); 4] = [
            (ShipClass::Small, 0, &[0, 1]),
            (ShipClass::Medium, 2, &[0, 1, 2]),
            (ShipClass::Medium, 4, &[0, 1, 2]),
            (ShipClass::Large, 6, &[0, 1, 2, 3]),
        ];
        for (class, row, cols) in ships {
            self.ui(UiEvent::SelectShip(class));
            for &col in cols {
                self.ui(UiEvent::PlaceCell { row, col });
            }
        }
    }

    async fn wait_for<F: Fn(&Notice) -> bool>(&mut self, what: &str, pred: F) -> Notice {
        loop {
            let notice = timeout(Duration::from_secs(10), self.notices.recv())
                .await
                .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
                .expect("notice channel closed");
            if pred(&notice) {
                return notice;
            }
        }
    }
}

#[tokio::test]
async fn full_match_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();

    let mut host = spawn_peer("Alice", server, true, 1);
    let mut join = spawn_peer("Bob", client, false, 2);

    host.place_fleet();
    join.place_fleet();
    host.ui(UiEvent::ToggleReady);
    join.ui(UiEvent::ToggleReady);

    // the coin flip lands somewhere; find out who moves first
    let host_first = matches!(
        host.wait_for("turn assignment", |n| matches!(n, Notice::TurnChanged(_)))
            .await,
        Notice::TurnChanged(true)
    );
    let (shooter, watcher) = if host_first {
        (&mut host, &mut join)
    } else {
        (&mut join, &mut host)
    };

    // every fleet cell is a hit, so the shooter keeps the turn throughout
    let targets: Vec<(u8, u8)> = [(0u8, vec![0u8, 1]), (2, vec![0, 1, 2]), (4, vec![0, 1, 2]), (6, vec![0, 1, 2, 3])]
        .into_iter()
        .flat_map(|(row, cols)| cols.into_iter().map(move |col| (row, col)))
        .collect();
    for (row, col) in targets {
        shooter.ui(UiEvent::AttackCell { row, col });
        shooter
            .wait_for("hit on the mirror", |n| {
                matches!(
                    n,
                    Notice::CellChanged {
                        side: BoardSide::Theirs,
                        state: Cell::Hit,
                        ..
                    }
                )
            })
            .await;
    }

    let won = shooter
        .wait_for("shooter outcome", |n| matches!(n, Notice::GameOver { .. }))
        .await;
    assert_eq!(won, Notice::GameOver { won: true });
    let lost = watcher
        .wait_for("watcher outcome", |n| matches!(n, Notice::GameOver { .. }))
        .await;
    assert_eq!(lost, Notice::GameOver { won: false });

    // each peer handed exactly one record to its own store
    let shooter_records = shooter.stats.history(10).unwrap();
    assert_eq!(shooter_records.len(), 1);
    assert_eq!(shooter_records[0].player_hits, REQUIRED_HITS);
    let watcher_records = watcher.stats.history(10).unwrap();
    assert_eq!(watcher_records.len(), 1);
    assert_eq!(watcher_records[0].opponent_hits, REQUIRED_HITS);
}

#[tokio::test]
async fn dropped_peer_surfaces_connection_lost() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client = TcpStream::connect(addr).await.unwrap();
    let (server, _) = listener.accept().await.unwrap();

    let mut host = spawn_peer("Alice", server, true, 1);
    drop(client);

    host.wait_for("connection lost status", |n| {
        matches!(n, Notice::Status(s) if s.contains("Connection lost"))
    })
    .await;
}
