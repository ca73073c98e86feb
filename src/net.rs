//! Connection manager: one TCP stream to the single peer, a reader task
//! decoding lines into state-machine events, and a writer task draining the
//! outbound channel. Both tasks end when the stream does; the reader emits
//! exactly one terminal [`Event::ConnectionLost`].

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::game::Event;
use crate::protocol::Message;

/// Handle to an established peer link. Sending is fire-and-forget: once the
/// writer task is gone the message is dropped, not queued.
pub struct Connection {
    outbound: mpsc::UnboundedSender<Message>,
}

impl Connection {
    /// Bind `port`, accept exactly one peer, and start the I/O tasks. The
    /// caller of `host` takes the initiator role.
    pub async fn host(port: u16, events: mpsc::UnboundedSender<Event>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        log::info!("hosting on port {port}, waiting for opponent");
        let (stream, addr) = listener.accept().await?;
        log::info!("opponent connected from {addr}");
        Ok(Self::start(stream, events))
    }

    /// Connect to a hosting peer. The caller takes the joiner role.
    pub async fn join(
        host: &str,
        port: u16,
        events: mpsc::UnboundedSender<Event>,
    ) -> anyhow::Result<Self> {
        log::info!("connecting to {host}:{port}");
        let stream = TcpStream::connect((host, port)).await?;
        log::info!("connected");
        Ok(Self::start(stream, events))
    }

    /// Wrap an already-established stream. Queues [`Event::Connected`]
    /// before any peer message can arrive.
    pub fn start(stream: TcpStream, events: mpsc::UnboundedSender<Event>) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let _ = events.send(Event::Connected);
        tokio::spawn(read_loop(read_half, events));
        tokio::spawn(write_loop(write_half, outbound_rx));
        Self { outbound }
    }

    /// Enqueue a message for the peer. Never blocks, never fails: with the
    /// link gone the message is silently discarded.
    pub fn send(&self, msg: Message) {
        if let Err(mpsc::error::SendError(msg)) = self.outbound.send(msg) {
            log::debug!("link closed, dropping outbound {}", msg.encode());
        }
    }
}

async fn read_loop(read_half: OwnedReadHalf, events: mpsc::UnboundedSender<Event>) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match Message::parse(&line) {
                Ok(msg) => {
                    if events.send(Event::Peer(msg)).is_err() {
                        // State machine gone; nothing left to deliver to.
                        return;
                    }
                }
                Err(e) => log::warn!("dropping malformed line {line:?}: {e}"),
            },
            Ok(None) => {
                log::info!("peer closed the connection");
                break;
            }
            Err(e) => {
                log::warn!("read error: {e}");
                break;
            }
        }
    }
    let _ = events.send(Event::ConnectionLost);
}

async fn write_loop(mut write_half: OwnedWriteHalf, mut outbound: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = outbound.recv().await {
        let mut line = msg.encode();
        line.push('\n');
        if let Err(e) = write_half.write_all(line.as_bytes()).await {
            log::warn!("write error, closing outbound side: {e}");
            break;
        }
    }
}
