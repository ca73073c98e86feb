//! Line codec for the peer wire protocol.
//!
//! One message per newline-terminated ASCII line, `COMMAND[:field]*` with
//! colon-separated fields and no escaping. A literal colon inside a field
//! cannot be represented; a CHAT line containing one is truncated at the
//! second colon. This is a documented limitation of the wire format, not
//! something the codec papers over.
//!
//! The codec is purely structural. Malformed lines parse to a
//! [`ProtocolError`] the receive loop logs and drops; they never reach the
//! state machine.

/// Messages exchanged between the two peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Announce the sender's display name.
    PlayerName(String),
    /// Sender has finished placing ships.
    Ready,
    /// Coin-flip result: does the hosting (initiator) side move first.
    Start { initiator_starts: bool },
    /// Attack target. (-1, -1) is the timeout sentinel passing the turn.
    Attack { row: i8, col: i8 },
    /// Outcome of the most recent attack against the receiver.
    AttackResult { hit: bool },
    /// Sender has reached the required-hits threshold.
    Win,
    /// Sender wants to replay.
    RematchRequest,
    /// Sender accepts a pending rematch.
    RematchAccept,
    /// Free-text message, opaque to the state machine.
    Chat(String),
}

/// Structural decode failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Blank line.
    Empty,
    /// Command tag not in the protocol table.
    UnknownCommand(String),
    /// A required field is absent.
    MissingField(&'static str),
    /// A numeric field failed to parse.
    BadNumber(String),
    /// A boolean field was neither "true" nor "false".
    BadBool(String),
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::Empty => write!(f, "empty line"),
            ProtocolError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ProtocolError::MissingField(name) => write!(f, "missing field: {name}"),
            ProtocolError::BadNumber(field) => write!(f, "unparseable number: {field}"),
            ProtocolError::BadBool(field) => write!(f, "unparseable bool: {field}"),
        }
    }
}

impl Message {
    /// The out-of-band attack passing the turn after a countdown expiry.
    pub fn timeout_pass() -> Self {
        Message::Attack { row: -1, col: -1 }
    }

    /// Whether this is the (-1, -1) sentinel rather than a real target.
    pub fn is_timeout_pass(&self) -> bool {
        matches!(self, Message::Attack { row: -1, col: -1 })
    }

    /// Encode as a single protocol line, without the trailing newline.
    pub fn encode(&self) -> String {
        match self {
            Message::PlayerName(name) => format!("PLAYER_NAME:{name}"),
            Message::Ready => "READY".to_string(),
            Message::Start { initiator_starts } => format!("START:{initiator_starts}"),
            Message::Attack { row, col } => format!("ATTACK:{row}:{col}"),
            Message::AttackResult { hit } => format!("RESULT:{hit}"),
            Message::Win => "WIN".to_string(),
            Message::RematchRequest => "REMATCH_REQUEST".to_string(),
            Message::RematchAccept => "REMATCH_ACCEPT".to_string(),
            Message::Chat(text) => format!("CHAT:{text}"),
        }
    }

    /// Parse one protocol line (no trailing newline expected; a trailing
    /// `\r` from a CRLF peer is tolerated).
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let fields: Vec<&str> = line.split(':').collect();
        match fields[0] {
            "PLAYER_NAME" => {
                // Absent name degrades to a placeholder rather than an error.
                let name = fields.get(1).copied().unwrap_or("Opponent");
                Ok(Message::PlayerName(name.to_string()))
            }
            "READY" => Ok(Message::Ready),
            "START" => {
                let initiator_starts = parse_bool(fields.get(1).copied())?;
                Ok(Message::Start { initiator_starts })
            }
            "ATTACK" => {
                let row = parse_coord(fields.get(1).copied(), "row")?;
                let col = parse_coord(fields.get(2).copied(), "col")?;
                Ok(Message::Attack { row, col })
            }
            "RESULT" => {
                let hit = parse_bool(fields.get(1).copied())?;
                Ok(Message::AttackResult { hit })
            }
            "WIN" => Ok(Message::Win),
            "REMATCH_REQUEST" => Ok(Message::RematchRequest),
            "REMATCH_ACCEPT" => Ok(Message::RematchAccept),
            "CHAT" => {
                let text = fields.get(1).copied().ok_or(ProtocolError::MissingField("text"))?;
                Ok(Message::Chat(text.to_string()))
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_bool(field: Option<&str>) -> Result<bool, ProtocolError> {
    let raw = field.ok_or(ProtocolError::MissingField("bool"))?;
    raw.parse()
        .map_err(|_| ProtocolError::BadBool(raw.to_string()))
}

fn parse_coord(field: Option<&str>, name: &'static str) -> Result<i8, ProtocolError> {
    let raw = field.ok_or(ProtocolError::MissingField(name))?;
    raw.parse()
        .map_err(|_| ProtocolError::BadNumber(raw.to_string()))
}
