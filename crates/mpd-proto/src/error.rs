//! The `ACK` classifier (C2) and the error taxonomy of §7.

use thiserror::Error;

/// The numeric `ACK` codes MPD defines, named by domain effect (§4.2).
/// Any code not in this list classifies as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotAList,
    Arguments,
    Password,
    Permission,
    Command,
    DoesNotExist,
    PlaylistMax,
    System,
    PlaylistLoad,
    UpdateInProgress,
    OutOfSync,
    Exists,
    Unknown(u32),
}

impl ErrorKind {
    fn from_code(code: u32) -> Self {
        match code {
            1 => Self::NotAList,
            2 => Self::Arguments,
            3 => Self::Password,
            4 => Self::Permission,
            5 => Self::Command,
            50 => Self::DoesNotExist,
            51 => Self::PlaylistMax,
            52 => Self::System,
            53 => Self::PlaylistLoad,
            54 => Self::UpdateInProgress,
            55 => Self::OutOfSync,
            56 => Self::Exists,
            other => Self::Unknown(other),
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::NotAList => "not-a-list",
            Self::Arguments => "arguments",
            Self::Password => "password",
            Self::Permission => "permission",
            Self::Command => "command",
            Self::DoesNotExist => "does-not-exist",
            Self::PlaylistMax => "playlist-max",
            Self::System => "system",
            Self::PlaylistLoad => "playlist-load",
            Self::UpdateInProgress => "update-in-progress",
            Self::OutOfSync => "out-of-sync",
            Self::Exists => "exists",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown({code})"),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// A parsed `ACK [<code>@<idx>] {<cmd>} <msg>` line (§4.2, §8 property 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckError {
    pub kind: ErrorKind,
    pub command_index: u32,
    pub command_name: String,
    pub message: String,
}

impl AckError {
    /// Parses one `ACK` line. A line that doesn't match the grammar still
    /// produces an `AckError` — kind `Unknown`, raw text as the message —
    /// per §4.2's "malformed ACK" rule, never a hard parse failure.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        Self::try_parse(line).unwrap_or_else(|| Self {
            kind: ErrorKind::Unknown(0),
            command_index: 0,
            command_name: String::new(),
            message: line.to_string(),
        })
    }

    fn try_parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("ACK [")?;
        let (code_and_idx, rest) = rest.split_once(']')?;
        let (code, idx) = code_and_idx.split_once('@')?;
        let code: u32 = code.parse().ok()?;
        let command_index: u32 = idx.parse().ok()?;

        let rest = rest.strip_prefix(" {")?;
        let (command_name, rest) = rest.split_once('}')?;
        let message = rest.strip_prefix(' ').unwrap_or(rest);

        Some(Self {
            kind: ErrorKind::from_code(code),
            command_index,
            command_name: command_name.to_string(),
            message: message.to_string(),
        })
    }
}

impl std::fmt::Display for AckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] ({}): {}",
            self.kind, self.command_index, self.command_name, self.message
        )
    }
}

/// The error taxonomy of §7. `WouldBlock` is intentionally absent: in this
/// crate's async translation, a short read just suspends the `.await` point
/// instead of surfacing — see SPEC_FULL.md's note on the pump.
#[derive(Debug, Error)]
pub enum MpdError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("protocol error: {0}")]
    Protocol(AckError),

    #[error("connection closed")]
    Closed,

    #[error("cancelled")]
    Cancelled,

    #[error("timed out")]
    TimedOut,
}

impl MpdError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }
}
