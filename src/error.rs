use std::fmt;

/// Errors that can occur while resolving or executing a program.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("Unbalanced loop: unmatched {kind} at instruction {ip}")]
    UnbalancedLoop { ip: usize, kind: UnmatchedBracketKind },

    /// One of the start-of-run allocations could not be satisfied.
    #[error("Resource exhaustion: could not allocate {what} ({requested} entries)")]
    ResourceExhaustion { what: ResourceKind, requested: usize },

    /// The I/O adapter reported an unrecoverable condition.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },

    /// Execution aborted because the configured step limit was reached.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// The one-time allocations a run depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Program,
    JumpTable,
    Tape,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Program => write!(f, "program buffer"),
            ResourceKind::JumpTable => write!(f, "jump table"),
            ResourceKind::Tape => write!(f, "tape"),
        }
    }
}
