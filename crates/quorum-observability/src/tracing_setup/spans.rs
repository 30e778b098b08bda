//! Span definitions per operation: merge, sync, receive, fork.

/// Create a merge span.
#[macro_export]
macro_rules! merge_span {
    ($node_id:expr, $peer_root:expr) => {
        tracing::info_span!($crate::tracing_setup::spans::names::MERGE, node_id = $node_id, peer_root = %$peer_root)
    };
}

/// Create a sync span.
#[macro_export]
macro_rules! sync_span {
    ($peer:expr) => {
        tracing::info_span!($crate::tracing_setup::spans::names::SYNC, peer = %$peer)
    };
}

/// Create a receive span.
#[macro_export]
macro_rules! receive_span {
    ($message_id:expr, $sender:expr) => {
        tracing::info_span!($crate::tracing_setup::spans::names::RECEIVE, message_id = %$message_id, sender = %$sender)
    };
}

/// Create a branch span.
#[macro_export]
macro_rules! branch_span {
    ($name:expr) => {
        tracing::info_span!($crate::tracing_setup::spans::names::BRANCH, branch = %$name)
    };
}

/// Span names used by the macros above.
pub mod names {
    pub const MERGE: &str = "quorum.merge";
    pub const SYNC: &str = "quorum.sync";
    pub const RECEIVE: &str = "quorum.receive";
    pub const BRANCH: &str = "quorum.branch";
}
