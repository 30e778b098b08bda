//! Structured log events for key system operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a successful merge.
pub fn merge_completed(node_id: u32, strategy: &str, method: &str, steps: u8, conflicts: usize) {
    tracing::info!(
        event = "merge_completed",
        node_id = node_id,
        strategy = %strategy,
        method = %method,
        steps = steps,
        conflicts = conflicts,
        "merge completed"
    );
}

/// Log a merge that left local state untouched.
pub fn merge_rejected(node_id: u32, reason: &str, local_timestamp: u64, peer_timestamp: u64) {
    tracing::warn!(
        event = "merge_rejected",
        node_id = node_id,
        reason = %reason,
        local_timestamp = local_timestamp,
        peer_timestamp = peer_timestamp,
        "merge rejected"
    );
}

/// Log a message queued for an unreachable peer.
pub fn message_queued(destination: &str, queue_depth: usize, estimated_steps: u8) {
    tracing::info!(
        event = "message_queued",
        destination = %destination,
        queue_depth = queue_depth,
        estimated_steps = estimated_steps,
        "message queued"
    );
}

/// Log a message handed to the transport immediately.
pub fn message_delivered(destination: &str, message_id: &str) {
    tracing::debug!(
        event = "message_delivered",
        destination = %destination,
        message_id = %message_id,
        "message delivered"
    );
}

/// Log a completed sync pass with one peer.
pub fn peer_synced(peer: &str, exchanged: usize) {
    tracing::info!(
        event = "peer_synced",
        peer = %peer,
        exchanged = exchanged,
        "peer synced"
    );
}

/// Log a new branch.
pub fn branch_forked(name: &str, root: &str, timestamp: u64) {
    tracing::info!(
        event = "branch_forked",
        branch = %name,
        root = %root,
        timestamp = timestamp,
        "branch forked"
    );
}

/// Log a branch merge attempt.
pub fn branch_merged(name: &str, success: bool, strategy: &str) {
    tracing::info!(
        event = "branch_merged",
        branch = %name,
        success = success,
        strategy = %strategy,
        "branch merged"
    );
}

/// Log a failed digest verification.
pub fn consistency_failure(root: &str, details: &str) {
    tracing::warn!(
        event = "consistency_failure",
        root = %root,
        details = %details,
        "consistency check failed"
    );
}

/// Log a state import.
pub fn state_imported(node_id: u32, history: usize, queued: usize) {
    tracing::info!(
        event = "state_imported",
        node_id = node_id,
        history = history,
        queued = queued,
        "state imported"
    );
}
