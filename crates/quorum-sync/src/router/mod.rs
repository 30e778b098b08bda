//! Offline routing: message shape, per-peer queues, and delivery receipts.

pub mod message;
pub mod offline;

pub use message::QueuedMessage;
pub use offline::{DeliveryMode, OfflineRouter, SendReceipt};
