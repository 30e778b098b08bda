//! Branch manager: fork, update, merge back, delete.

pub mod manager;

pub use manager::{BranchManager, BranchPointer};
