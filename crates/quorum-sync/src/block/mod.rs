//! Block state: named byte fields, per-field digests, and the root hash chain.

pub mod block_state;
pub mod field;
pub mod schema;

pub use block_state::BlockState;
pub use field::ByteField;
pub use schema::FieldSchema;
