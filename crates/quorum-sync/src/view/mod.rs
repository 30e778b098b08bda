//! Binary view layer: shared byte buffers and typed views over them.

pub mod binary_view;
pub mod buffer;
pub mod lane;

pub use binary_view::BinaryView;
pub use buffer::SharedBuffer;
pub use lane::{Endian, Lane, U256};
