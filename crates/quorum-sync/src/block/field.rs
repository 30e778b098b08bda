use serde::{Deserialize, Serialize};

use quorum_core::Digest;

use crate::view::{BinaryView, Lane, SharedBuffer};

/// A named, fixed-length byte sequence owned by one block state.
///
/// `Clone` deep-copies the bytes: a field is never aliased between
/// snapshots.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteField {
    name: String,
    buffer: SharedBuffer,
}

impl ByteField {
    /// Build a field holding a private copy of `bytes`.
    pub fn new(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            buffer: SharedBuffer::from_bytes(bytes),
        }
    }

    /// Empty field.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, &[])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    pub fn digest(&self) -> Digest {
        self.buffer.digest()
    }

    /// Shared handle to the field's storage.
    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// Typed view over the field's bytes.
    pub fn view<L: Lane>(&self) -> BinaryView<'_, L> {
        BinaryView::new(&self.buffer)
    }
}

impl Clone for ByteField {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            buffer: self.buffer.deep_copy(),
        }
    }
}
