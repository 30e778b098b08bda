//! Typed, non-owning view over a [`SharedBuffer`].
//!
//! # Examples
//!
//! ```
//! use quorum_sync::view::{BinaryView, Endian, SharedBuffer};
//!
//! let buffer = SharedBuffer::from_bytes(&[1, 0, 2, 0, 3, 0, 4, 0]);
//! let view = BinaryView::<u16>::new(&buffer);
//! assert_eq!(view.read_array(Endian::Little).unwrap(), vec![1, 2, 3, 4]);
//!
//! view.write(2, 9, Endian::Little).unwrap();
//! assert_eq!(view.read(2, Endian::Little).unwrap(), 9);
//! assert!(view.read(7, Endian::Little).is_err());
//! ```

use std::marker::PhantomData;

use quorum_core::errors::ViewError;
use quorum_core::Digest;

use super::buffer::SharedBuffer;
use super::lane::{Endian, Lane};

/// Reinterprets a buffer's bytes as elements of type `L`.
///
/// The borrow ties the view's lifetime to the buffer it wraps.
#[derive(Debug, Clone, Copy)]
pub struct BinaryView<'a, L: Lane> {
    buffer: &'a SharedBuffer,
    _lane: PhantomData<L>,
}

impl<'a, L: Lane> BinaryView<'a, L> {
    pub fn new(buffer: &'a SharedBuffer) -> Self {
        Self {
            buffer,
            _lane: PhantomData,
        }
    }

    /// Underlying buffer length in bytes.
    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    /// Number of whole elements in the buffer.
    pub fn element_count(&self) -> usize {
        self.buffer.len() / L::WIDTH
    }

    /// Read the whole buffer as an array of `L`.
    ///
    /// Fails with [`ViewError::Misaligned`] unless the byte length is a
    /// multiple of the element width.
    pub fn read_array(&self, endian: Endian) -> Result<Vec<L>, ViewError> {
        let len = self.buffer.len();
        if len % L::WIDTH != 0 {
            return Err(ViewError::Misaligned {
                len,
                width: L::WIDTH,
            });
        }
        let bytes = self.buffer.to_vec();
        Ok(bytes
            .chunks_exact(L::WIDTH)
            .map(|chunk| L::decode(chunk, endian))
            .collect())
    }

    /// Read one element at byte `offset`.
    pub fn read(&self, offset: usize, endian: Endian) -> Result<L, ViewError> {
        let bytes = self.buffer.read_bytes(offset, L::WIDTH)?;
        Ok(L::decode(&bytes, endian))
    }

    /// Write one element at byte `offset`. Visible to every holder of the buffer.
    pub fn write(&self, offset: usize, value: L, endian: Endian) -> Result<(), ViewError> {
        self.buffer.write_bytes(offset, &value.encode(endian))
    }

    /// Read element number `index` (offset `index * WIDTH`).
    pub fn get(&self, index: usize, endian: Endian) -> Result<L, ViewError> {
        self.read(self.element_offset(index)?, endian)
    }

    /// Write element number `index`.
    pub fn set(&self, index: usize, value: L, endian: Endian) -> Result<(), ViewError> {
        self.write(self.element_offset(index)?, value, endian)
    }

    /// Atomic load of 32-bit word `index`.
    pub fn atomic_load(&self, index: usize) -> Result<u32, ViewError> {
        self.buffer.load_word(index)
    }

    /// Atomic store of 32-bit word `index`.
    pub fn atomic_store(&self, index: usize, value: u32) -> Result<(), ViewError> {
        self.buffer.store_word(index, value)
    }

    /// Atomic compare-and-swap on 32-bit word `index`; returns the prior value.
    pub fn compare_and_swap(&self, index: usize, expected: u32, new: u32) -> Result<u32, ViewError> {
        self.buffer.compare_and_swap(index, expected, new)
    }

    /// Digest of the raw bytes.
    pub fn digest(&self) -> Digest {
        self.buffer.digest()
    }

    /// Byte-for-byte comparison against an original buffer.
    pub fn verify(&self, original: &[u8]) -> bool {
        self.buffer.len() == original.len() && self.buffer.to_vec() == original
    }

    fn element_offset(&self, index: usize) -> Result<usize, ViewError> {
        index.checked_mul(L::WIDTH).ok_or(ViewError::OutOfBounds {
            offset: usize::MAX,
            width: L::WIDTH,
            len: self.buffer.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::U256;

    #[test]
    fn read_array_requires_alignment() {
        let buffer = SharedBuffer::zeroed(6);
        let view = BinaryView::<u32>::new(&buffer);
        assert_eq!(
            view.read_array(Endian::Little),
            Err(ViewError::Misaligned { len: 6, width: 4 })
        );
        assert_eq!(BinaryView::<u16>::new(&buffer).read_array(Endian::Little).unwrap().len(), 3);
    }

    #[test]
    fn out_of_bounds_read_and_write_fail() {
        let buffer = SharedBuffer::zeroed(8);
        let view = BinaryView::<u64>::new(&buffer);
        assert!(view.read(0, Endian::Big).is_ok());
        assert_eq!(
            view.read(1, Endian::Big),
            Err(ViewError::OutOfBounds {
                offset: 1,
                width: 8,
                len: 8
            })
        );
        assert!(view.write(4, 1, Endian::Big).is_err());
        assert!(view.get(1, Endian::Big).is_err());
    }

    #[test]
    fn writes_are_visible_through_other_views() {
        let buffer = SharedBuffer::zeroed(16);
        let wide = BinaryView::<u128>::new(&buffer);
        let narrow = BinaryView::<u32>::new(&buffer);
        wide.write(0, 0xdead_beef, Endian::Little).unwrap();
        assert_eq!(narrow.get(0, Endian::Little).unwrap(), 0xdead_beef);
        assert_eq!(narrow.atomic_load(0).unwrap(), 0xdead_beef);
    }

    #[test]
    fn compare_and_swap_semantics() {
        let buffer = SharedBuffer::zeroed(8);
        let view = BinaryView::<u32>::new(&buffer);
        assert_eq!(view.compare_and_swap(1, 0, 5).unwrap(), 0);
        assert_eq!(view.atomic_load(1).unwrap(), 5);
        // Stale expectation leaves the word unchanged.
        assert_eq!(view.compare_and_swap(1, 0, 7).unwrap(), 5);
        assert_eq!(view.atomic_load(1).unwrap(), 5);
        assert!(view.compare_and_swap(2, 0, 1).is_err());
    }

    #[test]
    fn u256_elements() {
        let buffer = SharedBuffer::zeroed(64);
        let view = BinaryView::<U256>::new(&buffer);
        assert_eq!(view.element_count(), 2);
        view.set(1, U256::from(42u128), Endian::Big).unwrap();
        let all = view.read_array(Endian::Big).unwrap();
        assert_eq!(all, vec![U256::ZERO, U256::from(42u128)]);
    }

    #[test]
    fn digest_and_verify_track_contents() {
        let original = [1u8, 2, 3, 4];
        let buffer = SharedBuffer::from_bytes(&original);
        let view = BinaryView::<u16>::new(&buffer);
        assert!(view.verify(&original));
        assert_eq!(view.digest(), Digest::of(&original));
        view.write(0, 0, Endian::Little).unwrap();
        assert!(!view.verify(&original));
        assert_ne!(view.digest(), Digest::of(&original));
    }
}
