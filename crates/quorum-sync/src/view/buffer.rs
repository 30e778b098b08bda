//! Shared byte buffer backed by atomic 32-bit words.
//!
//! Bytes are packed little-endian into `AtomicU32` words, so every byte write
//! is a CAS on its containing word and every holder of a cloned buffer
//! observes the same memory. Cloning shares; [`SharedBuffer::deep_copy`]
//! allocates fresh storage.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use quorum_core::constants::ATOMIC_WORD_BYTES;
use quorum_core::errors::ViewError;
use quorum_core::Digest;

/// A fixed-length byte region safe for concurrent access.
#[derive(Clone)]
pub struct SharedBuffer {
    words: Arc<[AtomicU32]>,
    len: usize,
}

impl SharedBuffer {
    /// Allocate a zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        let word_slots = len.div_ceil(ATOMIC_WORD_BYTES);
        let words: Vec<AtomicU32> = (0..word_slots).map(|_| AtomicU32::new(0)).collect();
        Self {
            words: Arc::from(words),
            len,
        }
    }

    /// Allocate a buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let words: Vec<AtomicU32> = bytes
            .chunks(ATOMIC_WORD_BYTES)
            .map(|chunk| {
                let mut word = [0u8; ATOMIC_WORD_BYTES];
                word[..chunk.len()].copy_from_slice(chunk);
                AtomicU32::new(u32::from_le_bytes(word))
            })
            .collect();
        Self {
            words: Arc::from(words),
            len: bytes.len(),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of whole 32-bit words addressable by atomic operations.
    pub fn word_count(&self) -> usize {
        self.len / ATOMIC_WORD_BYTES
    }

    /// True if both handles point at the same storage.
    pub fn shares_storage(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.words, &other.words)
    }

    /// Independent copy with its own storage.
    pub fn deep_copy(&self) -> Self {
        Self::from_bytes(&self.to_vec())
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for word in self.words.iter() {
            out.extend_from_slice(&word.load(Ordering::SeqCst).to_le_bytes());
        }
        out.truncate(self.len);
        out
    }

    /// Digest of the current contents.
    pub fn digest(&self) -> Digest {
        Digest::of(&self.to_vec())
    }

    /// Read `width` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: usize, width: usize) -> Result<Vec<u8>, ViewError> {
        self.check_range(offset, width)?;
        Ok((offset..offset + width).map(|i| self.byte_at(i)).collect())
    }

    /// Overwrite bytes starting at `offset`.
    pub fn write_bytes(&self, offset: usize, bytes: &[u8]) -> Result<(), ViewError> {
        self.check_range(offset, bytes.len())?;
        for (i, &b) in bytes.iter().enumerate() {
            self.set_byte(offset + i, b);
        }
        Ok(())
    }

    /// Atomically load word `index`.
    pub fn load_word(&self, index: usize) -> Result<u32, ViewError> {
        Ok(self.word(index)?.load(Ordering::SeqCst))
    }

    /// Atomically store `value` into word `index`.
    pub fn store_word(&self, index: usize, value: u32) -> Result<(), ViewError> {
        self.word(index)?.store(value, Ordering::SeqCst);
        Ok(())
    }

    /// Compare-and-swap on word `index`. Returns the value observed before
    /// the operation; the swap happened iff it equals `expected`.
    pub fn compare_and_swap(&self, index: usize, expected: u32, new: u32) -> Result<u32, ViewError> {
        let word = self.word(index)?;
        Ok(match word.compare_exchange(expected, new, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(previous) | Err(previous) => previous,
        })
    }

    /// Atomically add to word `index` (wrapping). Returns the previous value.
    pub fn fetch_add(&self, index: usize, delta: u32) -> Result<u32, ViewError> {
        Ok(self.word(index)?.fetch_add(delta, Ordering::SeqCst))
    }

    fn word(&self, index: usize) -> Result<&AtomicU32, ViewError> {
        let words = self.word_count();
        if index >= words {
            return Err(ViewError::WordIndexOutOfRange { index, words });
        }
        Ok(&self.words[index])
    }

    fn check_range(&self, offset: usize, width: usize) -> Result<(), ViewError> {
        match offset.checked_add(width) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(ViewError::OutOfBounds {
                offset,
                width,
                len: self.len,
            }),
        }
    }

    fn byte_at(&self, i: usize) -> u8 {
        let shift = (i % ATOMIC_WORD_BYTES) * 8;
        (self.words[i / ATOMIC_WORD_BYTES].load(Ordering::SeqCst) >> shift) as u8
    }

    fn set_byte(&self, i: usize, value: u8) {
        let shift = (i % ATOMIC_WORD_BYTES) * 8;
        let mask = !(0xffu32 << shift);
        // The closure never returns None, so the update always lands.
        let _ = self.words[i / ATOMIC_WORD_BYTES].fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |word| Some((word & mask) | (u32::from(value) << shift)),
        );
    }
}

impl PartialEq for SharedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_vec() == other.to_vec()
    }
}

impl Eq for SharedBuffer {}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len)
            .field("digest", &self.digest())
            .finish()
    }
}

impl Serialize for SharedBuffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SharedBuffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Ok(Self::from_bytes(&bytes))
    }
}
