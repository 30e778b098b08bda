//! Content-addressed multi-field snapshot chained to its predecessor.
//!
//! The root digest is `blake3(d_0 || d_1 || ... || d_n)` over the ordered
//! per-field digests. `previous_root` links each state to the one it was
//! derived from; genesis states point at [`Digest::GENESIS`].
//!
//! # Examples
//!
//! ```
//! use quorum_core::Digest;
//! use quorum_sync::block::{BlockState, ByteField};
//!
//! let genesis = BlockState::create(
//!     vec![ByteField::new("a", b"one"), ByteField::new("b", b"two")],
//!     None,
//! );
//! assert_eq!(genesis.previous_root(), Digest::GENESIS);
//!
//! let next = genesis.update_field("b", b"three").unwrap();
//! assert_eq!(next.previous_root(), genesis.root());
//! assert_eq!(next.timestamp(), 1);
//! assert_eq!(BlockState::reproduce_root(next.field_digests()), next.root());
//! ```

use serde::{Deserialize, Serialize};

use quorum_core::errors::StateError;
use quorum_core::Digest;

use super::field::ByteField;
use crate::view::{BinaryView, Lane};

/// Immutable snapshot of every field plus its digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    fields: Vec<ByteField>,
    field_digests: Vec<Digest>,
    root: Digest,
    previous_root: Digest,
    timestamp: u64,
}

impl BlockState {
    /// Build a timestamp-0 state. `previous` defaults to the genesis sentinel.
    pub fn create(fields: Vec<ByteField>, previous: Option<Digest>) -> Self {
        Self::with_fields(fields, previous.unwrap_or(Digest::GENESIS), 0)
    }

    /// Build a state from a complete field set at an explicit timestamp.
    pub fn with_fields(fields: Vec<ByteField>, previous_root: Digest, timestamp: u64) -> Self {
        let field_digests: Vec<Digest> = fields.iter().map(ByteField::digest).collect();
        let root = Self::reproduce_root(&field_digests);
        Self {
            fields,
            field_digests,
            root,
            previous_root,
            timestamp,
        }
    }

    /// Recompute a root from ordered per-field digests.
    pub fn reproduce_root(digests: &[Digest]) -> Digest {
        Digest::combine(digests)
    }

    /// Successor with exactly one field replaced.
    ///
    /// The timestamp advances by one, the root is recomputed over all
    /// fields, and `previous_root` becomes this state's root.
    pub fn update_field(&self, name: &str, bytes: &[u8]) -> Result<BlockState, StateError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| StateError::UnknownField(name.to_string()))?;
        let timestamp = self
            .timestamp
            .checked_add(1)
            .ok_or(StateError::ClockExhausted(self.timestamp))?;

        let mut fields = self.fields.clone();
        fields[index] = ByteField::new(name, bytes);
        let mut field_digests = self.field_digests.clone();
        field_digests[index] = fields[index].digest();
        let root = Self::reproduce_root(&field_digests);

        Ok(Self {
            fields,
            field_digests,
            root,
            previous_root: self.root,
            timestamp,
        })
    }

    /// Check stored digests against the live bytes and the stored root.
    pub fn verify(&self) -> Result<(), StateError> {
        if self.fields.len() != self.field_digests.len() {
            return Err(self.inconsistent(format!(
                "{} fields but {} digests",
                self.fields.len(),
                self.field_digests.len()
            )));
        }
        for (field, stored) in self.fields.iter().zip(&self.field_digests) {
            if field.digest() != *stored {
                return Err(self.inconsistent(format!(
                    "field {:?} bytes do not match stored digest",
                    field.name()
                )));
            }
        }
        if Self::reproduce_root(&self.field_digests) != self.root {
            return Err(self.inconsistent("stored digests do not reproduce root".to_string()));
        }
        Ok(())
    }

    /// Names of fields whose digests differ from `other` (position-wise).
    pub fn changed_fields(&self, other: &BlockState) -> Vec<String> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(i, field)| {
                other.fields.get(*i).map(ByteField::name) != Some(field.name())
                    || other.field_digests.get(*i) != self.field_digests.get(*i)
            })
            .map(|(_, field)| field.name().to_string())
            .collect()
    }

    pub fn fields(&self) -> &[ByteField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ByteField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.field(name).map(ByteField::bytes)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(ByteField::name).collect()
    }

    pub fn field_digests(&self) -> &[Digest] {
        &self.field_digests
    }

    pub fn root(&self) -> Digest {
        self.root
    }

    pub fn previous_root(&self) -> Digest {
        self.previous_root
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_root.is_genesis()
    }

    /// Typed view over one field's bytes.
    pub fn view<L: Lane>(&self, name: &str) -> Result<BinaryView<'_, L>, StateError> {
        self.field(name)
            .map(ByteField::view)
            .ok_or_else(|| StateError::UnknownField(name.to_string()))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    fn inconsistent(&self, details: String) -> StateError {
        StateError::Consistency {
            root: self.root.to_hex(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Endian;

    fn sample() -> BlockState {
        BlockState::create(
            vec![
                ByteField::new("a", &[1, 2, 3, 4]),
                ByteField::new("b", &[5, 6, 7, 8]),
                ByteField::new("c", &[]),
            ],
            None,
        )
    }

    #[test]
    fn update_recomputes_only_target_digest() {
        let s0 = sample();
        let s1 = s0.update_field("b", &[0]).unwrap();
        assert_eq!(s1.field_digests()[0], s0.field_digests()[0]);
        assert_ne!(s1.field_digests()[1], s0.field_digests()[1]);
        assert_eq!(s1.field_digests()[2], s0.field_digests()[2]);
        assert_ne!(s1.root(), s0.root());
        assert_eq!(s1.changed_fields(&s0), vec!["b".to_string()]);
    }

    #[test]
    fn update_unknown_field_fails_without_side_effects() {
        let s0 = sample();
        let before = s0.clone();
        assert_eq!(
            s0.update_field("zzz", &[1]),
            Err(StateError::UnknownField("zzz".to_string()))
        );
        assert_eq!(s0, before);
    }

    #[test]
    fn field_order_is_part_of_root() {
        let ab = BlockState::create(
            vec![ByteField::new("a", b"x"), ByteField::new("b", b"y")],
            None,
        );
        let ba = BlockState::create(
            vec![ByteField::new("a", b"y"), ByteField::new("b", b"x")],
            None,
        );
        assert_ne!(ab.root(), ba.root());
    }

    #[test]
    fn successors_do_not_alias_fields() {
        let s0 = sample();
        let s1 = s0.update_field("c", &[9]).unwrap();
        assert!(!s0.fields()[0].buffer().shares_storage(s1.fields()[0].buffer()));
    }

    #[test]
    fn in_place_write_is_detected_by_verify() {
        let s0 = sample();
        assert!(s0.verify().is_ok());
        let view = s0.view::<u16>("a").unwrap();
        view.write(0, 0xffff, Endian::Little).unwrap();
        let err = s0.verify().unwrap_err();
        assert!(matches!(err, StateError::Consistency { .. }));
    }

    #[test]
    fn tampered_digest_is_detected() {
        let s0 = sample();
        let mut json: serde_json::Value = serde_json::to_value(&s0).unwrap();
        json["root"] = serde_json::Value::String(Digest::of(b"forged").to_hex());
        let forged: BlockState = serde_json::from_value(json).unwrap();
        assert!(forged.verify().is_err());
    }
}
