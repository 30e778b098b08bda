//! Fixed-width element types readable through a [`BinaryView`](super::BinaryView).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte order used for element reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// A numeric element of fixed byte width.
pub trait Lane: Copy + PartialEq + fmt::Debug {
    /// Width in bytes.
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` bytes.
    fn decode(bytes: &[u8], endian: Endian) -> Self;

    /// Encode into exactly `WIDTH` bytes.
    fn encode(&self, endian: Endian) -> Vec<u8>;

    /// Width in bits.
    fn bits() -> usize {
        Self::WIDTH * 8
    }
}

macro_rules! impl_lane {
    ($($ty:ty),*) => {
        $(
            impl Lane for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn decode(bytes: &[u8], endian: Endian) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    match endian {
                        Endian::Little => <$ty>::from_le_bytes(raw),
                        Endian::Big => <$ty>::from_be_bytes(raw),
                    }
                }

                fn encode(&self, endian: Endian) -> Vec<u8> {
                    match endian {
                        Endian::Little => self.to_le_bytes().to_vec(),
                        Endian::Big => self.to_be_bytes().to_vec(),
                    }
                }
            }
        )*
    };
}

impl_lane!(u16, u32, u64, u128);

/// 256-bit unsigned element, stored most-significant byte first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct U256(pub [u8; 32]);

impl U256 {
    pub const ZERO: U256 = U256([0u8; 32]);

    /// Big-endian byte representation.
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Low 128 bits.
    pub fn low_u128(self) -> u128 {
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        u128::from_be_bytes(low)
    }

    /// High 128 bits.
    pub fn high_u128(self) -> u128 {
        let mut high = [0u8; 16];
        high.copy_from_slice(&self.0[..16]);
        u128::from_be_bytes(high)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256(0x{:032x}{:032x})", self.high_u128(), self.low_u128())
    }
}

impl Lane for U256 {
    const WIDTH: usize = 32;

    fn decode(bytes: &[u8], endian: Endian) -> Self {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(bytes);
        if endian == Endian::Little {
            raw.reverse();
        }
        Self(raw)
    }

    fn encode(&self, endian: Endian) -> Vec<u8> {
        let mut raw = self.0.to_vec();
        if endian == Endian::Little {
            raw.reverse();
        }
        raw
    }
}
