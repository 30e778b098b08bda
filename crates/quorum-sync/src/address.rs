//! 128-bit routable node address.
//!
//! Layout, most significant bits first:
//!
//! | bits | field |
//! |---|---|
//! | 48 | routing prefix |
//! | 16 | subnet id |
//! | 32 | node id |
//! | 32 | logical clock |
//!
//! Text form is eight colon-separated groups of four lowercase hex digits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use quorum_core::constants::{ADDRESS_BITS, CLOCK_BITS, NODE_ID_BITS, ROUTING_PREFIX_BITS, SUBNET_BITS};
use quorum_core::errors::AddressError;

const ADDRESS_BYTES: usize = ADDRESS_BITS as usize / 8;
const PREFIX_MAX: u64 = (1u64 << ROUTING_PREFIX_BITS) - 1;
const CLOCK_SHIFT: u32 = 0;
const NODE_SHIFT: u32 = CLOCK_SHIFT + CLOCK_BITS;
const SUBNET_SHIFT: u32 = NODE_SHIFT + NODE_ID_BITS;
const PREFIX_SHIFT: u32 = SUBNET_SHIFT + SUBNET_BITS;

/// Decoded address components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressParts {
    pub prefix: u64,
    pub subnet: u16,
    pub node_id: u32,
    pub clock: u32,
}

/// Packed 128-bit node address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeAddress(u128);

impl NodeAddress {
    /// Pack components. Fails if `prefix` needs more than 48 bits.
    pub fn encode(prefix: u64, subnet: u16, node_id: u32, clock: u32) -> Result<Self, AddressError> {
        if prefix > PREFIX_MAX {
            return Err(AddressError::PrefixOverflow(prefix));
        }
        Ok(Self(
            (u128::from(prefix) << PREFIX_SHIFT)
                | (u128::from(subnet) << SUBNET_SHIFT)
                | (u128::from(node_id) << NODE_SHIFT)
                | (u128::from(clock) << CLOCK_SHIFT),
        ))
    }

    /// Pack components with a full-width logical timestamp.
    ///
    /// Timestamps beyond 32 bits are rejected rather than wrapped.
    pub fn for_timestamp(
        prefix: u64,
        subnet: u16,
        node_id: u32,
        timestamp: u64,
    ) -> Result<Self, AddressError> {
        let clock = u32::try_from(timestamp).map_err(|_| AddressError::ClockOverflow(timestamp))?;
        Self::encode(prefix, subnet, node_id, clock)
    }

    pub fn decode(&self) -> AddressParts {
        AddressParts {
            prefix: (self.0 >> PREFIX_SHIFT) as u64 & PREFIX_MAX,
            subnet: (self.0 >> SUBNET_SHIFT) as u16,
            node_id: (self.0 >> NODE_SHIFT) as u32,
            clock: (self.0 >> CLOCK_SHIFT) as u32,
        }
    }

    pub fn from_u128(raw: u128) -> Self {
        Self(raw)
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Parse exactly 16 big-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let array: [u8; ADDRESS_BYTES] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength {
                expected: ADDRESS_BYTES,
                actual: bytes.len(),
            })?;
        Ok(Self(u128::from_be_bytes(array)))
    }

    pub fn to_bytes(&self) -> [u8; ADDRESS_BYTES] {
        self.0.to_be_bytes()
    }

    pub fn prefix(&self) -> u64 {
        self.decode().prefix
    }

    pub fn node_id(&self) -> u32 {
        self.decode().node_id
    }

    pub fn clock(&self) -> u32 {
        self.decode().clock
    }

    /// Same address with the clock zeroed. Identifies a node across updates.
    pub fn without_clock(&self) -> Self {
        Self(self.0 & !u128::from(u32::MAX))
    }

    /// True if both addresses share a routing prefix.
    pub fn same_route(&self, other: &NodeAddress) -> bool {
        self.prefix() == other.prefix()
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        for (i, group) in bytes.chunks(2).enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}{:02x}", group[0], group[1])?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeAddress({self})")
    }
}

impl FromStr for NodeAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| AddressError::Malformed {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let groups: Vec<&str> = s.split(':').collect();
        if groups.len() != 8 {
            return Err(malformed("expected 8 groups"));
        }
        let mut raw: u128 = 0;
        for group in groups {
            if group.len() != 4 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed("each group must be 4 hex digits"));
            }
            let value = u16::from_str_radix(group, 16).map_err(|e| malformed(&e.to_string()))?;
            raw = (raw << 16) | u128::from(value);
        }
        Ok(Self(raw))
    }
}

impl Serialize for NodeAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_extremes() {
        let addr = NodeAddress::encode(PREFIX_MAX, u16::MAX, u32::MAX, u32::MAX).unwrap();
        assert_eq!(addr.as_u128(), u128::MAX);
        let parts = addr.decode();
        assert_eq!(parts.prefix, PREFIX_MAX);
        assert_eq!(parts.subnet, u16::MAX);
        assert_eq!(parts.node_id, u32::MAX);
        assert_eq!(parts.clock, u32::MAX);
    }

    #[test]
    fn prefix_overflow_rejected() {
        assert_eq!(
            NodeAddress::encode(1 << 48, 0, 0, 0),
            Err(AddressError::PrefixOverflow(1 << 48))
        );
    }

    #[test]
    fn clock_overflow_rejected() {
        let ts = u64::from(u32::MAX) + 1;
        assert_eq!(
            NodeAddress::for_timestamp(1, 0, 0, ts),
            Err(AddressError::ClockOverflow(ts))
        );
    }

    #[test]
    fn text_form_is_grouped_lowercase_hex() {
        let addr = NodeAddress::encode(0xfd00_0000_0000, 1, 0xabcd, 7).unwrap();
        let text = addr.to_string();
        assert_eq!(text, "fd00:0000:0000:0001:0000:abcd:0000:0007");
        assert_eq!(text.parse::<NodeAddress>().unwrap(), addr);
    }

    #[test]
    fn malformed_text_rejected() {
        for bad in ["", "fd00", "fd00:0:0:1:0:abcd:0:7", "zzzz:0000:0000:0001:0000:abcd:0000:0007"] {
            assert!(matches!(
                bad.parse::<NodeAddress>(),
                Err(AddressError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn bytes_must_be_sixteen() {
        assert_eq!(
            NodeAddress::from_bytes(&[0u8; 15]),
            Err(AddressError::InvalidLength {
                expected: 16,
                actual: 15
            })
        );
        let addr = NodeAddress::encode(3, 2, 1, 0).unwrap();
        assert_eq!(NodeAddress::from_bytes(&addr.to_bytes()).unwrap(), addr);
    }

    #[test]
    fn without_clock_keeps_route_and_node() {
        let a = NodeAddress::encode(5, 1, 9, 100).unwrap();
        let b = NodeAddress::encode(5, 1, 9, 3).unwrap();
        assert_eq!(a.without_clock(), b.without_clock());
        assert!(a.same_route(&b));
    }
}
