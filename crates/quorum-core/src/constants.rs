// Protocol-level constants shared across crates.

/// Hard upper bound on the convergence-step cost reported by any strategy.
/// Callers size timeouts and backoff against this value.
pub const MAX_CONVERGENCE_STEPS: u8 = 14;

/// Width in bytes of the words addressed by atomic buffer operations.
pub const ATOMIC_WORD_BYTES: usize = 4;

/// Width in bytes of every content digest.
pub const DIGEST_BYTES: usize = 32;

/// Total width of a node address in bits.
pub const ADDRESS_BITS: u32 = 128;

/// Address sub-field widths, most significant first.
pub const ROUTING_PREFIX_BITS: u32 = 48;
pub const SUBNET_BITS: u32 = 16;
pub const NODE_ID_BITS: u32 = 32;
pub const CLOCK_BITS: u32 = 32;

/// Minimum number of fields a schema must carry (the triangle needs three).
pub const MIN_SCHEMA_FIELDS: usize = 3;

/// Version tag written into exported state.
pub const STATE_FORMAT_VERSION: u32 = 1;
