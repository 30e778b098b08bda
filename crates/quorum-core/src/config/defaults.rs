// Single source of truth for all default values.

// --- Node ---
pub const DEFAULT_ROUTING_PREFIX: u64 = 0xfd00_0000_0000;
pub const DEFAULT_SUBNET: u16 = 1;

// --- Schema ---
pub const DEFAULT_FIELDS: [&str; 5] = ["header", "payload", "metadata", "index", "link"];
pub const DEFAULT_TRIANGLE: [&str; 3] = ["header", "payload", "metadata"];
pub const DEFAULT_LINK_FIELD: &str = "link";
pub const DEFAULT_HYPEREDGE_SIZE: usize = 2;

// --- Merge ---
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.85;
pub const DEFAULT_LEARNING_RATE: f64 = 0.05;
pub const DEFAULT_ACTIVATION_EPSILON: f64 = 1e-6;
pub const DEFAULT_MAX_ACTIVATION_ITERATIONS: usize = 32;

// --- Router ---
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 10_000;
pub const DEFAULT_START_ONLINE: bool = true;
pub const DEFAULT_ANCESTRY_WINDOW: usize = 1024;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
