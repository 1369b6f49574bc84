//! Constants used while importing member annotations and resolving indices.

/// Placeholder prefix that display-format strings wrap around their pattern.
pub const C_FORMAT_PLACEHOLDER_PREFIX: &str = "{0:";
/// Closing brace that display-format strings wrap around their pattern.
pub const C_FORMAT_PLACEHOLDER_SUFFIX: &str = "}";
/// First column probed by automatic index resolution.
pub const N_AUTO_INDEX_SEED: usize = 0;
