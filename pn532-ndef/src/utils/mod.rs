//! Small, reusable helpers used across the crate: hex rendering for
//! diagnostics and timeout constants/conversions.

pub mod hex;
pub mod timeout;

// Re-export the most common helpers at the `utils` module level so callers
// can use `crate::utils::bytes_to_hex(...)` etc if they prefer.
pub use hex::*;
pub use timeout::*;
