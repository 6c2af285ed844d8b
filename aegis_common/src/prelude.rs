//! Prelude module for common re-exports.
//!
//! ```rust
//! use aegis_common::prelude::*;
//! ```

pub use crate::config::GlobalConfig;
pub use crate::error::SupervisorError;
pub use crate::types::{VelocityNedYaw, EPSILON_DENOMINATOR, SIGNAL_CHANNELS};
