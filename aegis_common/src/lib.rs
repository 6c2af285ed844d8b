//! Aegis Common Library
//!
//! Shared primitives with no domain logic of their own: the NED velocity
//! command type, the canonical signal-channel layout, process-wide numeric
//! defaults, the plain-text `NAME VALUE` configuration loader, and the
//! supervisor-wide error taxonomy. Everything in [`crate::coordinator`]-
//! and [`crate::enforcer`]-shaped code (in `aegis_core`) builds on these.
//!
//! # Module Structure
//!
//! - [`types`] — `VelocityNedYaw` and the canonical signal channel set.
//! - [`consts`] — numeric defaults mirroring the original configuration globals.
//! - [`config`] — `GlobalConfig` plain-text loader and validator.
//! - [`error`] — `SupervisorError` taxonomy.
//! - [`prelude`] — common re-exports for convenience.
//!
//! # Usage
//!
//! ```rust
//! use aegis_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod error;
pub mod prelude;
pub mod types;
