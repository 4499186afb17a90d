//! panctl - Policy object console
//!
//! Checks and creates firewall policy objects (address/service objects and
//! groups, security rules) against a Panorama-style policy backend.
//!
//! # Architecture
//!
//! - [`validators`] - Address, port and name validation
//! - [`core`] - Policy object types, device-group hierarchy, rule resolution
//! - [`api`] - REST client for the policy backend
//! - [`audit`] - Audit trail of create requests
//! - [`config`] - Configuration persistence
//! - [`utils`] - Utility functions (XDG directories, etc.)
//!
//! The backend owns all state. Everything here is validation, request
//! shaping and presentation.

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod audit;
pub mod config;
pub mod core;
pub mod theme;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use api::BackendClient;
pub use core::error::{Error, Result};
