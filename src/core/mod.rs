//! Core policy-object functionality
//!
//! - [`objects`]: Address/service objects and groups, rule enums, profiles
//! - [`hierarchy`]: Device-group tree builder and row renderer
//! - [`rules`]: Rule drafts and resolution of address/service references
//! - [`error`]: Error taxonomy and user-facing translations

pub mod error;
pub mod hierarchy;
pub mod objects;
pub mod rules;
