//! Common type definitions.

/// Numeric user identifier, assigned by the store on creation
pub type UserId = i64;
