//! Registry domain model: resources, teams and the links between them.
//!
//! # Responsibility
//! - Define the row shapes returned by the registry store.
//! - Own the input validation rules applied before any write.
//!
//! # Invariants
//! - Every entity is identified by an integer surrogate key assigned by the
//!   store; callers address entities by name.
//! - A link always references one existing resource and one existing team.

pub mod link;
pub mod resource;
pub mod team;
pub mod validation;
