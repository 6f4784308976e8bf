//! Registry store layer.
//!
//! # Responsibility
//! - Define the data access contract for resources, teams and links.
//! - Isolate SQLite query details from the service and dispatcher layers.
//!
//! # Invariants
//! - Repository writes validate input before persistence.
//! - Repository APIs return semantic errors (`ResourceNotFound`,
//!   `TeamNotFound`) separately from DB transport errors.

pub mod registry_repo;
