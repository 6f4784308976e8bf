//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the command dispatcher decoupled from storage details.

pub mod registry_service;
