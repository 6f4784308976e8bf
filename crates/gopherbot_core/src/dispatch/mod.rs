//! Chat command surface.
//!
//! # Responsibility
//! - Parse addressed chat text into a command line.
//! - Route `res`/`tag` subcommands to registry operations after arity checks.
//! - Render every outcome, including not-found and bad input, as reply text.
//!
//! # Invariants
//! - Stateless: each call is independent of the previous ones.
//! - Only store failures escape as errors; everything else is a reply.

pub mod command;
pub mod dispatcher;
pub mod reply;
