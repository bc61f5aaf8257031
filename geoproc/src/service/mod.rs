//! Service facade.
//!
//! Wires the registry, result store, resolver chain, scheduler, and
//! dispatcher together, and owns the background daemons (scheduler run
//! loop, wiping sweep) behind one shutdown token.

mod error;
mod facade;

pub use error::ServiceError;
pub use facade::{ProcessingService, ServiceBuilder};
