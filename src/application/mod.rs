//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
mod session;

pub use assessment::{top_attributions, AssessmentService};
pub use session::SessionService;
