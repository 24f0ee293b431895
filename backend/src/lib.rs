//! Dogcal backend library.
//!
//! A scheduling service coordinating dog-care hangouts between pup owners
//! and trusted friends: owners create pups and time slots, friends volunteer
//! or suggest alternates, owners decide, and WhatsApp notifications follow
//! each lifecycle transition.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
