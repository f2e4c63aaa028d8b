//! Voiceline backend library.
//!
//! Hexagonal layout: [`domain`] holds entities, services and ports;
//! [`outbound`] implements the driven ports; [`inbound`] exposes the HTTP API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
