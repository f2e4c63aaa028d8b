//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers depend only on the driving ports held in [`state::HttpState`];
//! domain errors become JSON responses through [`error`].

pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod secrets_config;
pub mod state;
pub mod transcriptions;
pub mod users;

pub use error::ApiResult;
