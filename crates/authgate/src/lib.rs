//! Authgate library.
//!
//! Provides the core components of the authentication service: the HTTP API,
//! token issuance, configuration, and the durable user store.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod user;
