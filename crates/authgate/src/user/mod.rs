//! User store module.
//!
//! Persists user records and owns signup validation, password hashing, and
//! refresh-token bookkeeping.

mod models;
mod repository;
mod service;

pub use models::{SignupRequest, User, UserInfo};
pub use repository::UserRepository;
pub use service::{UserError, UserService};
