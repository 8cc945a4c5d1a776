//! HTTP handlers

mod account;
mod health;
mod well_known;

pub use account::{admin, me};
pub use health::{health, ready};
pub use well_known::{jwks, openid_configuration};
