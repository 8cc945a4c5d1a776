//! Common test utilities for warden-axum router tests

#![allow(dead_code)]


pub use jwks_mock::{primary_jwk, JwksMockServer, TestClaims, TestKeyPair};
