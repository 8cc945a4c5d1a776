//! Common test utilities for identity-api router tests

#![allow(dead_code)]


pub use jwks_mock::{primary_jwk, JwksMockServer, TestClaims, TestKeyPair};
