//! Common test utilities and helpers
//!
//! Stub executors, spawners and reporters shared by the integration tests.

#![allow(dead_code)]

pub mod mock_services;
pub mod test_helpers;
