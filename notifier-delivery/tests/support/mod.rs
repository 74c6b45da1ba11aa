//! Shared helpers for the delivery integration tests
#![allow(dead_code)] // Not every helper is used by every test binary

pub mod doubles;
pub mod mock_provider;
