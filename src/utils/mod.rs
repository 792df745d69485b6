//! Shared helpers

pub mod secret;
