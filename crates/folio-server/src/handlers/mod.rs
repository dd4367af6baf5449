//! HTTP handlers.

pub mod components;
pub mod health;
pub mod metrics;
pub mod resolve;
