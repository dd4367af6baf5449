//! Test helpers for folio-server.

#![allow(dead_code, unused_imports)]

pub mod catalog;
pub mod client;

pub use catalog::sample_catalog;
pub use client::{TestClient, TestResponse, client, router};
