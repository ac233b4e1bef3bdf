//! HTTP client for the asset manager APIs.
//!
//! Wraps the multipart upload protocol (create, part, complete, abort) and
//! the read-only metadata endpoints (organizations, projects, health) with
//! uniform timeout, auth-header and response classification rules.

pub mod client;

pub use client::{Client, ClientConfig, Error};
