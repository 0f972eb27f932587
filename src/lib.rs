//! Pix checkout server.
//!
//! Serves the BR Code payloads built by [`pix_types`] over HTTP: the store's admin
//! panel maintains the receiving key and merchant identity, and the storefront
//! requests a payload and QR image link for each order total.
//!
//! # Modules
//!
//! - [`auth`] - Bearer token check for configuration edits.
//! - [`config`] - Server configuration loaded from JSON, CLI and environment.
//! - [`handlers`] - HTTP endpoints under `/pix`.
//! - [`qr`] - Links to the external QR image renderer.
//! - [`run`] - Server startup and graceful shutdown.
//! - [`state`] - Shared, editable merchant configuration.
//! - [`util`] - Telemetry and signal handling.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod qr;
pub mod run;
pub mod state;
pub mod util;
