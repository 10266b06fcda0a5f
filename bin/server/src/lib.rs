//! Web server for the guildgate verification and provisioning pipeline.
//!
//! The server exposes the OAuth verification flow under `/auth` and the
//! administrator surface under `/dashboard`. All routes are enumerated
//! statically in [`app::router`]; there is no dynamic handler discovery.

pub mod app;
pub mod auth;
pub mod autorole;
pub mod config;
pub mod dashboard;
pub mod provision;

#[cfg(test)]
pub(crate) mod test_support;
