//! :rocket: The reservation backend.
//!
//! The system consists of the [database], which owns settings, inventory and
//! claims and runs the atomic claim and reset operations, [auth], which keeps
//! admin sessions, and the [balancer], which routes every request to them.

#![allow(rustdoc::private_intra_doc_links)]
use std::time::Duration;

use shot_reserve_core::Config;

mod auth;
mod balancer;
mod database;

pub use auth::Auth;
pub use balancer::Balancer;
pub use database::Database;

/// Entrypoint of the backend
///
/// Constructs a balancer which is served requests by the surrounding
/// infrastructure (HTTP server or test harness).
pub fn launch(config: &Config) -> Balancer {
    let database = Database::new(config);
    let auth = Auth::new(
        config.admins.clone(),
        Duration::from_secs(config.session_ttl),
    );
    tracing::info!(
        habu = config.inventory.habu,
        tequila = config.inventory.tequila,
        admins = config.admins.len(),
        "reservation system launched"
    );
    Balancer::new(database, auth)
}
