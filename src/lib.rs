//! HRM leave & coverage service: leave lifecycle, balances, conflict snapshots
//! and substitute coverage behind an actix-web API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod leave;
pub mod model;
pub mod routes;
pub mod store;
