//! Route handlers for the fleetpass API.

pub mod auth;
pub mod health;
pub mod pages;
