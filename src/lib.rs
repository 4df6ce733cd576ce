//! News Alert UI - web front end for a news aggregation and alerting backend
//!
//! This crate renders news, filter criteria, email alerts and alert history
//! served by a REST backend. Every page load and form submission goes through
//! a state container that calls the backend and records the outcome.

pub mod api;
pub mod config;
pub mod models;
pub mod routes;
pub mod store;
