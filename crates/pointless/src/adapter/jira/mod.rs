//! Jira story source.
//!
//! Reads issues through the Jira Cloud REST API v3:
//!
//! - `GET /rest/api/3/issue/{id}` for title, type, description and comments
//! - `GET /rest/api/3/field/search?query=point&startAt={n}` to discover which
//!   custom fields may hold story points on this instance
//!
//! ## Authentication
//!
//! The adapter sends a full `Authorization` header value, either from the
//! [`JiraConfig`](crate::JiraConfig) defaults or from the location itself.

pub mod adf;
mod client;
mod models;

pub use client::JiraAdapter;
pub use models::*;
