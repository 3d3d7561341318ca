//! Green Earth storefront library.
//!
//! Serves the tree nursery storefront as a JSON API: a page opens a session,
//! browses the catalog by category and keeps its cart in that session.
//! The crate is a library so the router can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
