//! Green Earth Core - storefront state without I/O.
//!
//! This crate holds the state a single page session mutates while a shopper
//! browses the plant catalog:
//! - [`cart`] - the in-memory shopping cart
//! - [`selection`] - the active category filter and its request tokens
//! - [`menu`] - mobile navigation menu visibility
//!
//! # Architecture
//!
//! Everything here is plain data and total functions. Fetching the catalog,
//! rendering and session lifetime belong to the `storefront` crate, which
//! drives these stores and renders their snapshots.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and prices
//! - [`catalog`] - Read-only product and category records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod menu;
pub mod selection;
pub mod types;

pub use cart::{CartEvent, CartLineItem, CartStore};
pub use catalog::{Category, Product, category_slug};
pub use menu::MenuVisibility;
pub use selection::{
    CategorySelection, CategorySelectionState, SelectionParseError, SelectionToken, StaleResponse,
};
pub use types::*;
