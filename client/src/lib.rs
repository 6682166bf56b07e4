//! Client of the property listings server, keeping the search filters and
//! the cached query results of a browsing session.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod cache;
pub mod config;
pub mod confirm;
pub mod error;
pub mod filters;
pub mod model;
pub mod notify;
pub mod store;

pub use self::{
    api::{Api, Http},
    cache::Cache,
    config::Config,
    confirm::Confirm,
    error::Error,
    filters::{FiltersUpdate, Patch, SearchFilters},
    notify::Notification,
    store::{Deletion, Failed, Query, Store},
};
