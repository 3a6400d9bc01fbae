//! Catalog site library.
//!
//! Client side of a course-catalog and blog website: typed access to the
//! content and admin backends, the fetch-and-render contract shared by every
//! content page, the admin session gate, backend keep-alive pings, and the
//! routing rules applied by the edge server.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod api;
pub mod blog;
pub mod config;
pub mod constants;
pub mod content;
pub mod course;
pub mod health;
pub mod render;
pub mod routing;
pub mod session;
pub mod view;
pub mod web;
