//! Data types, split by where they are used.
//!
//! - [`api`] types cross the HTTP boundary.
//! - [`db`] types are stored in the issue store.
//! - [`common`] types are shared by both.
//! - [`mongodb`] holds the database plumbing.

pub mod api;
pub mod common;
pub mod db;
pub mod mongodb;
