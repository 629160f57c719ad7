//! Core types and trait definitions for the Registrar school-records service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! grade and attendance engines here are pure reductions over record sets;
//! [`report`] composes them with reads through a [`store::RecordStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attendance;
pub mod error;
pub mod grade;
pub mod identity;
pub mod report;
pub mod roster;
pub mod store;

pub use error::{Error, Result};
