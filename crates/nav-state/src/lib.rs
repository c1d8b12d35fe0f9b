//! Navigation stack state for the stack navigator
//!
//! This crate holds the pure data model: routes, route keys and the
//! ordered stack with its active index. It performs no I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod route;
pub mod stack;

pub use route::{params, KeyGenerator, Params, Route};
pub use stack::{RouteStack, StackError, StackState};
