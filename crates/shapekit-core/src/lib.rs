//! # ShapeKit Core
//!
//! Core types and utilities for ShapeKit.
//! Provides the geometric primitives shared by every crate in the workspace,
//! the error taxonomy, and the single-threaded sharing aliases used for
//! listener registration.

pub mod data;
pub mod error;
pub mod types;

pub use data::{Bounds, Point, Size};
pub use error::{ShapeError, ShapeResult};
pub use types::{shared, Listener, Shared, SharedVec};
