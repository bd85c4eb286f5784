//! Domain types for the dcx compose facade.
//!
//! - [`depth`] - the [`MaxDepth`] recursion bound
//! - [`project`] - the [`ProjectRegistry`] and [`ProjectCollision`]
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use dcx_core::{MaxDepth, ProjectRegistry};
//! ```

pub mod depth;
pub mod project;

pub use depth::MaxDepth;
pub use project::{ProjectCollision, ProjectRegistry};
