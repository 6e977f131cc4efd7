//! Expression builders.
//!
//! Each builder here assembles a single SQL expression (or, for window
//! functions, a complete SELECT) from already-gathered user selections. They
//! validate identifiers and sanitize free-text fragments, and they never
//! execute anything.

mod case;
mod scalar;
mod window;

pub use case::CaseExpr;
pub use scalar::{build_coalesce, build_nullif};
pub use window::{SortDir, WindowKind, WindowQuery};

#[cfg(test)]
mod tests;
