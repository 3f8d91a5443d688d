//! Low-level primitives shared by the splice planner: errors, mmap, and the
//! futex-based wait used by the partition countdown latch.

pub mod error;
pub mod mmap;
pub mod wait;

pub use error::{Error, Result};
