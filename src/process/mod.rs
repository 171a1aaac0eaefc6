//! Converter process execution: spawn, enforce a timeout, and terminate the
//! whole process group rather than just the direct child.

mod error;
mod exec;

pub use error::{ProcessError, Result};
pub use exec::{run_with_timeout, Outcome};
