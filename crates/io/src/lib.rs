#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod dumpfiles;
mod line_iterator;

pub use dumpfiles::*;
pub use line_iterator::*;
