#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod error;
mod test_logger;

pub use error::*;
pub use random_test::*;
pub use test_logger::*;
