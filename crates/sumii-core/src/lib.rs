pub mod config;
pub mod error;
pub mod ids;

pub use config::SumiiConfig;
pub use error::{ErrorKind, Result, SumiiError};
