#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog;
pub mod file;
pub mod memory;
pub mod model;

pub use catalog::StaticCatalog;
pub use file::FileStorage;
pub use memory::{FixedClock, InMemoryStorage, SystemClock};
