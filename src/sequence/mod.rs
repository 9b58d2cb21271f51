// Report number generation

mod cities;
mod error;
mod generator;

pub use cities::*;
pub use error::*;
pub use generator::*;
