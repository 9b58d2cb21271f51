// Utils module

mod env;
mod file_name;
mod string_compare_secure;

pub use env::*;
pub use file_name::*;
pub use string_compare_secure::*;
