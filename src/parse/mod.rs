pub mod date_parser;
pub mod record;

pub use date_parser::*;
pub use record::*;
