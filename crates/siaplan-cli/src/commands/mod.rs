pub mod generate;
pub mod parse;
pub mod schedule;
pub mod settings;
