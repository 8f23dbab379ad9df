pub mod grid;
pub mod records;
pub mod runner;
