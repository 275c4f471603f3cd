pub mod catalog;
pub mod control;
pub mod geometry;
pub mod macros;
