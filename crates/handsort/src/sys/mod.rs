pub mod journal;
pub mod narrator;
pub mod runtime;
pub mod server;
pub mod tracker;
