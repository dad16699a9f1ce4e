pub mod config;
pub mod poll;
pub mod seen;
