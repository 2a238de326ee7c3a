pub mod config;
pub mod remind;
pub mod task;
