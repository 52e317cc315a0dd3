pub mod ambient;
pub mod cli;
pub mod commands;
pub mod config;
pub mod credits;
pub mod display;
pub mod install;
pub mod reset;
pub mod store;
