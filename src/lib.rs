pub mod action_log;
pub mod app;
pub mod config;
pub mod error;
pub mod panel;
pub mod persistence;
pub mod registry;
pub mod sim;
pub mod ui;
pub mod vehicle;
