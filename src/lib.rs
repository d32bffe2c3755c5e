pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod indicator;
pub mod input;
pub mod market;
pub mod model;
pub mod session;
pub mod state_store;
pub mod trial;
pub mod ui;
