pub mod adapter;
pub mod config;
pub mod engine;
pub mod limits;
pub mod memory;
pub mod model;
pub mod notify;
pub mod observability;
pub mod ports;
