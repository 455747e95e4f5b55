pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod handlers;
pub mod infrastructure;
pub mod worker;
