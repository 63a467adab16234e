pub mod analysis;
pub mod config;
pub mod error;
pub mod geo;
pub mod loader;
pub mod resolver;
pub mod schedule;
pub mod scorer;
// cmd and reports belong to the binary (see main.rs).
