pub mod config;
pub mod error;
pub mod logging;
pub mod metamodel;
pub mod routes;
pub mod state;
pub mod test_helpers;
pub mod typegraph;
