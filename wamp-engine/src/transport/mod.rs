pub mod config;
pub mod connector;
pub mod direct_transport;
pub mod registry;
pub mod transport;
