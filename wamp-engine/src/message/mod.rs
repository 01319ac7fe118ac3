pub mod common;
pub mod message;
pub mod wire;
