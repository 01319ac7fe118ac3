pub mod auth_method;
pub mod challenge_response;
pub mod channel_binding;
pub mod keyring;
pub mod scram;
pub mod ticket;
