pub mod client;
pub mod event;
pub mod interrupt;
pub mod invocation;
pub mod options;
pub mod procedure;
pub mod session;
