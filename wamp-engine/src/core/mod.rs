pub mod cancel;
pub mod error;
pub mod hash;
pub mod id;
pub mod stream;
