//! Core types for Pitchcraft.

pub mod ads;
pub mod form;
pub mod request;
pub mod stream;

pub use ads::*;
pub use form::*;
pub use request::*;
pub use stream::*;
