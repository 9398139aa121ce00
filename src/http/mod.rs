pub mod actor;
pub mod controllers;
pub mod error;

pub use actor::Actor;
pub use error::Error;
