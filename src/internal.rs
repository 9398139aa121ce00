/// Restricts implementations of public marker traits to this crate.
pub trait Sealed {}
