pub mod figment;

mod sensitive;
pub use sensitive::Sensitive;
