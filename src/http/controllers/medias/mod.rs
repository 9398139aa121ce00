mod upload;

pub use upload::upload;
