mod create;
mod delete;
mod feed;
mod likes;

pub use create::create;
pub use delete::delete;
pub use feed::feed;
pub use likes::{like, unlike};
