pub mod feed;
pub mod follow;
pub mod like;
pub mod media;
pub mod tweet;
pub mod user;

pub use follow::Follow;
pub use like::Like;
pub use media::Media;
pub use tweet::Tweet;
pub use user::{User, UserView};
