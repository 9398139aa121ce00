mod follow;
mod profile;

pub use follow::{follow, unfollow};
pub use profile::{me, profile};
