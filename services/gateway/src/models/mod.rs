//! Gateway models

pub mod artist;
pub mod favorite;
pub mod user;

// Re-export for convenience
pub use artist::{ArtistDetail, ArtistSummary, Artwork, Gene};
pub use favorite::{Favorite, FavoriteRequest};
pub use user::{LoginRequest, NewUser, RegisterRequest, User, UserView};
