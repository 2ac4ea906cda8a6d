//! Database Models

pub mod favorite;
pub mod listing;
pub mod photo;
pub mod profile;
pub mod serde_helpers;
pub mod user;

pub use favorite::{Favorite, FavoriteId};
pub use listing::{
    FinancingType, Listing, ListingCreate, ListingId, ListingStatus, ListingUpdate, OperationType,
};
pub use photo::{Photo, PhotoId, PhotoInput, select_cover};
pub use profile::{Profile, ProfileId, ProfileUpdate, SubscriptionPatch, SubscriptionStatus};
pub use user::{User, UserCreate, UserId, UserIdentityUpdate, UserInfo};
