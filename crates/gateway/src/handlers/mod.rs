//! API handlers module

pub mod artworks;
pub mod exhibitions;
pub mod favourites;
pub mod health;
pub mod profile;
pub mod search;
pub mod session;
