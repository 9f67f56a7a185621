//! SeaORM entity models
//!
//! Tables owned by the hosted database; this service only reads and writes rows.

mod exhibition;
mod exhibition_favourite;
mod favourite;
mod profile;

pub use profile::{
    Entity as ProfileEntity,
    Model as Profile,
    ActiveModel as ProfileActiveModel,
    Column as ProfileColumn,
};

pub use favourite::{
    Entity as FavouriteEntity,
    Model as Favourite,
    ActiveModel as FavouriteActiveModel,
    Column as FavouriteColumn,
};

pub use exhibition::{
    Entity as ExhibitionEntity,
    Model as Exhibition,
    ActiveModel as ExhibitionActiveModel,
    Column as ExhibitionColumn,
};

pub use exhibition_favourite::{
    Entity as ExhibitionFavouriteEntity,
    Model as ExhibitionFavourite,
    ActiveModel as ExhibitionFavouriteActiveModel,
    Column as ExhibitionFavouriteColumn,
};
