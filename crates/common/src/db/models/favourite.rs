//! Favourite entity
//!
//! Display fields are copied from the unified artwork at save time so the
//! favourites list never has to go back to the museum API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favourites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    /// Unified artwork id, e.g. "met-12345"
    pub object_id: String,

    pub provider: String,

    pub title: String,

    pub artist: String,

    pub image_url: String,

    pub artwork_url: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exhibition_favourite::Entity")]
    ExhibitionFavourite,
}

impl Related<super::exhibition_favourite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExhibitionFavourite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
