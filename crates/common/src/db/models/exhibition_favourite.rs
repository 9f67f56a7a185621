//! Exhibition membership (join between exhibitions and favourites)
//!
//! `position` orders artworks inside an exhibition. The store rejects a
//! second row for the same (exhibition, favourite) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exhibition_favourites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub exhibition_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false)]
    pub favourite_id: Uuid,

    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exhibition::Entity",
        from = "Column::ExhibitionId",
        to = "super::exhibition::Column::Id",
        on_delete = "Cascade"
    )]
    Exhibition,

    #[sea_orm(
        belongs_to = "super::favourite::Entity",
        from = "Column::FavouriteId",
        to = "super::favourite::Column::Id",
        on_delete = "Cascade"
    )]
    Favourite,
}

impl Related<super::exhibition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exhibition.def()
    }
}

impl Related<super::favourite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favourite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
