//! Repository pattern for database operations
//!
//! Provides a clean interface for profile, favourite and exhibition data
//! with proper error handling and transaction support.

use crate::artwork::UnifiedArtwork;
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::metrics;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Shown when a favourite is already part of an exhibition
pub const DUPLICATE_MEMBERSHIP_MESSAGE: &str = "Failed to add. It might already be in the exhibition.";

/// Shown when an artwork is already a favourite
pub const DUPLICATE_FAVOURITE_MESSAGE: &str = "This artwork is already in your favourites.";

/// Exhibition with the data needed to render a card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionSummary {
    #[serde(flatten)]
    pub exhibition: Exhibition,
    pub thumbnail: Option<String>,
    pub artwork_count: usize,
}

/// Favourite placed in an exhibition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionArtwork {
    pub position: i32,
    pub favourite: Favourite,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Profile Operations
    // ========================================================================

    /// Find a user's profile, if one was ever saved
    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        ProfileEntity::find_by_id(user_id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Create or replace a user's display name
    pub async fn upsert_profile(&self, user_id: Uuid, display_name: &str) -> Result<Profile> {
        let profile = ProfileActiveModel {
            id: Set(user_id),
            display_name: Set(Some(display_name.to_string())),
            updated_at: Set(chrono::Utc::now().into()),
        };

        let result = ProfileEntity::insert(profile)
            .on_conflict(
                OnConflict::column(ProfileColumn::Id)
                    .update_columns([ProfileColumn::DisplayName, ProfileColumn::UpdatedAt])
                    .to_owned(),
            )
            .exec_with_returning(self.write_conn())
            .await
            .map_err(Into::into);

        metrics::record_persistence("upsert_profile", result.is_ok());
        result
    }

    // ========================================================================
    // Favourite Operations
    // ========================================================================

    /// List a user's favourites, newest first
    pub async fn list_favourites(&self, user_id: Uuid) -> Result<Vec<Favourite>> {
        FavouriteEntity::find()
            .filter(FavouriteColumn::UserId.eq(user_id))
            .order_by_desc(FavouriteColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a user's favourite for a unified artwork id
    pub async fn find_favourite(&self, user_id: Uuid, object_id: &str) -> Result<Option<Favourite>> {
        FavouriteEntity::find()
            .filter(FavouriteColumn::UserId.eq(user_id))
            .filter(FavouriteColumn::ObjectId.eq(object_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a favourite by its own id
    pub async fn find_favourite_by_id(&self, id: Uuid) -> Result<Option<Favourite>> {
        FavouriteEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Save an artwork as a favourite, copying its display fields
    pub async fn add_favourite(&self, user_id: Uuid, artwork: &UnifiedArtwork) -> Result<Favourite> {
        let favourite = FavouriteActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            object_id: Set(artwork.id.to_string()),
            provider: Set(artwork.provider.to_string()),
            title: Set(artwork.title.clone()),
            artist: Set(artwork.artist.clone()),
            image_url: Set(artwork.image_url.clone()),
            artwork_url: Set(artwork.artwork_url.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let result = favourite
            .insert(self.write_conn())
            .await
            .map_err(|e| duplicate_as(e.into(), DUPLICATE_FAVOURITE_MESSAGE));

        metrics::record_persistence("add_favourite", result.is_ok());
        result
    }

    /// Remove a favourite; memberships go with it
    pub async fn remove_favourite(&self, user_id: Uuid, object_id: &str) -> Result<bool> {
        let result = FavouriteEntity::delete_many()
            .filter(FavouriteColumn::UserId.eq(user_id))
            .filter(FavouriteColumn::ObjectId.eq(object_id))
            .exec(self.write_conn())
            .await?;

        metrics::record_persistence("remove_favourite", true);
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Exhibition Operations
    // ========================================================================

    /// List a user's exhibitions, newest first, with their first artwork as thumbnail
    pub async fn list_exhibitions(&self, user_id: Uuid) -> Result<Vec<ExhibitionSummary>> {
        let exhibitions = ExhibitionEntity::find()
            .filter(ExhibitionColumn::UserId.eq(user_id))
            .order_by_desc(ExhibitionColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        if exhibitions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = exhibitions.iter().map(|e| e.id).collect();

        let memberships = ExhibitionFavouriteEntity::find()
            .filter(ExhibitionFavouriteColumn::ExhibitionId.is_in(ids))
            .order_by_asc(ExhibitionFavouriteColumn::Position)
            .find_also_related(FavouriteEntity)
            .all(self.read_conn())
            .await?;

        // Memberships arrive in position order, so the first one seen is the thumbnail
        let mut covers: HashMap<Uuid, (Option<String>, usize)> = HashMap::new();
        for (membership, favourite) in memberships {
            let entry = covers.entry(membership.exhibition_id).or_insert((None, 0));
            entry.1 += 1;
            if entry.0.is_none() {
                entry.0 = favourite
                    .map(|f| f.image_url)
                    .filter(|url| !url.is_empty());
            }
        }

        Ok(exhibitions
            .into_iter()
            .map(|exhibition| {
                let (thumbnail, artwork_count) = covers.remove(&exhibition.id).unwrap_or((None, 0));
                ExhibitionSummary {
                    exhibition,
                    thumbnail,
                    artwork_count,
                }
            })
            .collect())
    }

    /// Create an exhibition
    pub async fn create_exhibition(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> Result<Exhibition> {
        let now = chrono::Utc::now();

        let exhibition = ExhibitionActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(name.trim().to_string()),
            description: Set(description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = exhibition.insert(self.write_conn()).await.map_err(Into::into);
        metrics::record_persistence("create_exhibition", result.is_ok());
        result
    }

    /// Find exhibition by ID
    pub async fn find_exhibition(&self, id: Uuid) -> Result<Option<Exhibition>> {
        ExhibitionEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find an exhibition the given user may modify
    pub async fn find_owned_exhibition(&self, id: Uuid, owner: Uuid) -> Result<Exhibition> {
        let exhibition = ExhibitionEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::ExhibitionNotFound { id: id.to_string() })?;

        if !exhibition.is_owned_by(owner) {
            return Err(AppError::Forbidden {
                message: "You can only change your own exhibitions.".to_string(),
            });
        }

        Ok(exhibition)
    }

    /// Rename or re-describe an exhibition
    pub async fn update_exhibition(
        &self,
        id: Uuid,
        owner: Uuid,
        name: &str,
        description: Option<String>,
    ) -> Result<Exhibition> {
        let mut exhibition: ExhibitionActiveModel =
            self.find_owned_exhibition(id, owner).await?.into();

        exhibition.name = Set(name.trim().to_string());
        exhibition.description = Set(description);
        exhibition.updated_at = Set(chrono::Utc::now().into());

        let result = exhibition.update(self.write_conn()).await.map_err(Into::into);
        metrics::record_persistence("update_exhibition", result.is_ok());
        result
    }

    /// Delete an exhibition; memberships go with it
    pub async fn delete_exhibition(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.find_owned_exhibition(id, owner).await?;

        let result = ExhibitionEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        metrics::record_persistence("delete_exhibition", true);
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Membership Operations
    // ========================================================================

    /// Favourites in an exhibition, in manual order
    pub async fn exhibition_artworks(&self, exhibition_id: Uuid) -> Result<Vec<ExhibitionArtwork>> {
        let rows = ExhibitionFavouriteEntity::find()
            .filter(ExhibitionFavouriteColumn::ExhibitionId.eq(exhibition_id))
            .order_by_asc(ExhibitionFavouriteColumn::Position)
            .find_also_related(FavouriteEntity)
            .all(self.read_conn())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, favourite)| {
                favourite.map(|favourite| ExhibitionArtwork {
                    position: membership.position,
                    favourite,
                })
            })
            .collect())
    }

    /// Append a favourite to the end of an exhibition
    pub async fn add_to_exhibition(
        &self,
        exhibition_id: Uuid,
        favourite_id: Uuid,
    ) -> Result<ExhibitionFavourite> {
        let last = ExhibitionFavouriteEntity::find()
            .filter(ExhibitionFavouriteColumn::ExhibitionId.eq(exhibition_id))
            .order_by_desc(ExhibitionFavouriteColumn::Position)
            .one(self.write_conn())
            .await?;

        let membership = ExhibitionFavouriteActiveModel {
            exhibition_id: Set(exhibition_id),
            favourite_id: Set(favourite_id),
            position: Set(next_position(last.map(|m| m.position))),
        };

        let result = membership
            .insert(self.write_conn())
            .await
            .map_err(|e| duplicate_as(e.into(), DUPLICATE_MEMBERSHIP_MESSAGE));

        if let Err(ref e) = result {
            tracing::warn!(
                exhibition_id = %exhibition_id,
                favourite_id = %favourite_id,
                error = %e,
                "Add to exhibition failed"
            );
        }

        metrics::record_persistence("add_to_exhibition", result.is_ok());
        result
    }

    /// Take a favourite out of an exhibition
    pub async fn remove_from_exhibition(&self, exhibition_id: Uuid, favourite_id: Uuid) -> Result<bool> {
        let result = ExhibitionFavouriteEntity::delete_many()
            .filter(ExhibitionFavouriteColumn::ExhibitionId.eq(exhibition_id))
            .filter(ExhibitionFavouriteColumn::FavouriteId.eq(favourite_id))
            .exec(self.write_conn())
            .await?;

        metrics::record_persistence("remove_from_exhibition", true);
        Ok(result.rows_affected > 0)
    }

    /// Rewrite positions so the favourites appear in the given order.
    ///
    /// `order` must name every member exactly once.
    pub async fn reorder_exhibition(&self, exhibition_id: Uuid, order: &[Uuid]) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        let members: HashSet<Uuid> = ExhibitionFavouriteEntity::find()
            .filter(ExhibitionFavouriteColumn::ExhibitionId.eq(exhibition_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|m| m.favourite_id)
            .collect();

        validate_order(&members, order)?;

        // Two passes keep (exhibition, position) unique at every step
        for (index, favourite_id) in order.iter().enumerate() {
            set_position(&txn, exhibition_id, *favourite_id, -(index as i32) - 1).await?;
        }
        for (index, favourite_id) in order.iter().enumerate() {
            set_position(&txn, exhibition_id, *favourite_id, index as i32 + 1).await?;
        }

        txn.commit().await?;

        metrics::record_persistence("reorder_exhibition", true);
        Ok(())
    }
}

async fn set_position<C: sea_orm::ConnectionTrait>(
    conn: &C,
    exhibition_id: Uuid,
    favourite_id: Uuid,
    position: i32,
) -> Result<()> {
    ExhibitionFavouriteEntity::update_many()
        .col_expr(ExhibitionFavouriteColumn::Position, Expr::value(position))
        .filter(ExhibitionFavouriteColumn::ExhibitionId.eq(exhibition_id))
        .filter(ExhibitionFavouriteColumn::FavouriteId.eq(favourite_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Position for a new member given the current highest one
fn next_position(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

fn validate_order(members: &HashSet<Uuid>, order: &[Uuid]) -> Result<()> {
    let requested: HashSet<Uuid> = order.iter().copied().collect();

    if requested.len() != order.len() || &requested != members {
        return Err(AppError::Validation {
            message: "Order must list every artwork in the exhibition exactly once".to_string(),
            field: Some("favouriteIds".to_string()),
        });
    }

    Ok(())
}

/// Give unique-constraint failures a message the user can act on
fn duplicate_as(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Duplicate { .. } => AppError::Duplicate {
            message: message.to_string(),
        },
        other => other,
    }
}
