use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::db::dao::{
    DaoBase, DaoLayerError, HasIdActiveModel, ItemDao, TimestampedActiveModel, WishlistDao,
};
use crate::db::entities::prelude::{Item, Wishlist};
use crate::db::entities::{item, wishlist};
use crate::db::records::{ItemRecord, WishlistRecord};
use crate::error::DataValidationError;

/// Persistence operations for the Wishlist aggregate. Child items are written
/// in the same transaction as the parent row; a failure anywhere rolls the
/// whole operation back.
#[derive(Clone)]
pub struct WishlistService {
    db: DatabaseConnection,
}

impl WishlistService {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn dao(&self) -> WishlistDao {
        DaoBase::new(&self.db)
    }

    fn item_dao(&self) -> ItemDao {
        DaoBase::new(&self.db)
    }

    pub async fn create(
        &self,
        record: &WishlistRecord,
    ) -> Result<WishlistRecord, DataValidationError> {
        if record.id.is_some() {
            return Err(DataValidationError::field(
                "id",
                "assigned by storage, must be absent on create",
            ));
        }
        for (index, item_record) in record.items.iter().enumerate() {
            if item_record.id.is_some() {
                return Err(DataValidationError::field(
                    &format!("items[{index}].id"),
                    "assigned by storage, must be absent on create",
                ));
            }
        }
        record.validate_fields()?;

        let txn = self.db.begin().await.map_err(begin_failed)?;

        let now = Utc::now().fixed_offset();
        let wishlist_id = Uuid::new_v4();
        let mut parent = wishlist::ActiveModel {
            name: Set(record.name.clone()),
            customer_id: Set(record.customer_id),
            ..Default::default()
        };
        parent.set_id(wishlist_id);
        parent.set_created_at(now);
        parent.set_updated_at(now);
        let parent_model = parent
            .insert(&txn)
            .await
            .map_err(|err| write_failed("wishlist", err))?;

        let mut item_models = Vec::with_capacity(record.items.len());
        for (index, item_record) in record.items.iter().enumerate() {
            let model = insert_item(&txn, wishlist_id, item_record, stamp(now, index)).await?;
            item_models.push(model);
        }

        txn.commit().await.map_err(commit_failed)?;
        info!(id = %wishlist_id, items = item_models.len(), "wishlist created");

        Ok(WishlistRecord::from_rows(parent_model, item_models))
    }

    /// Persists the record's own fields and the current state of its items
    /// collection: rows are updated, inserted, or deleted so storage matches
    /// the collection exactly.
    pub async fn update(
        &self,
        record: &WishlistRecord,
    ) -> Result<WishlistRecord, DataValidationError> {
        let Some(wishlist_id) = record.id else {
            return Err(DataValidationError::field("id", "required for update"));
        };
        for (index, item_record) in record.items.iter().enumerate() {
            if let Some(owner) = item_record.wishlist_id
                && owner != wishlist_id
            {
                return Err(DataValidationError::field(
                    &format!("items[{index}].wishlist_id"),
                    "belongs to a different wishlist",
                ));
            }
        }
        record.validate_fields()?;

        let txn = self.db.begin().await.map_err(begin_failed)?;
        let now = Utc::now().fixed_offset();

        let existing = Wishlist::find_by_id(wishlist_id)
            .one(&txn)
            .await
            .map_err(DataValidationError::from)?
            .ok_or_else(|| {
                DataValidationError::Storage(format!("wishlist {wishlist_id} does not exist"))
            })?;

        let mut parent = existing.into_active_model();
        parent.name = Set(record.name.clone());
        parent.customer_id = Set(record.customer_id);
        parent.set_updated_at(now);
        parent
            .update(&txn)
            .await
            .map_err(|err| write_failed("wishlist", err))?;

        let current = Item::find()
            .filter(item::Column::WishlistId.eq(wishlist_id))
            .all(&txn)
            .await
            .map_err(DataValidationError::from)?;
        let current_ids: HashSet<Uuid> = current.iter().map(|row| row.id).collect();
        let keep: HashSet<Uuid> = record.items.iter().filter_map(|entry| entry.id).collect();

        // the collection is authoritative: drop rows it no longer holds
        for row in current {
            if !keep.contains(&row.id) {
                Item::delete_by_id(row.id)
                    .exec(&txn)
                    .await
                    .map_err(|err| write_failed("item", err))?;
            }
        }

        for (index, item_record) in record.items.iter().enumerate() {
            match item_record.id {
                None => {
                    insert_item(&txn, wishlist_id, item_record, stamp(now, index)).await?;
                }
                Some(item_id) if current_ids.contains(&item_id) => {
                    let mut active = item_record.to_active_model();
                    active.wishlist_id = Set(wishlist_id);
                    active.set_id(item_id);
                    active.set_updated_at(now);
                    active
                        .update(&txn)
                        .await
                        .map_err(|err| write_failed("item", err))?;
                }
                Some(_) => {
                    return Err(DataValidationError::field(
                        &format!("items[{index}].id"),
                        "references an item that no longer exists",
                    ));
                }
            }
        }

        txn.commit().await.map_err(commit_failed)?;
        info!(id = %wishlist_id, "wishlist updated");

        match self.find(wishlist_id).await? {
            Some(updated) => Ok(updated),
            None => Err(DataValidationError::Storage(format!(
                "wishlist {wishlist_id} disappeared during update"
            ))),
        }
    }

    /// Removes the wishlist row and every item it owns. Unknown ids are a
    /// no-op.
    pub async fn delete(&self, id: Uuid) -> Result<(), DataValidationError> {
        let txn = self.db.begin().await.map_err(begin_failed)?;
        Item::delete_many()
            .filter(item::Column::WishlistId.eq(id))
            .exec(&txn)
            .await
            .map_err(|err| write_failed("item", err))?;
        let result = Wishlist::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|err| write_failed("wishlist", err))?;
        txn.commit().await.map_err(commit_failed)?;

        if result.rows_affected > 0 {
            info!(%id, "wishlist deleted");
        }
        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<WishlistRecord>, DataValidationError> {
        let model = match self.dao().find_wishlist_by_id(&id).await {
            Ok(model) => model,
            Err(DaoLayerError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let items = self.item_dao().list_items(&id).await?;
        Ok(Some(WishlistRecord::from_rows(model, items)))
    }

    pub async fn all(&self) -> Result<Vec<WishlistRecord>, DataValidationError> {
        let models = self.dao().list_wishlists().await?;
        let item_dao = self.item_dao();
        let mut records = Vec::with_capacity(models.len());
        for model in models {
            let items = item_dao.list_items(&model.id).await?;
            records.push(WishlistRecord::from_rows(model, items));
        }
        Ok(records)
    }
}

async fn insert_item(
    txn: &DatabaseTransaction,
    wishlist_id: Uuid,
    record: &ItemRecord,
    at: DateTime<FixedOffset>,
) -> Result<item::Model, DataValidationError> {
    let mut active = record.to_active_model();
    active.wishlist_id = Set(wishlist_id);
    active.set_id(Uuid::new_v4());
    active.set_created_at(at);
    active.set_updated_at(at);
    active
        .insert(txn)
        .await
        .map_err(|err| write_failed("item", err))
}

// strictly increasing created_at keeps one batch of inserts in insertion order
fn stamp(base: DateTime<FixedOffset>, index: usize) -> DateTime<FixedOffset> {
    base + Duration::microseconds(index as i64)
}

fn begin_failed(err: sea_orm::DbErr) -> DataValidationError {
    error!(error = %err, "failed to start transaction");
    err.into()
}

fn commit_failed(err: sea_orm::DbErr) -> DataValidationError {
    error!(error = %err, "failed to commit transaction");
    err.into()
}

fn write_failed(entity: &str, err: sea_orm::DbErr) -> DataValidationError {
    error!(error = %err, entity, "write rejected, rolling back");
    DataValidationError::Storage(format!("{entity} write failed: {err}"))
}
