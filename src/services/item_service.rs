use sea_orm::{DatabaseConnection, Select, Set};
use tracing::info;
use uuid::Uuid;

use crate::db::dao::{DaoBase, DaoLayerError, DaoPager, ItemDao, WishlistDao};
use crate::db::entities::prelude::Item;
use crate::db::records::ItemRecord;
use crate::error::DataValidationError;

/// Persistence operations for individual items, independent of the parent
/// aggregate.
#[derive(Clone)]
pub struct ItemService {
    db: DatabaseConnection,
}

impl ItemService {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn dao(&self) -> ItemDao {
        DaoBase::new(&self.db)
    }

    fn wishlist_dao(&self) -> WishlistDao {
        DaoBase::new(&self.db)
    }

    pub async fn create(&self, record: &ItemRecord) -> Result<ItemRecord, DataValidationError> {
        if record.id.is_some() {
            return Err(DataValidationError::field(
                "id",
                "assigned by storage, must be absent on create",
            ));
        }
        let Some(wishlist_id) = record.wishlist_id else {
            return Err(DataValidationError::field("wishlist_id", "missing required key"));
        };
        record.validate_fields()?;

        match self.wishlist_dao().find_wishlist_by_id(&wishlist_id).await {
            Ok(_) => {}
            Err(DaoLayerError::NotFound { .. }) => {
                return Err(DataValidationError::field(
                    "wishlist_id",
                    "references a wishlist that does not exist",
                ));
            }
            Err(err) => return Err(err.into()),
        }

        let mut active = record.to_active_model();
        active.wishlist_id = Set(wishlist_id);
        let model = self.dao().create(active).await?;
        info!(id = %model.id, wishlist = %wishlist_id, "item created");
        Ok(ItemRecord::from(model))
    }

    pub async fn update(&self, record: &ItemRecord) -> Result<ItemRecord, DataValidationError> {
        let Some(id) = record.id else {
            return Err(DataValidationError::field("id", "required for update"));
        };
        record.validate_fields()?;

        let fields = record.clone();
        let model = self
            .dao()
            .update(id, move |active| {
                active.name = Set(fields.name);
                active.price = Set(fields.price);
                active.quantity = Set(fields.quantity);
                active.category = Set(fields.category);
                active.note = Set(fields.note);
                active.is_favorite = Set(fields.is_favorite);
            })
            .await?;
        Ok(ItemRecord::from(model))
    }

    /// Removes the item's row; the parent wishlist and sibling items are
    /// untouched. Unknown ids are a no-op.
    pub async fn delete(&self, id: Uuid) -> Result<(), DataValidationError> {
        match self.dao().delete(id).await {
            Ok(_) => {
                info!(%id, "item deleted");
                Ok(())
            }
            Err(DaoLayerError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<ItemRecord>, DataValidationError> {
        match self.dao().find_item_by_id(&id).await {
            Ok(model) => Ok(Some(ItemRecord::from(model))),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn all(&self) -> Result<Vec<ItemRecord>, DataValidationError> {
        let models = self.dao().list_all().await?;
        Ok(models.into_iter().map(ItemRecord::from).collect())
    }

    pub async fn find_by_price(
        &self,
        wishlist_id: Uuid,
        price: f64,
    ) -> Result<Vec<ItemRecord>, DataValidationError> {
        let models = self.dao().find_by_price(&wishlist_id, price).await?;
        Ok(models.into_iter().map(ItemRecord::from).collect())
    }

    pub async fn find_by_category(
        &self,
        wishlist_id: Uuid,
        category: &str,
    ) -> Result<Vec<ItemRecord>, DataValidationError> {
        let models = self.dao().find_by_category(&wishlist_id, category).await?;
        Ok(models.into_iter().map(ItemRecord::from).collect())
    }

    /// Lazy query over a wishlist's items by favorite flag; rows are fetched
    /// only as pages are pulled, and each call starts a fresh pass.
    pub fn find_by_favorite(
        &self,
        wishlist_id: Uuid,
        is_favorite: bool,
        page_size: Option<u64>,
    ) -> DaoPager<ItemDao, impl Fn(Select<Item>) -> Select<Item> + Clone + Send> {
        self.dao().find_by_favorite(wishlist_id, is_favorite, page_size)
    }

    pub async fn count_by_favorite(
        &self,
        wishlist_id: Uuid,
        is_favorite: bool,
    ) -> Result<u64, DataValidationError> {
        Ok(self.dao().count_by_favorite(&wishlist_id, is_favorite).await?)
    }
}
