use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Select};
use uuid::Uuid;

use super::base::DaoPager;
use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::item;
use crate::db::entities::prelude::Item;

#[derive(Clone)]
pub struct ItemDao {
    db: DatabaseConnection,
}

impl DaoBase for ItemDao {
    type Entity = Item;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl ItemDao {
    pub async fn find_item_by_id(&self, id: &Uuid) -> DaoResult<item::Model> {
        self.find_by_id(*id).await
    }

    pub async fn list_items(&self, wishlist_id: &Uuid) -> DaoResult<Vec<item::Model>> {
        let wishlist_id = *wishlist_id;
        self.find_iter(None, None, move |query| {
            query.filter(item::Column::WishlistId.eq(wishlist_id))
        })
        .collect_all()
        .await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<item::Model>> {
        self.find_iter(None, None, |query| query).collect_all().await
    }

    pub async fn find_by_price(
        &self,
        wishlist_id: &Uuid,
        price: f64,
    ) -> DaoResult<Vec<item::Model>> {
        let wishlist_id = *wishlist_id;
        self.find_iter(None, None, move |query| {
            query
                .filter(item::Column::WishlistId.eq(wishlist_id))
                .filter(item::Column::Price.eq(price))
        })
        .collect_all()
        .await
    }

    pub async fn find_by_category(
        &self,
        wishlist_id: &Uuid,
        category: &str,
    ) -> DaoResult<Vec<item::Model>> {
        let wishlist_id = *wishlist_id;
        let category = category.to_string();
        self.find_iter(None, None, move |query| {
            query
                .filter(item::Column::WishlistId.eq(wishlist_id))
                .filter(item::Column::Category.eq(category.clone()))
        })
        .collect_all()
        .await
    }

    /// Lazy query over a wishlist's items by favorite flag. Rows are fetched
    /// only as pages are pulled; call again for a fresh pass.
    pub fn find_by_favorite(
        self,
        wishlist_id: Uuid,
        is_favorite: bool,
        page_size: Option<u64>,
    ) -> DaoPager<Self, impl Fn(Select<Item>) -> Select<Item> + Clone + Send> {
        self.find_iter(page_size, None, move |query| {
            query
                .filter(item::Column::WishlistId.eq(wishlist_id))
                .filter(item::Column::IsFavorite.eq(is_favorite))
        })
    }

    pub async fn count_by_favorite(
        &self,
        wishlist_id: &Uuid,
        is_favorite: bool,
    ) -> DaoResult<u64> {
        Item::find()
            .filter(item::Column::WishlistId.eq(*wishlist_id))
            .filter(item::Column::IsFavorite.eq(is_favorite))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::ItemDao;
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::item;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn item_model(wishlist_id: Uuid, name: &str) -> item::Model {
        let now = ts();
        item::Model {
            id: Uuid::new_v4(),
            wishlist_id,
            name: name.to_string(),
            price: 9.99,
            quantity: 1,
            category: None,
            note: None,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn favorite_pager_pulls_pages_until_exhausted() {
        let wishlist_id = Uuid::new_v4();
        // page_size 2 fetches 3 rows to probe for a next page
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![
                    item_model(wishlist_id, "a"),
                    item_model(wishlist_id, "b"),
                    item_model(wishlist_id, "c"),
                ],
                vec![item_model(wishlist_id, "c")],
            ])
            .into_connection();
        let dao = ItemDao::new(&db);

        let mut pager = dao.find_by_favorite(wishlist_id, true, Some(2));

        let first = pager
            .next_page()
            .await
            .expect("first page should succeed")
            .expect("first page should exist");
        assert_eq!(first.data.len(), 2);
        assert!(first.has_next);

        let second = pager
            .next_page()
            .await
            .expect("second page should succeed")
            .expect("second page should exist");
        assert_eq!(second.data.len(), 1);
        assert!(!second.has_next);

        assert!(
            pager
                .next_page()
                .await
                .expect("exhausted pager should not query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn find_item_by_id_propagates_not_found() {
        let missing_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<item::Model>::new()])
            .into_connection();
        let dao = ItemDao::new(&db);

        let err = dao
            .find_item_by_id(&missing_id)
            .await
            .expect_err("lookup should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { id, .. } if id == missing_id
        ));
    }
}
