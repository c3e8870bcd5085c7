use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::prelude::Wishlist;
use crate::db::entities::wishlist;

#[derive(Clone)]
pub struct WishlistDao {
    db: DatabaseConnection,
}

impl DaoBase for WishlistDao {
    type Entity = Wishlist;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl WishlistDao {
    pub async fn find_wishlist_by_id(&self, id: &Uuid) -> DaoResult<wishlist::Model> {
        self.find_by_id(*id).await
    }

    pub async fn list_wishlists(&self) -> DaoResult<Vec<wishlist::Model>> {
        self.find_iter(None, None, |query| query).collect_all().await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::WishlistDao;
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::wishlist;

    #[tokio::test]
    async fn find_wishlist_by_id_propagates_not_found() {
        let missing_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<wishlist::Model>::new()])
            .into_connection();
        let dao = WishlistDao::new(&db);

        let err = dao
            .find_wishlist_by_id(&missing_id)
            .await
            .expect_err("lookup should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { id, .. } if id == missing_id
        ));
    }
}
