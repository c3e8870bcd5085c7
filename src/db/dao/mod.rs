pub mod base;
pub mod base_traits;
pub mod error;
pub mod item_dao;
pub mod wishlist_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use error::{DaoLayerError, DaoResult};
pub use item_dao::ItemDao;
pub use wishlist_dao::WishlistDao;
