pub mod item_service;
pub mod wishlist_service;

pub use item_service::ItemService;
pub use wishlist_service::WishlistService;
