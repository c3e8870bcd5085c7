use rand::Rng;
use uuid::Uuid;
use wishlists::db::records::{ItemRecord, WishlistRecord};

pub fn wishlist_record() -> WishlistRecord {
    let mut rng = rand::thread_rng();
    WishlistRecord {
        id: None,
        name: format!("wishlist-{}", rng.gen_range(1000..10000)),
        customer_id: Uuid::new_v4(),
        items: Vec::new(),
    }
}

pub fn item_record(name: &str) -> ItemRecord {
    let mut rng = rand::thread_rng();
    ItemRecord {
        id: None,
        wishlist_id: None,
        name: name.to_string(),
        price: f64::from(rng.gen_range(1..100)),
        quantity: rng.gen_range(1..10),
        category: None,
        note: Some("gift idea".to_string()),
        is_favorite: rng.gen_bool(0.5),
    }
}
