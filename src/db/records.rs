//! Payload-facing records for the two entities.
//!
//! A record is the in-memory form a caller builds, mutates, and hands to the
//! services; `id: None` marks a record not yet persisted. Records convert
//! to/from flat `serde_json` mappings and carry the field constraints checked
//! before every write.

use serde_json::{Map, Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::db::entities::{item, wishlist};
use crate::error::{DataValidationError, FieldFault};

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct WishlistRecord {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    pub customer_id: Uuid,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ItemRecord {
    pub id: Option<Uuid>,
    pub wishlist_id: Option<Uuid>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
    pub category: Option<String>,
    pub note: Option<String>,
    pub is_favorite: bool,
}

impl WishlistRecord {
    /// Checks the record and every attached item, reporting all offending
    /// fields at once. Runs before any storage write.
    pub fn validate_fields(&self) -> Result<(), DataValidationError> {
        let mut faults = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => faults_from(&errors, ""),
        };
        for (index, item) in self.items.iter().enumerate() {
            faults.extend(item.field_faults(&format!("items[{index}].")));
        }
        finish_faults(faults)
    }

    pub fn serialize(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("id".to_string(), json!(id));
        }
        map.insert("name".to_string(), json!(self.name));
        map.insert("customer_id".to_string(), json!(self.customer_id));
        map.insert(
            "items".to_string(),
            Value::Array(self.items.iter().map(ItemRecord::serialize).collect()),
        );
        Value::Object(map)
    }

    /// Builds a record from a flat mapping. A non-mapping input and a missing
    /// required key are both rejected as `DataValidationError`.
    pub fn deserialize(value: &Value) -> Result<Self, DataValidationError> {
        let map = as_mapping(value)?;
        let mut faults = Vec::new();

        let id = opt_uuid(map, "id", &mut faults);
        let name = req_string(map, "name", &mut faults);
        let customer_id = req_uuid(map, "customer_id", &mut faults);

        let mut items = Vec::new();
        match map.get("items") {
            None | Some(Value::Null) => {}
            Some(Value::Array(entries)) => {
                for (index, entry) in entries.iter().enumerate() {
                    match ItemRecord::deserialize(entry) {
                        Ok(item) => items.push(item),
                        Err(err) => {
                            for fault in err.faults() {
                                faults.push(FieldFault::new(
                                    format!("items[{index}].{}", fault.field),
                                    fault.reason.clone(),
                                ));
                            }
                        }
                    }
                }
            }
            Some(_) => faults.push(FieldFault::new("items", "expected an array")),
        }

        if let (Some(name), Some(customer_id), true) = (name, customer_id, faults.is_empty()) {
            Ok(Self {
                id,
                name,
                customer_id,
                items,
            })
        } else {
            Err(DataValidationError::Payload(faults))
        }
    }

    pub(crate) fn from_rows(model: wishlist::Model, items: Vec<item::Model>) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            customer_id: model.customer_id,
            items: items.into_iter().map(ItemRecord::from).collect(),
        }
    }
}

impl From<wishlist::Model> for WishlistRecord {
    fn from(model: wishlist::Model) -> Self {
        Self::from_rows(model, Vec::new())
    }
}

impl ItemRecord {
    pub fn validate_fields(&self) -> Result<(), DataValidationError> {
        finish_faults(self.field_faults(""))
    }

    fn field_faults(&self, prefix: &str) -> Vec<FieldFault> {
        let mut faults = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => faults_from(&errors, prefix),
        };
        if !self.price.is_finite() {
            faults.push(FieldFault::new(
                format!("{prefix}price"),
                "must be a finite number",
            ));
        }
        faults
    }

    pub fn serialize(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = self.id {
            map.insert("id".to_string(), json!(id));
        }
        if let Some(wishlist_id) = self.wishlist_id {
            map.insert("wishlist_id".to_string(), json!(wishlist_id));
        }
        map.insert("name".to_string(), json!(self.name));
        map.insert("price".to_string(), json!(self.price));
        map.insert("quantity".to_string(), json!(self.quantity));
        map.insert("category".to_string(), json!(self.category));
        map.insert("note".to_string(), json!(self.note));
        map.insert("is_favorite".to_string(), json!(self.is_favorite));
        Value::Object(map)
    }

    pub fn deserialize(value: &Value) -> Result<Self, DataValidationError> {
        let map = as_mapping(value)?;
        let mut faults = Vec::new();

        let id = opt_uuid(map, "id", &mut faults);
        let wishlist_id = opt_uuid(map, "wishlist_id", &mut faults);
        let name = req_string(map, "name", &mut faults);
        let price = req_f64(map, "price", &mut faults);
        let quantity = req_i32(map, "quantity", &mut faults);
        let category = opt_string(map, "category", &mut faults);
        let note = opt_string(map, "note", &mut faults);
        let is_favorite = opt_bool(map, "is_favorite", &mut faults).unwrap_or(false);

        if let (Some(name), Some(price), Some(quantity), true) =
            (name, price, quantity, faults.is_empty())
        {
            Ok(Self {
                id,
                wishlist_id,
                name,
                price,
                quantity,
                category,
                note,
                is_favorite,
            })
        } else {
            Err(DataValidationError::Payload(faults))
        }
    }

    pub(crate) fn to_active_model(&self) -> item::ActiveModel {
        item::ActiveModel {
            name: sea_orm::Set(self.name.clone()),
            price: sea_orm::Set(self.price),
            quantity: sea_orm::Set(self.quantity),
            category: sea_orm::Set(self.category.clone()),
            note: sea_orm::Set(self.note.clone()),
            is_favorite: sea_orm::Set(self.is_favorite),
            ..Default::default()
        }
    }
}

impl From<item::Model> for ItemRecord {
    fn from(model: item::Model) -> Self {
        Self {
            id: Some(model.id),
            wishlist_id: Some(model.wishlist_id),
            name: model.name,
            price: model.price,
            quantity: model.quantity,
            category: model.category,
            note: model.note,
            is_favorite: model.is_favorite,
        }
    }
}

fn as_mapping(value: &Value) -> Result<&Map<String, Value>, DataValidationError> {
    value.as_object().ok_or_else(|| {
        DataValidationError::field("payload", "expected a mapping of field names to values")
    })
}

fn finish_faults(mut faults: Vec<FieldFault>) -> Result<(), DataValidationError> {
    if faults.is_empty() {
        Ok(())
    } else {
        faults.sort_by(|a, b| a.field.cmp(&b.field));
        Err(DataValidationError::Payload(faults))
    }
}

fn faults_from(errors: &validator::ValidationErrors, prefix: &str) -> Vec<FieldFault> {
    let mut faults = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let reason = error
                .message
                .clone()
                .map(|message| message.into_owned())
                .unwrap_or_else(|| error.code.to_string());
            faults.push(FieldFault::new(format!("{prefix}{field}"), reason));
        }
    }
    faults
}

fn req_string(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => {
            faults.push(FieldFault::new(key, "missing required key"));
            None
        }
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            faults.push(FieldFault::new(key, "expected a string"));
            None
        }
    }
}

fn req_f64(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<f64> {
    match map.get(key) {
        None | Some(Value::Null) => {
            faults.push(FieldFault::new(key, "missing required key"));
            None
        }
        Some(Value::Number(value)) => match value.as_f64() {
            Some(value) => Some(value),
            None => {
                faults.push(FieldFault::new(key, "expected a number"));
                None
            }
        },
        Some(_) => {
            faults.push(FieldFault::new(key, "expected a number"));
            None
        }
    }
}

fn req_i32(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<i32> {
    match map.get(key) {
        None | Some(Value::Null) => {
            faults.push(FieldFault::new(key, "missing required key"));
            None
        }
        Some(Value::Number(value)) => match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(value) => Some(value),
            // floats and out-of-range values are rejected, never coerced
            None => {
                faults.push(FieldFault::new(key, "expected an integer"));
                None
            }
        },
        Some(_) => {
            faults.push(FieldFault::new(key, "expected an integer"));
            None
        }
    }
}

fn req_uuid(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<Uuid> {
    match map.get(key) {
        None | Some(Value::Null) => {
            faults.push(FieldFault::new(key, "missing required key"));
            None
        }
        Some(value) => parse_uuid(value, key, faults),
    }
}

fn opt_uuid(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<Uuid> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => parse_uuid(value, key, faults),
    }
}

fn parse_uuid(value: &Value, key: &str, faults: &mut Vec<FieldFault>) -> Option<Uuid> {
    match value.as_str().and_then(|raw| Uuid::parse_str(raw).ok()) {
        Some(id) => Some(id),
        None => {
            faults.push(FieldFault::new(key, "expected a UUID string"));
            None
        }
    }
}

fn opt_string(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            faults.push(FieldFault::new(key, "expected a string"));
            None
        }
    }
}

fn opt_bool(map: &Map<String, Value>, key: &str, faults: &mut Vec<FieldFault>) -> Option<bool> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(value)) => Some(*value),
        Some(_) => {
            faults.push(FieldFault::new(key, "expected a boolean"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::{ItemRecord, WishlistRecord};
    use crate::error::DataValidationError;

    fn item_record(name: &str) -> ItemRecord {
        ItemRecord {
            id: None,
            wishlist_id: None,
            name: name.to_string(),
            price: 12.5,
            quantity: 2,
            category: Some("food".to_string()),
            note: None,
            is_favorite: false,
        }
    }

    #[test]
    fn item_deserialize_empty_mapping_reports_every_missing_key() {
        let err = ItemRecord::deserialize(&json!({})).expect_err("should be rejected");
        let fields: Vec<&str> = err.faults().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["name", "price", "quantity"]);
        assert!(err.faults().iter().all(|f| f.reason == "missing required key"));
    }

    #[test]
    fn item_deserialize_rejects_non_mapping_input() {
        let err = ItemRecord::deserialize(&json!([])).expect_err("should be rejected");
        assert!(matches!(err, DataValidationError::Payload(_)));
        assert_eq!(err.faults()[0].field, "payload");
    }

    #[test]
    fn item_deserialize_rejects_non_numeric_quantity() {
        let err = ItemRecord::deserialize(&json!({
            "name": "waffle iron",
            "price": 29.0,
            "quantity": "invalid",
        }))
        .expect_err("should be rejected");
        assert_eq!(err.faults().len(), 1);
        assert_eq!(err.faults()[0].field, "quantity");
        assert_eq!(err.faults()[0].reason, "expected an integer");
    }

    #[test]
    fn item_deserialize_rejects_fractional_quantity() {
        let err = ItemRecord::deserialize(&json!({
            "name": "waffle iron",
            "price": 29.0,
            "quantity": 1.5,
        }))
        .expect_err("should be rejected");
        assert_eq!(err.faults()[0].field, "quantity");
    }

    #[test]
    fn item_serialize_round_trips() {
        let mut record = item_record("waffle iron");
        record.id = Some(Uuid::new_v4());
        record.wishlist_id = Some(Uuid::new_v4());

        let parsed =
            ItemRecord::deserialize(&record.serialize()).expect("serialized form should parse");
        assert_eq!(parsed, record);
    }

    #[test]
    fn wishlist_deserialize_empty_mapping_reports_every_missing_key() {
        let err = WishlistRecord::deserialize(&json!({})).expect_err("should be rejected");
        let fields: Vec<&str> = err.faults().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["name", "customer_id"]);
    }

    #[test]
    fn wishlist_deserialize_rejects_non_mapping_input() {
        let err = WishlistRecord::deserialize(&json!([])).expect_err("should be rejected");
        assert_eq!(err.faults()[0].field, "payload");
    }

    #[test]
    fn wishlist_deserialize_prefixes_nested_item_faults() {
        let err = WishlistRecord::deserialize(&json!({
            "name": "camping",
            "customer_id": Uuid::new_v4(),
            "items": [{ "name": "tent", "price": 120.0, "quantity": "two" }],
        }))
        .expect_err("should be rejected");
        assert_eq!(err.faults()[0].field, "items[0].quantity");
    }

    #[test]
    fn validate_fields_lists_all_offending_fields() {
        let mut record = item_record("");
        record.quantity = -3;
        record.price = -1.0;

        let err = record.validate_fields().expect_err("should be rejected");
        let fields: Vec<&str> = err.faults().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, ["name", "price", "quantity"]);
    }

    #[test]
    fn wishlist_validate_fields_covers_attached_items() {
        let record = WishlistRecord {
            id: None,
            name: "gifts".to_string(),
            customer_id: Uuid::new_v4(),
            items: vec![item_record("ok"), item_record("")],
        };

        let err = record.validate_fields().expect_err("should be rejected");
        assert_eq!(err.faults()[0].field, "items[1].name");
    }
}
