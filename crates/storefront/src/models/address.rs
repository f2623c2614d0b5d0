//! Shipping address types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cartline_core::AddressId;

/// A stored address occupying one of the user's two slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    #[serde(rename = "house_name")]
    pub house: String,
    #[serde(rename = "street_name")]
    pub street: String,
    #[serde(rename = "city_name")]
    pub city: String,
    #[serde(rename = "pin_code")]
    pub postal_code: String,
}

/// Address fields supplied by a client when adding or editing a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(rename = "house_name")]
    pub house: String,
    #[serde(rename = "street_name")]
    pub street: String,
    #[serde(rename = "city_name")]
    pub city: String,
    #[serde(rename = "pin_code")]
    pub postal_code: String,
}

impl AddressInput {
    /// Name of the first blank field, if any.
    #[must_use]
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("house_name", &self.house),
            ("street_name", &self.street),
            ("city_name", &self.city),
            ("pin_code", &self.postal_code),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Build a new address with a fresh identity.
    #[must_use]
    pub fn into_address(self) -> Address {
        Address {
            id: AddressId::generate(),
            house: self.house,
            street: self.street,
            city: self.city,
            postal_code: self.postal_code,
        }
    }

    /// The four scalar fields as a document patch, leaving `_id` untouched.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("house_name".to_owned(), Value::String(self.house.clone()));
        fields.insert("street_name".to_owned(), Value::String(self.street.clone()));
        fields.insert("city_name".to_owned(), Value::String(self.city.clone()));
        fields.insert("pin_code".to_owned(), Value::String(self.postal_code.clone()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            house: "jupyterlab".to_string(),
            street: "notebook".to_string(),
            city: "josua".to_string(),
            postal_code: "685607".to_string(),
        }
    }

    #[test]
    fn test_first_blank_field() {
        assert_eq!(input().first_blank_field(), None);

        let mut blank = input();
        blank.city = "  ".to_string();
        assert_eq!(blank.first_blank_field(), Some("city_name"));
    }

    #[test]
    fn test_to_fields_omits_identity() {
        let fields = input().to_fields();
        assert_eq!(fields.len(), 4);
        assert!(!fields.contains_key("_id"));
        assert_eq!(fields["pin_code"], "685607");
    }

    #[test]
    fn test_into_address_assigns_fresh_id() {
        let a = input().into_address();
        let b = input().into_address();
        assert_ne!(a.id, b.id);
        assert_eq!(a.house, "jupyterlab");
    }
}
