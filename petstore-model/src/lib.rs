//! Data model of the Petstore API.
//!
//! Field names follow Rust conventions; the JSON representation uses the
//! camelCase names of the API. Optional fields are left out when absent.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// pet status in the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub name: String,
    pub photo_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
}

/// order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Approved,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    /// date-time, passed through as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// User Status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_status: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    pub fn test_pet_json() {
        // first, try to construct a Pet instance
        let pet = Pet {
            id: Some(1),
            name: "Doggy".to_string(),
            category: Some(Category {
                id: Some(1000),
                name: Some("Dogs".to_string()),
            }),
            status: Some(PetStatus::Available),
            photo_urls: vec![],
            tags: Some(vec![]),
        };

        // serialize that instance to a JSON value and compare
        // with an expected JSON representation
        let value = serde_json::to_value(&pet).unwrap();
        let expected_value = json!({
            "id": 1,
            "name": "Doggy",
            "category": {
                "id": 1000,
                "name": "Dogs"
            },
            "status": "available",
            "photoUrls": [],
            "tags": [],
        });
        assert_eq!(expected_value, value);

        let other_pet = serde_json::from_value::<Pet>(value).unwrap();
        assert_eq!(pet, other_pet);
    }

    #[test]
    pub fn test_absent_fields_are_omitted() {
        let pet = Pet {
            id: None,
            category: None,
            name: "Rex".to_string(),
            photo_urls: vec!["http://img/rex.png".to_string()],
            tags: None,
            status: None,
        };
        let value = serde_json::to_value(&pet).unwrap();
        assert_eq!(
            value,
            json!({"name": "Rex", "photoUrls": ["http://img/rex.png"]})
        );
    }

    #[test]
    pub fn test_order_and_user_wire_names() {
        let order: Order = serde_json::from_value(json!({
            "id": 5,
            "petId": 1,
            "quantity": 2,
            "shipDate": "2024-01-01T00:00:00.000Z",
            "status": "placed",
            "complete": false
        }))
        .unwrap();
        assert_eq!(order.pet_id, Some(1));
        assert_eq!(order.status, Some(OrderStatus::Placed));

        let user: User = serde_json::from_value(json!({
            "username": "jdoe",
            "firstName": "Jane",
            "userStatus": 1
        }))
        .unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Jane"));
        assert_eq!(user.user_status, Some(1));
        assert_eq!(user.email, None);
    }

    #[test]
    pub fn test_api_response_type_field() {
        let response: ApiResponse =
            serde_json::from_value(json!({"code": 200, "type": "unknown", "message": "ok"}))
                .unwrap();
        assert_eq!(response.type_.as_deref(), Some("unknown"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"code": 200, "type": "unknown", "message": "ok"})
        );
    }

    #[test]
    pub fn test_unknown_status_is_rejected() {
        serde_json::from_value::<Pet>(json!({
            "name": "Rex",
            "photoUrls": [],
            "status": "lost"
        }))
        .unwrap_err();
    }
}
