use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validate::{person_name, phone_number};

/// Contact fields submitted with the order. Every rule is checked and all
/// failures are reported together, keyed by field.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(
        length(min = 2, max = 50, message = "first name must be 2 to 50 characters"),
        custom = "person_name"
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, max = 50, message = "last name must be 2 to 50 characters"),
        custom = "person_name"
    )]
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(custom = "phone_number")]
    pub phone: String,
    #[validate(length(min = 10, max = 200, message = "address must be 10 to 200 characters"))]
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub total: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(
        length(min = 2, max = 50, message = "first name must be 2 to 50 characters"),
        custom = "person_name"
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, max = 50, message = "last name must be 2 to 50 characters"),
        custom = "person_name"
    )]
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(custom = "phone_number")]
    pub phone: String,
    #[validate(length(min = 10, max = 200, message = "address must be 10 to 200 characters"))]
    pub address: String,
}
