//! Gateway domain types.

use serde::{Deserialize, Serialize};

use crate::upstream::ProductResponse;

/// A product as returned to callers and held in the caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub availability: bool,
}

impl From<ProductResponse> for ProductDetail {
    fn from(response: ProductResponse) -> Self {
        Self {
            id: response.id,
            name: response.name,
            price: response.price,
            availability: response.availability,
        }
    }
}
