use serde::Deserialize;

use itemproc_items::{CreateItem, UpdateItem};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
}

impl From<CreateItemRequest> for CreateItem {
    fn from(body: CreateItemRequest) -> Self {
        CreateItem {
            name: body.name,
            description: body.description,
            status: body.status,
            email: body.email,
        }
    }
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateItemRequest> for UpdateItem {
    fn from(body: UpdateItemRequest) -> Self {
        UpdateItem {
            name: body.name,
            description: body.description,
            status: body.status,
            email: body.email,
        }
    }
}
