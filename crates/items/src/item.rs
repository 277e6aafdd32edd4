use serde::{Deserialize, Serialize};

use itemproc_core::{DomainError, DomainResult, ItemId};

use crate::validation::{
    DESCRIPTION_MAX_CHARS, EMAIL_MAX_CHARS, NAME_MAX_CHARS, STATUS_MAX_CHARS, Violations,
    is_blank,
};

/// Status value that marks an item as handled by the batch processor.
pub const PROCESSED: &str = "PROCESSED";

/// A persisted item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub email: String,
}

impl Item {
    pub fn is_processed(&self) -> bool {
        self.status == PROCESSED
    }

    pub fn mark_processed(&mut self) {
        self.status = PROCESSED.to_string();
    }

    /// Merge a validated patch into this item.
    ///
    /// Name, status and email are only overwritten by non-blank values.
    /// Description is overwritten by any supplied value, including a blank one.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(name) = patch.name.as_deref().filter(|v| !is_blank(v)) {
            self.name = name.to_string();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = patch.status.as_deref().filter(|v| !is_blank(v)) {
            self.status = status.to_string();
        }
        if let Some(email) = patch.email.as_deref().filter(|v| !is_blank(v)) {
            self.email = email.to_string();
        }
    }
}

/// Validated input for a new item (the store assigns the id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub email: String,
}

impl NewItem {
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description,
            status: self.status,
            email: self.email,
        }
    }
}

/// Validated partial update for an existing item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
}

/// Command: CreateItem (unvalidated).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
}

impl CreateItem {
    pub fn validate(self) -> DomainResult<NewItem> {
        let mut v = Violations::new();
        v.not_blank(self.name.as_deref(), "Name")
            .max_chars(self.name.as_deref(), NAME_MAX_CHARS, "Name")
            .max_chars(self.description.as_deref(), DESCRIPTION_MAX_CHARS, "Description")
            .not_blank(self.status.as_deref(), "Status")
            .max_chars(self.status.as_deref(), STATUS_MAX_CHARS, "Status")
            .not_blank(self.email.as_deref(), "Email")
            .max_chars(self.email.as_deref(), EMAIL_MAX_CHARS, "Email")
            .email(self.email.as_deref());

        if !v.is_empty() {
            return Err(DomainError::Validation(v.into_messages()));
        }

        match (self.name, self.status, self.email) {
            (Some(name), Some(status), Some(email)) => Ok(NewItem {
                name,
                description: self.description,
                status,
                email,
            }),
            _ => Err(DomainError::validation(["required field missing"])),
        }
    }
}

/// Command: UpdateItem (unvalidated). Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
}

impl UpdateItem {
    pub fn validate(self) -> DomainResult<ItemPatch> {
        let mut v = Violations::new();
        v.max_chars(self.name.as_deref(), NAME_MAX_CHARS, "Name")
            .max_chars(self.description.as_deref(), DESCRIPTION_MAX_CHARS, "Description")
            .max_chars(self.status.as_deref(), STATUS_MAX_CHARS, "Status")
            .max_chars(self.email.as_deref(), EMAIL_MAX_CHARS, "Email")
            .email(self.email.as_deref());

        if !v.is_empty() {
            return Err(DomainError::Validation(v.into_messages()));
        }

        Ok(ItemPatch {
            name: self.name,
            description: self.description,
            status: self.status,
            email: self.email,
        })
    }
}
