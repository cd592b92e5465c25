//! Domain DTOs for the Cozi list API.
//!
//! # Design
//! Wire names are camelCase; the structs use snake_case fields with serde
//! renames. `ListType` and `ItemStatus` are closed enums, so a payload with any
//! other value fails to decode instead of slipping through as a string.
//! Optional fields accept both an absent key and an explicit `null`.
//! These types are defined independently of the mock-server crate; the
//! integration tests catch schema drift.

use serde::{Deserialize, Serialize};

/// Kind of a Cozi list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Shopping,
    Todo,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Shopping => "shopping",
            ListType::Todo => "todo",
        }
    }
}

/// Completion state of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Incomplete,
    Complete,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Incomplete => "incomplete",
            ItemStatus::Complete => "complete",
        }
    }
}

impl From<bool> for ItemStatus {
    fn from(completed: bool) -> Self {
        if completed {
            ItemStatus::Complete
        } else {
            ItemStatus::Incomplete
        }
    }
}

/// A list as returned by the server. `items` keeps the server's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoziList {
    pub list_id: String,
    pub title: String,
    pub list_type: ListType,
    #[serde(default)]
    pub items: Vec<CoziItem>,
    /// Server-maintained revision counter; passed through untouched.
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl CoziList {
    pub fn find_item(&self, item_id: &str) -> Option<&CoziItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

/// An entry on a list. Always addressed by its owning list's id plus `item_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoziItem {
    pub item_id: String,
    pub text: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub version: u64,
}

impl CoziItem {
    pub fn is_complete(&self) -> bool {
        self.status == ItemStatus::Complete
    }
}

/// Request payload for creating a list. Serializes as `{title, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddListRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub list_type: ListType,
}

/// Moves a list to `new_order` among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderListRequest {
    pub list_id: String,
    pub new_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub list_id: String,
    pub text: String,
}

/// Replaces an item's text; every other field is left to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditItemRequest {
    pub list_id: String,
    pub item_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkItemRequest {
    pub list_id: String,
    pub item_id: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub list_id: String,
    pub item_id: String,
}

/// Body of a successful `POST /lists`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedList {
    pub list_id: String,
}
