//! Category model

use serde::{Deserialize, Serialize};

/// User who created a calendar record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub name: String,
}

/// A user-defined grouping for events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Store-assigned id, `0` until persisted
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
    pub author_id: Option<i64>,
    /// Resolved only by author-loading queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Category fields accepted from clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Category {
    /// Blank, unsaved category
    pub fn create() -> Self {
        Self {
            id: 0,
            name: String::new(),
            color: None,
            author_id: None,
            author: None,
        }
    }

    /// Populate from a client payload
    pub fn fill(mut self, data: CategoryData) -> Self {
        self.name = data.name;
        self.color = data.color;
        self
    }

    pub fn with_author_id(mut self, author_id: Option<i64>) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}
