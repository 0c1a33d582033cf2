use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Adventure,
    Classics,
    Crime,
    Fantasy,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Adventure => "Adventure",
            Category::Classics => "Classics",
            Category::Crime => "Crime",
            Category::Fantasy => "Fantasy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Adventure" => Some(Category::Adventure),
            "Classics" => Some(Category::Classics),
            "Crime" => Some(Category::Crime),
            "Fantasy" => Some(Category::Fantasy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for creating a book. The store assigns the id, so an `id` key in
/// the request body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: Category,
}

/// Fields to overwrite on an existing book; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
}

impl NewBook {
    /// Field-level schema checks applied by the store on every write.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut problems = Vec::new();

        if self.title.trim().is_empty() {
            problems.push("title must not be empty");
        }
        if self.author.trim().is_empty() {
            problems.push("author must not be empty");
        }
        if !self.price.is_finite() || self.price < 0.0 {
            problems.push("price must be a non-negative number");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(problems.join(", ")))
        }
    }
}

impl Book {
    /// The document that results from applying `changes`, in the shape the
    /// store validates before writing.
    pub fn merged(&self, changes: UpdateBook) -> NewBook {
        NewBook {
            title: changes.title.unwrap_or_else(|| self.title.clone()),
            author: changes.author.unwrap_or_else(|| self.author.clone()),
            description: changes
                .description
                .unwrap_or_else(|| self.description.clone()),
            price: changes.price.unwrap_or(self.price),
            category: changes.category.unwrap_or(self.category),
        }
    }
}
