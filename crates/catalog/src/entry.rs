//! Catalog entry record, creation input, and field-wise updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{DomainError, EntryId};

/// A publishable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    /// Publication year as free text; listings parse it numerically.
    pub year: String,
    pub link: String,
    pub published: bool,
    pub publisher: String,
    pub editable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    pub year: String,
    pub link: String,
    pub published: bool,
    pub publisher: String,
    pub editable: bool,
}

impl NewEntry {
    /// Validate and build the stored record.
    pub fn into_entry(self, now: DateTime<Utc>) -> Result<CatalogEntry, DomainError> {
        validate_description(&self.description)?;
        validate_year(&self.year)?;
        validate_link(&self.link)?;

        Ok(CatalogEntry {
            id: EntryId::new(),
            description: self.description.trim().to_string(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            published_at: self.published_at,
            year: self.year.trim().to_string(),
            link: self.link.trim().to_string(),
            published: self.published,
            publisher: self.publisher.trim().to_string(),
            editable: self.editable,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Field-wise update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPatch {
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub year: Option<String>,
    pub link: Option<String>,
    pub published: Option<bool>,
    pub publisher: Option<String>,
    pub editable: Option<bool>,
}

impl EntryPatch {
    pub fn apply(self, entry: &mut CatalogEntry, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(description) = self.description {
            validate_description(&description)?;
            entry.description = description.trim().to_string();
        }
        if let Some(starts_at) = self.starts_at {
            entry.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            entry.ends_at = ends_at;
        }
        if let Some(published_at) = self.published_at {
            entry.published_at = published_at;
        }
        if let Some(year) = self.year {
            validate_year(&year)?;
            entry.year = year.trim().to_string();
        }
        if let Some(link) = self.link {
            validate_link(&link)?;
            entry.link = link.trim().to_string();
        }
        if let Some(published) = self.published {
            entry.published = published;
        }
        if let Some(publisher) = self.publisher {
            entry.publisher = publisher.trim().to_string();
        }
        if let Some(editable) = self.editable {
            entry.editable = editable;
        }
        entry.updated_at = now;
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.trim().is_empty() {
        return Err(DomainError::validation("description is required"));
    }
    Ok(())
}

fn validate_year(year: &str) -> Result<(), DomainError> {
    if year.trim().parse::<i32>().is_err() {
        return Err(DomainError::validation("year must be numeric"));
    }
    Ok(())
}

fn validate_link(link: &str) -> Result<(), DomainError> {
    if link.trim().is_empty() {
        return Err(DomainError::validation("link is required"));
    }
    Ok(())
}
