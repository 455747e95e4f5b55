use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Influencer/creator record. Soft-deleted via `deleted_at`; the import
/// handler restores a soft-deleted match instead of creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Creator {
    pub fn new(full_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            full_name,
            email: None,
            phone: None,
            country: None,
            category: None,
            notes: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Partial update for a creator. `None` fields leave the stored value alone,
/// so an absent CSV cell never nulls out existing data.
#[derive(Debug, Clone, Default)]
pub struct CreatorPatch {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl CreatorPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.country.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }
}

/// Social media account owned by a creator, unique per platform + handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorSocial {
    pub id: String,
    pub creator_id: String,
    pub platform: String,
    pub handle: String,
    pub url: Option<String>,
    pub followers: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreatorSocial {
    pub fn new(creator_id: String, platform: String, handle: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            creator_id,
            platform,
            handle,
            url: None,
            followers: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreatorSocialPatch {
    pub url: Option<String>,
    pub followers: Option<i64>,
}
