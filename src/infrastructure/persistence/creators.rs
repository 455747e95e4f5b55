use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::domain::entities::{Creator, CreatorPatch, CreatorSocial, CreatorSocialPatch};
use crate::domain::errors::WorkerResult;
use crate::domain::ports::CreatorStore;
use crate::infrastructure::persistence::{
    format_date, parse_date_col, parse_opt_date_col, Database,
};

#[derive(Clone)]
pub struct SqlCreatorStore {
    db: Database,
}

impl SqlCreatorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_creator(row: &sqlx::any::AnyRow) -> WorkerResult<Creator> {
        Ok(Creator {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email").ok(),
            phone: row.try_get("phone").ok(),
            country: row.try_get("country").ok(),
            category: row.try_get("category").ok(),
            notes: row.try_get("notes").ok(),
            deleted_at: parse_opt_date_col(row, "deleted_at"),
            created_at: parse_date_col(row, "created_at")?,
            updated_at: parse_date_col(row, "updated_at")?,
        })
    }

    fn row_to_social(row: &sqlx::any::AnyRow) -> WorkerResult<CreatorSocial> {
        Ok(CreatorSocial {
            id: row.try_get("id")?,
            creator_id: row.try_get("creator_id")?,
            platform: row.try_get("platform")?,
            handle: row.try_get("handle")?,
            url: row.try_get("url").ok(),
            followers: row.try_get("followers").ok(),
            deleted_at: parse_opt_date_col(row, "deleted_at"),
            created_at: parse_date_col(row, "created_at")?,
            updated_at: parse_date_col(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl CreatorStore for SqlCreatorStore {
    async fn find_by_name(&self, full_name: &str) -> WorkerResult<Option<Creator>> {
        let row = sqlx::query(
            "SELECT id, full_name, email, phone, country, category, notes,
                    deleted_at, created_at, updated_at
             FROM creators
             WHERE LOWER(full_name) = LOWER(?)
             ORDER BY CASE WHEN deleted_at IS NULL THEN 0 ELSE 1 END
             LIMIT 1",
        )
        .bind(full_name)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_creator(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, creator: &Creator) -> WorkerResult<()> {
        sqlx::query(
            "INSERT INTO creators (id, full_name, email, phone, country, category, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&creator.id)
        .bind(&creator.full_name)
        .bind(creator.email.as_deref())
        .bind(creator.phone.as_deref())
        .bind(creator.country.as_deref())
        .bind(creator.category.as_deref())
        .bind(creator.notes.as_deref())
        .bind(format_date(creator.created_at))
        .bind(format_date(creator.updated_at))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn merge_update(&self, id: &str, patch: &CreatorPatch) -> WorkerResult<()> {
        sqlx::query(
            "UPDATE creators
             SET email = COALESCE(?, email),
                 phone = COALESCE(?, phone),
                 country = COALESCE(?, country),
                 category = COALESCE(?, category),
                 notes = COALESCE(?, notes),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.country.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.notes.as_deref())
        .bind(format_date(Utc::now()))
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn restore(&self, id: &str, patch: &CreatorPatch) -> WorkerResult<()> {
        sqlx::query(
            "UPDATE creators
             SET deleted_at = NULL,
                 email = COALESCE(?, email),
                 phone = COALESCE(?, phone),
                 country = COALESCE(?, country),
                 category = COALESCE(?, category),
                 notes = COALESCE(?, notes),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.country.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.notes.as_deref())
        .bind(format_date(Utc::now()))
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn find_social(
        &self,
        platform: &str,
        handle: &str,
    ) -> WorkerResult<Option<CreatorSocial>> {
        let row = sqlx::query(
            "SELECT id, creator_id, platform, handle, url, followers,
                    deleted_at, created_at, updated_at
             FROM creator_socials
             WHERE platform = ? AND handle = ?",
        )
        .bind(platform)
        .bind(handle)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_social(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_social(&self, social: &CreatorSocial) -> WorkerResult<()> {
        sqlx::query(
            "INSERT INTO creator_socials (id, creator_id, platform, handle, url, followers, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&social.id)
        .bind(&social.creator_id)
        .bind(&social.platform)
        .bind(&social.handle)
        .bind(social.url.as_deref())
        .bind(social.followers)
        .bind(format_date(social.created_at))
        .bind(format_date(social.updated_at))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn merge_update_social(
        &self,
        id: &str,
        patch: &CreatorSocialPatch,
    ) -> WorkerResult<()> {
        sqlx::query(
            "UPDATE creator_socials
             SET url = COALESCE(?, url),
                 followers = COALESCE(?, followers),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.url.as_deref())
        .bind(patch.followers)
        .bind(format_date(Utc::now()))
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn restore_social(
        &self,
        id: &str,
        creator_id: &str,
        patch: &CreatorSocialPatch,
    ) -> WorkerResult<()> {
        sqlx::query(
            "UPDATE creator_socials
             SET deleted_at = NULL,
                 creator_id = ?,
                 url = COALESCE(?, url),
                 followers = COALESCE(?, followers),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(creator_id)
        .bind(patch.url.as_deref())
        .bind(patch.followers)
        .bind(format_date(Utc::now()))
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
