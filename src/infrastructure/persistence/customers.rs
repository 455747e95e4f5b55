use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::domain::entities::{Customer, CustomerPatch};
use crate::domain::errors::WorkerResult;
use crate::domain::ports::CustomerStore;
use crate::infrastructure::persistence::{
    format_date, parse_date_col, parse_opt_date_col, Database,
};

#[derive(Clone)]
pub struct SqlCustomerStore {
    db: Database,
}

impl SqlCustomerStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_customer(row: &sqlx::any::AnyRow) -> WorkerResult<Customer> {
        Ok(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            industry: row.try_get("industry").ok(),
            contact_name: row.try_get("contact_name").ok(),
            contact_email: row.try_get("contact_email").ok(),
            phone: row.try_get("phone").ok(),
            website: row.try_get("website").ok(),
            notes: row.try_get("notes").ok(),
            deleted_at: parse_opt_date_col(row, "deleted_at"),
            created_at: parse_date_col(row, "created_at")?,
            updated_at: parse_date_col(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl CustomerStore for SqlCustomerStore {
    async fn find_by_name(&self, name: &str) -> WorkerResult<Option<Customer>> {
        // Case-insensitive match; an active row wins over a deleted one.
        let row = sqlx::query(
            "SELECT id, name, industry, contact_name, contact_email, phone, website, notes,
                    deleted_at, created_at, updated_at
             FROM customers
             WHERE LOWER(name) = LOWER(?)
             ORDER BY CASE WHEN deleted_at IS NULL THEN 0 ELSE 1 END
             LIMIT 1",
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_customer(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, customer: &Customer) -> WorkerResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, industry, contact_name, contact_email, phone, website, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.industry.as_deref())
        .bind(customer.contact_name.as_deref())
        .bind(customer.contact_email.as_deref())
        .bind(customer.phone.as_deref())
        .bind(customer.website.as_deref())
        .bind(customer.notes.as_deref())
        .bind(format_date(customer.created_at))
        .bind(format_date(customer.updated_at))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn merge_update(&self, id: &str, patch: &CustomerPatch) -> WorkerResult<()> {
        // COALESCE keeps the stored value whenever the patch field is absent.
        sqlx::query(
            "UPDATE customers
             SET industry = COALESCE(?, industry),
                 contact_name = COALESCE(?, contact_name),
                 contact_email = COALESCE(?, contact_email),
                 phone = COALESCE(?, phone),
                 website = COALESCE(?, website),
                 notes = COALESCE(?, notes),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.industry.as_deref())
        .bind(patch.contact_name.as_deref())
        .bind(patch.contact_email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.website.as_deref())
        .bind(patch.notes.as_deref())
        .bind(format_date(Utc::now()))
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn restore(&self, id: &str, patch: &CustomerPatch) -> WorkerResult<()> {
        sqlx::query(
            "UPDATE customers
             SET deleted_at = NULL,
                 industry = COALESCE(?, industry),
                 contact_name = COALESCE(?, contact_name),
                 contact_email = COALESCE(?, contact_email),
                 phone = COALESCE(?, phone),
                 website = COALESCE(?, website),
                 notes = COALESCE(?, notes),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.industry.as_deref())
        .bind(patch.contact_name.as_deref())
        .bind(patch.contact_email.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.website.as_deref())
        .bind(patch.notes.as_deref())
        .bind(format_date(Utc::now()))
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
