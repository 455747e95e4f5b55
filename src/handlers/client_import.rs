use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::entities::{Customer, CustomerPatch};
use crate::domain::errors::{WorkerError, WorkerResult};
use crate::domain::ports::CustomerStore;
use crate::handlers::fields::{DuplicateHandling, ImportConfig, MappedRow};
use crate::worker::context::JobContext;
use crate::worker::registry::JobHandler;

/// CSV bulk import for client records. One pass over the rows, each outcome
/// independent: create, merge-update, restore, duplicate-skip, blank-skip or
/// row error. Only configuration problems abort the job.
pub struct ClientImportHandler {
    customers: Arc<dyn CustomerStore>,
}

#[derive(Default)]
struct Counts {
    success: u64,
    created: u64,
    updated: u64,
    restored: u64,
    duplicates: u64,
    skipped: u64,
    errors: u64,
}

impl ClientImportHandler {
    pub fn new(customers: Arc<dyn CustomerStore>) -> Self {
        Self { customers }
    }

    fn patch_from_row(row: &MappedRow) -> WorkerResult<CustomerPatch> {
        Ok(CustomerPatch {
            industry: row.get_owned("industry"),
            contact_name: row.get_owned("contact_name"),
            contact_email: row.get_email("contact_email")?,
            phone: row.get_owned("phone"),
            website: row.get_owned("website"),
            notes: row.get_owned("notes"),
        })
    }

    async fn import_row(
        &self,
        row: &MappedRow,
        mode: DuplicateHandling,
        ctx: &JobContext,
        row_number: i64,
        counts: &mut Counts,
    ) -> WorkerResult<()> {
        let name = row.require("name")?;
        let patch = Self::patch_from_row(row)?;

        match self.customers.find_by_name(&name).await? {
            Some(existing) if existing.is_deleted() => {
                self.customers.restore(&existing.id, &patch).await?;
                counts.restored += 1;
                counts.success += 1;
                ctx.logger
                    .row_info(row_number, &format!("Restored client '{}'", name))
                    .await;
            }
            Some(existing) => match mode {
                DuplicateHandling::Skip => {
                    counts.duplicates += 1;
                    ctx.logger
                        .row_info(row_number, &format!("Skipped duplicate client '{}'", name))
                        .await;
                }
                DuplicateHandling::Update => {
                    self.customers.merge_update(&existing.id, &patch).await?;
                    counts.updated += 1;
                    counts.success += 1;
                    ctx.logger
                        .row_info(row_number, &format!("Updated client '{}'", name))
                        .await;
                }
            },
            None => {
                let mut customer = Customer::new(name.clone());
                customer.industry = patch.industry.clone();
                customer.contact_name = patch.contact_name.clone();
                customer.contact_email = patch.contact_email.clone();
                customer.phone = patch.phone.clone();
                customer.website = patch.website.clone();
                customer.notes = patch.notes.clone();
                self.customers.create(&customer).await?;
                counts.created += 1;
                counts.success += 1;
                ctx.logger
                    .row_info(row_number, &format!("Created client '{}'", name))
                    .await;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl JobHandler for ClientImportHandler {
    async fn execute(&self, ctx: &JobContext) -> WorkerResult<Value> {
        let config = ImportConfig::from_payload(&ctx.payload)?;
        let file = ctx.require_file()?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file.bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| WorkerError::Config(format!("unreadable CSV header: {}", e)))?
            .clone();

        let mut counts = Counts::default();

        for (index, record) in reader.records().enumerate() {
            let row_number = index as i64 + 1;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    counts.errors += 1;
                    ctx.logger
                        .row_error(row_number, &format!("Unparseable row: {}", e))
                        .await;
                    continue;
                }
            };

            let row = MappedRow::from_record(&headers, &record, &config.column_mapping);
            if row.is_empty() {
                counts.skipped += 1;
                continue;
            }

            if let Err(e) = self
                .import_row(&row, config.duplicate_handling, ctx, row_number, &mut counts)
                .await
            {
                counts.errors += 1;
                ctx.logger.row_error(row_number, &e.to_string()).await;
            }
        }

        Ok(json!({
            "successCount": counts.success,
            "createdClients": counts.created,
            "updatedClients": counts.updated,
            "restoredClients": counts.restored,
            "duplicateCount": counts.duplicates,
            "skippedCount": counts.skipped,
            "errorCount": counts.errors,
        }))
    }
}
