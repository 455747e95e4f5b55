use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::entities::{Creator, CreatorPatch, CreatorSocial, CreatorSocialPatch};
use crate::domain::errors::{WorkerError, WorkerResult};
use crate::domain::ports::CreatorStore;
use crate::handlers::fields::{DuplicateHandling, ImportConfig, MappedRow};
use crate::worker::context::JobContext;
use crate::worker::registry::JobHandler;

/// CSV bulk import for creators and their social accounts.
///
/// Rows carry a non-persisted grouping id so that one creator spread over
/// several rows (one per social account) becomes a single creator upsert plus
/// one social upsert per row. Socials are keyed by their unique platform +
/// handle pair, independent of the grouping id.
pub struct CreatorImportHandler {
    creators: Arc<dyn CreatorStore>,
}

/// One validated CSV row awaiting its group's creator resolution.
struct GroupedRow {
    row_number: i64,
    full_name: String,
    platform: String,
    handle: String,
    creator_patch: CreatorPatch,
    social_patch: CreatorSocialPatch,
}

#[derive(Default)]
struct Counts {
    success: u64,
    created_creators: u64,
    updated_creators: u64,
    restored_creators: u64,
    duplicates: u64,
    created_socials: u64,
    updated_socials: u64,
    restored_socials: u64,
    skipped: u64,
    errors: u64,
}

impl CreatorImportHandler {
    pub fn new(creators: Arc<dyn CreatorStore>) -> Self {
        Self { creators }
    }

    fn parse_row(row: &MappedRow, row_number: i64) -> WorkerResult<(String, GroupedRow)> {
        let grouping_id = row.require("creator_id")?;
        let full_name = row.require("full_name")?;
        let platform = row.require("platform")?;
        let handle = row.require("handle")?;

        let creator_patch = CreatorPatch {
            email: row.get_email("email")?,
            phone: row.get_owned("phone"),
            country: row.get_owned("country"),
            category: row.get_owned("category"),
            notes: row.get_owned("notes"),
        };
        let social_patch = CreatorSocialPatch {
            url: row.get_owned("url"),
            followers: row.get_count("followers")?,
        };

        Ok((
            grouping_id,
            GroupedRow {
                row_number,
                full_name,
                platform,
                handle,
                creator_patch,
                social_patch,
            },
        ))
    }

    /// Fold the group's rows into one creator patch: the first non-empty
    /// value per field wins.
    fn fold_creator_patch(rows: &[GroupedRow]) -> CreatorPatch {
        let mut folded = CreatorPatch::default();
        for row in rows {
            let p = &row.creator_patch;
            folded.email = folded.email.or_else(|| p.email.clone());
            folded.phone = folded.phone.or_else(|| p.phone.clone());
            folded.country = folded.country.or_else(|| p.country.clone());
            folded.category = folded.category.or_else(|| p.category.clone());
            folded.notes = folded.notes.or_else(|| p.notes.clone());
        }
        folded
    }

    /// Resolve the group to a persisted creator id via the restore / update /
    /// create / duplicate-skip branches. Skipping still yields the existing
    /// id so the group's socials have something to attach to.
    async fn upsert_creator(
        &self,
        rows: &[GroupedRow],
        mode: DuplicateHandling,
        ctx: &JobContext,
        counts: &mut Counts,
    ) -> WorkerResult<String> {
        let first = &rows[0];
        let full_name = first.full_name.clone();
        let patch = Self::fold_creator_patch(rows);

        match self.creators.find_by_name(&full_name).await? {
            Some(existing) if existing.is_deleted() => {
                self.creators.restore(&existing.id, &patch).await?;
                counts.restored_creators += 1;
                ctx.logger
                    .row_info(first.row_number, &format!("Restored creator '{}'", full_name))
                    .await;
                Ok(existing.id)
            }
            Some(existing) => {
                match mode {
                    DuplicateHandling::Skip => {
                        counts.duplicates += 1;
                        ctx.logger
                            .row_info(
                                first.row_number,
                                &format!("Skipped duplicate creator '{}'", full_name),
                            )
                            .await;
                    }
                    DuplicateHandling::Update => {
                        self.creators.merge_update(&existing.id, &patch).await?;
                        counts.updated_creators += 1;
                        ctx.logger
                            .row_info(
                                first.row_number,
                                &format!("Updated creator '{}'", full_name),
                            )
                            .await;
                    }
                }
                Ok(existing.id)
            }
            None => {
                let mut creator = Creator::new(full_name.clone());
                creator.email = patch.email.clone();
                creator.phone = patch.phone.clone();
                creator.country = patch.country.clone();
                creator.category = patch.category.clone();
                creator.notes = patch.notes.clone();
                self.creators.create(&creator).await?;
                counts.created_creators += 1;
                ctx.logger
                    .row_info(first.row_number, &format!("Created creator '{}'", full_name))
                    .await;
                Ok(creator.id)
            }
        }
    }

    async fn upsert_social(
        &self,
        creator_id: &str,
        row: &GroupedRow,
        ctx: &JobContext,
        counts: &mut Counts,
    ) -> WorkerResult<()> {
        match self.creators.find_social(&row.platform, &row.handle).await? {
            Some(existing) if existing.is_deleted() => {
                self.creators
                    .restore_social(&existing.id, creator_id, &row.social_patch)
                    .await?;
                counts.restored_socials += 1;
                ctx.logger
                    .row_info(
                        row.row_number,
                        &format!("Restored social @{} on {}", row.handle, row.platform),
                    )
                    .await;
            }
            Some(existing) => {
                self.creators
                    .merge_update_social(&existing.id, &row.social_patch)
                    .await?;
                counts.updated_socials += 1;
                ctx.logger
                    .row_info(
                        row.row_number,
                        &format!("Updated social @{} on {}", row.handle, row.platform),
                    )
                    .await;
            }
            None => {
                let mut social = CreatorSocial::new(
                    creator_id.to_string(),
                    row.platform.clone(),
                    row.handle.clone(),
                );
                social.url = row.social_patch.url.clone();
                social.followers = row.social_patch.followers;
                self.creators.create_social(&social).await?;
                counts.created_socials += 1;
                ctx.logger
                    .row_info(
                        row.row_number,
                        &format!("Created social @{} on {}", row.handle, row.platform),
                    )
                    .await;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl JobHandler for CreatorImportHandler {
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

        // Group rows by the CSV-only correlation key, preserving first-seen
        // order so log output follows the file.
        let mut group_order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<GroupedRow>> = HashMap::new();

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

            match Self::parse_row(&row, row_number) {
                Ok((grouping_id, grouped)) => {
                    if !groups.contains_key(&grouping_id) {
                        group_order.push(grouping_id.clone());
                    }
                    groups.entry(grouping_id).or_default().push(grouped);
                }
                Err(e) => {
                    counts.errors += 1;
                    ctx.logger.row_error(row_number, &e.to_string()).await;
                }
            }
        }

        for grouping_id in &group_order {
            let rows = &groups[grouping_id];

            let creator_id = match self
                .upsert_creator(rows, config.duplicate_handling, ctx, &mut counts)
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    // The whole group's socials have nothing to attach to.
                    counts.errors += rows.len() as u64;
                    ctx.logger
                        .row_error(rows[0].row_number, &e.to_string())
                        .await;
                    continue;
                }
            };

            for row in rows {
                match self.upsert_social(&creator_id, row, ctx, &mut counts).await {
                    Ok(()) => counts.success += 1,
                    Err(e) => {
                        counts.errors += 1;
                        ctx.logger.row_error(row.row_number, &e.to_string()).await;
                    }
                }
            }
        }

        Ok(json!({
            "successCount": counts.success,
            "createdCreators": counts.created_creators,
            "updatedCreators": counts.updated_creators,
            "restoredCreators": counts.restored_creators,
            "duplicateCount": counts.duplicates,
            "createdSocials": counts.created_socials,
            "updatedSocials": counts.updated_socials,
            "restoredSocials": counts.restored_socials,
            "skippedCount": counts.skipped,
            "errorCount": counts.errors,
        }))
    }
}
