//! Delivery log aggregation and export.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::clock::Clock;
use crate::store::DeliveryLog;
use crate::types::{CampaignId, DeliveryOutcome, DeliveryRecord};

use super::BroadcastError;

/// Success and failure counts for one campaign across all its runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CampaignSummary {
    /// Records with outcome `ok`.
    pub success_count: usize,
    /// Records with outcome `error`.
    pub failure_count: usize,
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// One JSON object per line.
    JsonLines,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::JsonLines => "jsonl",
        }
    }
}

/// Flat export row. Timestamps are ISO-8601 UTC.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    campaign_id: &'a str,
    destination_id: &'a str,
    outcome: &'a str,
    error_detail: &'a str,
    timestamp: String,
}

impl<'a> From<&'a DeliveryRecord> for ExportRow<'a> {
    fn from(record: &'a DeliveryRecord) -> Self {
        Self {
            campaign_id: record.campaign_id.as_str(),
            destination_id: record.destination_id.as_str(),
            outcome: record.outcome.as_str(),
            error_detail: &record.error_detail,
            timestamp: record
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        }
    }
}

/// Count outcomes for `campaign_id` over a set of records.
pub fn count_outcomes(records: &[DeliveryRecord], campaign_id: &CampaignId) -> CampaignSummary {
    records
        .iter()
        .filter(|r| &r.campaign_id == campaign_id)
        .fold(CampaignSummary::default(), |mut acc, r| {
            match r.outcome {
                DeliveryOutcome::Success => acc.success_count = acc.success_count.saturating_add(1),
                DeliveryOutcome::Failure => acc.failure_count = acc.failure_count.saturating_add(1),
            }
            acc
        })
}

/// Summarize every dispatch run of a campaign.
///
/// # Errors
///
/// Returns [`BroadcastError::Store`] when the log cannot be read.
pub async fn summarize(
    log: &dyn DeliveryLog,
    campaign_id: &CampaignId,
) -> Result<CampaignSummary, BroadcastError> {
    let records = log.for_campaign(campaign_id).await?;
    Ok(count_outcomes(&records, campaign_id))
}

/// Full log snapshot in append order.
///
/// # Errors
///
/// Returns [`BroadcastError::Store`] when the log cannot be read.
pub async fn export_all(log: &dyn DeliveryLog) -> Result<Vec<DeliveryRecord>, BroadcastError> {
    Ok(log.snapshot().await?)
}

/// Write records as CSV with a header row, even when there are no records.
///
/// # Errors
///
/// Returns [`BroadcastError::Export`] when writing fails.
pub fn write_csv<W: Write>(records: &[DeliveryRecord], writer: W) -> Result<(), BroadcastError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record([
        "campaign_id",
        "destination_id",
        "outcome",
        "error_detail",
        "timestamp",
    ])
    .map_err(|e| BroadcastError::Export(e.to_string()))?;
    for record in records {
        csv.serialize(ExportRow::from(record))
            .map_err(|e| BroadcastError::Export(e.to_string()))?;
    }
    csv.flush()
        .map_err(|e| BroadcastError::Export(e.to_string()))?;
    Ok(())
}

/// Write records as JSON lines.
///
/// # Errors
///
/// Returns [`BroadcastError::Export`] when serialization or writing fails.
pub fn write_json_lines<W: Write>(
    records: &[DeliveryRecord],
    mut writer: W,
) -> Result<(), BroadcastError> {
    for record in records {
        serde_json::to_writer(&mut writer, &ExportRow::from(record))
            .map_err(|e| BroadcastError::Export(e.to_string()))?;
        writer
            .write_all(b"\n")
            .map_err(|e| BroadcastError::Export(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| BroadcastError::Export(e.to_string()))?;
    Ok(())
}

/// Write the full log to `deliveries_<unix-ts>.<ext>` inside `dir`.
///
/// Creates `dir` when missing and returns the written file's path. An
/// existing export is never overwritten: a second export in the same second
/// gets a `_1`, `_2`, ... suffix.
///
/// # Errors
///
/// Returns [`BroadcastError::Export`] on I/O failure or
/// [`BroadcastError::Store`] when the log cannot be read.
pub async fn export_to_file(
    log: &dyn DeliveryLog,
    dir: &Path,
    format: ExportFormat,
    clock: &dyn Clock,
) -> Result<PathBuf, BroadcastError> {
    let records = export_all(log).await?;

    let mut buf = Vec::new();
    match format {
        ExportFormat::Csv => write_csv(&records, &mut buf)?,
        ExportFormat::JsonLines => write_json_lines(&records, &mut buf)?,
    }

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        BroadcastError::Export(format!("cannot create {}: {e}", dir.display()))
    })?;
    let stem = format!("deliveries_{}", clock.now().timestamp());
    let (path, mut file) = create_unique(dir, &stem, format.extension()).await?;

    file.write_all(&buf)
        .await
        .map_err(|e| BroadcastError::Export(format!("cannot write {}: {e}", path.display())))?;
    file.flush()
        .await
        .map_err(|e| BroadcastError::Export(format!("cannot write {}: {e}", path.display())))?;

    info!(path = %path.display(), records = records.len(), "delivery log exported");
    Ok(path)
}

/// Upper bound on same-second suffixes tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Create `<stem>.<ext>`, or the first free `<stem>_<n>.<ext>`.
async fn create_unique(
    dir: &Path,
    stem: &str,
    extension: &str,
) -> Result<(PathBuf, tokio::fs::File), BroadcastError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}_{attempt}.{extension}")
        };
        let path = dir.join(name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(BroadcastError::Export(format!(
                    "cannot create {}: {e}",
                    path.display()
                )))
            }
        }
    }
    Err(BroadcastError::Export(format!(
        "no free file name for {stem}.{extension} in {}",
        dir.display()
    )))
}
