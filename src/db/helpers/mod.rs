use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::DESCRIPTOR_LEN;

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("failed to parse {field}"))
}

/// Reference descriptors are stored as a JSON array of float arrays.
pub fn parse_descriptors(value: Option<String>, field: &str) -> Result<Vec<Vec<f32>>> {
    let Some(raw) = value else {
        return Ok(Vec::new());
    };
    let descriptors: Vec<Vec<f32>> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {field}"))?;
    for descriptor in &descriptors {
        if descriptor.len() != DESCRIPTOR_LEN {
            return Err(anyhow!(
                "{field} contains a descriptor of length {} (expected {DESCRIPTOR_LEN})",
                descriptor.len()
            ));
        }
    }
    Ok(descriptors)
}

pub fn descriptors_to_json(descriptors: &[Vec<f32>]) -> Result<Option<String>> {
    if descriptors.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(descriptors)
        .context("failed to serialize descriptors")
        .map(Some)
}
