use crate::engine::{EngineError, ErrorCode};
use anyhow::{anyhow, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs;

pub const SEQUENCE_COLUMN: &str = "Promoter Sequences";
pub const RAW_STRENGTH_COLUMN: &str = "Predicted Strength";
pub const QUALITY_COLUMN: &str = "Score";

/// One candidate promoter as stored in the catalog. The sequence is opaque
/// text; it is never validated as DNA.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PromoterRecord {
    pub sequence: String,
    pub predicted_strength: f64,
    pub quality_score: f64,
}

/// The full table of candidate promoters for one invocation, in file order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<PromoterRecord>,
}

impl Catalog {
    pub fn from_records(records: Vec<PromoterRecord>) -> Self {
        Self { records }
    }

    pub fn from_csv_file(path: &str) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path).map_err(|e| EngineError {
            code: ErrorCode::DataUnavailable,
            message: format!("Could not read promoter catalog '{path}': {e}"),
        })?;
        Self::from_csv_text(&text)
    }

    // Either the whole table parses or the load fails.
    pub fn from_csv_text(text: &str) -> Result<Self, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| EngineError {
                code: ErrorCode::SchemaInvalid,
                message: format!("Could not read promoter catalog headers: {e}"),
            })?
            .clone();
        let sequence_col = Self::column_index(&headers, SEQUENCE_COLUMN)?;
        let strength_col = Self::column_index(&headers, RAW_STRENGTH_COLUMN)?;
        let quality_col = Self::column_index(&headers, QUALITY_COLUMN)?;

        let mut records = Vec::new();
        for (row_num, row) in rdr.records().enumerate() {
            let row = row.map_err(|e| EngineError {
                code: ErrorCode::SchemaInvalid,
                message: format!("Bad promoter catalog row {}: {e}", row_num + 2),
            })?;
            let record = Self::parse_row(&row, sequence_col, strength_col, quality_col).map_err(
                |e| EngineError {
                    code: ErrorCode::SchemaInvalid,
                    message: format!("Bad promoter catalog row {}: {e}", row_num + 2),
                },
            )?;
            records.push(record);
        }

        Ok(Self { records })
    }

    #[inline(always)]
    pub fn records(&self) -> &[PromoterRecord] {
        &self.records
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, EngineError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| EngineError {
                code: ErrorCode::SchemaInvalid,
                message: format!("Promoter catalog is missing required column '{name}'"),
            })
    }

    fn parse_row(
        row: &csv::StringRecord,
        sequence_col: usize,
        strength_col: usize,
        quality_col: usize,
    ) -> Result<PromoterRecord> {
        let field = |col: usize| {
            row.get(col)
                .ok_or_else(|| anyhow!("missing value in column {}", col + 1))
        };
        let sequence = field(sequence_col)?.trim().to_string();
        let predicted_strength = field(strength_col)?
            .trim()
            .parse::<f64>()
            .map_err(|e| anyhow!("invalid predicted strength: {e}"))?;
        let quality_score = field(quality_col)?
            .trim()
            .parse::<f64>()
            .map_err(|e| anyhow!("invalid quality score: {e}"))?;
        Ok(PromoterRecord {
            sequence,
            predicted_strength,
            quality_score,
        })
    }
}
