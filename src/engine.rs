use crate::artifact;
use crate::catalog::Catalog;
use crate::strength::StrengthScale;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

pub const QUALITY_THRESHOLD: f64 = 80.0;
pub const PREVIEW_SIZE: usize = 10;
pub const MAX_SELECTION_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    DataUnavailable,
    SchemaInvalid,
    DegenerateScale,
    NoQualifyingRecords,
    InvalidRequest,
    Io,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for EngineError {}

/// Whether low-quality promoters are removed before ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityFilter {
    /// All promoters proceed to ranking.
    #[default]
    None,
    /// Only promoters with a quality score above [`QUALITY_THRESHOLD`] are
    /// ranked. An empty survivor set is an error.
    Threshold,
}

/// Output order of the persisted selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionOrder {
    /// Selection keeps the ranked order.
    #[default]
    Ranked,
    /// The top slice is permuted before emitting, so the persisted order no
    /// longer reveals which promoter was closest to the target.
    Shuffled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub catalog_path: String,
    pub output_dir: String,
    pub quality_filter: QualityFilter,
    pub selection_order: SelectionOrder,
    /// Fixed seed for the shuffled selection order. `None` seeds from the
    /// wall clock on every invocation.
    pub shuffle_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: "data/all_promoters.csv".to_string(),
            output_dir: "output".to_string(),
            quality_filter: QualityFilter::None,
            selection_order: SelectionOrder::Ranked,
            shuffle_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub project_name: String,
    pub target_strength: f64,
    pub count: usize,
}

impl SelectionRequest {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.target_strength > 0.0 && self.target_strength <= 100.0) {
            return Err(EngineError {
                code: ErrorCode::InvalidRequest,
                message: format!(
                    "Target strength must be above 0 and at most 100, got {}",
                    self.target_strength
                ),
            });
        }
        if !(1..=MAX_SELECTION_COUNT).contains(&self.count) {
            return Err(EngineError {
                code: ErrorCode::InvalidRequest,
                message: format!(
                    "Promoter count must be between 1 and {MAX_SELECTION_COUNT}, got {}",
                    self.count
                ),
            });
        }
        Ok(())
    }
}

/// One promoter after normalization and distance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPromoter {
    pub sequence: String,
    pub normalized_strength: f64,
    pub quality_score: f64,
    pub distance: f64,
}

/// Output pair: the persisted artifact carries exactly these two columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPromoter {
    pub sequence: String,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub artifact_name: String,
    pub preview: Vec<SelectedPromoter>,
    pub selection: Vec<SelectedPromoter>,
}

/// The selection pipeline. Holds configuration only; every invocation loads
/// the catalog fresh and no state survives a call.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    config: EngineConfig,
}

impl SelectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one full selection: load, normalize, filter, rank, select,
    /// persist. Returns the artifact name, the deterministic preview and the
    /// persisted selection.
    pub fn select(&self, request: &SelectionRequest) -> Result<SelectionOutcome, EngineError> {
        request.validate()?;
        let catalog = Catalog::from_csv_file(&self.config.catalog_path)?;
        let ranked = self.rank(&catalog, request.target_strength)?;
        let preview = Self::preview(&ranked);
        let selection = self.select_top(&ranked, request.count);
        let artifact_name = artifact::write_selection(
            &self.config.output_dir,
            &request.project_name,
            request.target_strength,
            request.count,
            &selection,
        )?;
        Ok(SelectionOutcome {
            artifact_name,
            preview,
            selection,
        })
    }

    /// Normalizes, applies the quality filter and produces the total order:
    /// distance to target ascending, then (pass-through policy only) quality
    /// score descending. The sort is stable, so records with equal keys keep
    /// their catalog order.
    pub fn rank(
        &self,
        catalog: &Catalog,
        target_strength: f64,
    ) -> Result<Vec<RankedPromoter>, EngineError> {
        // The scale spans the whole catalog, not the post-filter survivors.
        let Some(scale) = StrengthScale::from_catalog(catalog)? else {
            return Ok(vec![]);
        };

        let mut ranked: Vec<RankedPromoter> = catalog
            .records()
            .iter()
            .map(|record| {
                let normalized_strength = scale.normalize(record.predicted_strength);
                RankedPromoter {
                    sequence: record.sequence.clone(),
                    normalized_strength,
                    quality_score: record.quality_score,
                    distance: (normalized_strength - target_strength).abs(),
                }
            })
            .collect();

        if self.config.quality_filter == QualityFilter::Threshold {
            ranked.retain(|r| r.quality_score > QUALITY_THRESHOLD);
            if ranked.is_empty() {
                return Err(EngineError {
                    code: ErrorCode::NoQualifyingRecords,
                    message: format!(
                        "No promoters with quality score above {QUALITY_THRESHOLD} in the catalog"
                    ),
                });
            }
        }

        match self.config.quality_filter {
            QualityFilter::None => ranked.sort_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(b.quality_score.total_cmp(&a.quality_score))
            }),
            // The survivors are already quality-gated; ties keep catalog order.
            QualityFilter::Threshold => ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance)),
        }

        Ok(ranked)
    }

    /// Takes the top `count` promoters of the ranked order. Under
    /// [`SelectionOrder::Shuffled`] the slice is permuted before emitting;
    /// the permutation never changes which promoters are selected.
    pub fn select_top(&self, ranked: &[RankedPromoter], count: usize) -> Vec<SelectedPromoter> {
        let mut top: Vec<SelectedPromoter> =
            ranked.iter().take(count).map(Self::to_selected).collect();
        if self.config.selection_order == SelectionOrder::Shuffled {
            let seed = self.config.shuffle_seed.unwrap_or_else(now_unix_secs);
            shuffle(&mut top, seed);
            // A permutation must not change the cardinality.
            top.truncate(count);
        }
        top
    }

    /// The first [`PREVIEW_SIZE`] promoters of the ranked order, unaffected
    /// by the selection order policy.
    pub fn preview(ranked: &[RankedPromoter]) -> Vec<SelectedPromoter> {
        ranked
            .iter()
            .take(PREVIEW_SIZE)
            .map(Self::to_selected)
            .collect()
    }

    fn to_selected(ranked: &RankedPromoter) -> SelectedPromoter {
        SelectedPromoter {
            sequence: ranked.sequence.clone(),
            strength: ranked.normalized_strength,
        }
    }
}

// Fisher-Yates driven by Knuth's MMIX LCG.
fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut state = seed;
    for i in (1..items.len()).rev() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = (state as usize) % (i + 1);
        items.swap(i, j);
    }
}

pub(crate) fn now_unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
