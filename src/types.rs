//! Core data types for reposcore
//!
//! An evaluation moves through three shapes: the validated
//! [`EvaluationResult`] produced by the parser, the [`AnalysisRecordDraft`]
//! handed to the history store, and the immutable [`AnalysisRecord`] the
//! store returns once identity and timestamp are assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) for every sub-score
pub const MAX_SUB_SCORE: i64 = 25;

/// Identity of an externally owned repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub i64);

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a persisted analysis, assigned monotonically by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(pub i64);

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Names of the four sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Readme,
    Test,
    Commit,
    Cicd,
}

impl ScoreField {
    /// Fields in validation order
    pub const ALL: [ScoreField; 4] = [
        ScoreField::Readme,
        ScoreField::Test,
        ScoreField::Commit,
        ScoreField::Cicd,
    ];

    /// Key used in the model's JSON payload
    pub fn key(&self) -> &'static str {
        match self {
            ScoreField::Readme => "readme",
            ScoreField::Test => "test",
            ScoreField::Commit => "commit",
            ScoreField::Cicd => "cicd",
        }
    }
}

impl std::fmt::Display for ScoreField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Four independent sub-scores, each within `0..=MAX_SUB_SCORE`
///
/// Fields are private so every value, including deserialized ones, passes
/// through [`Scores::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScores")]
pub struct Scores {
    readme: u8,
    test: u8,
    commit: u8,
    cicd: u8,
}

#[derive(Deserialize)]
struct RawScores {
    readme: i64,
    test: i64,
    commit: i64,
    cicd: i64,
}

impl TryFrom<RawScores> for Scores {
    type Error = crate::ReposcoreError;

    fn try_from(raw: RawScores) -> crate::Result<Self> {
        Scores::new(raw.readme, raw.test, raw.commit, raw.cicd)
    }
}

impl Scores {
    /// Build scores, rejecting the first field (in [`ScoreField::ALL`] order)
    /// that is out of bounds
    pub fn new(readme: i64, test: i64, commit: i64, cicd: i64) -> crate::Result<Self> {
        let check = |field: ScoreField, value: i64| -> crate::Result<u8> {
            if (0..=MAX_SUB_SCORE).contains(&value) {
                Ok(value as u8)
            } else {
                Err(crate::ReposcoreError::ScoreOutOfRange { field, value })
            }
        };

        Ok(Self {
            readme: check(ScoreField::Readme, readme)?,
            test: check(ScoreField::Test, test)?,
            commit: check(ScoreField::Commit, commit)?,
            cicd: check(ScoreField::Cicd, cicd)?,
        })
    }

    /// Bypasses the bounds; only for exercising store-side rejection
    #[cfg(test)]
    pub(crate) fn unchecked(readme: u8, test: u8, commit: u8, cicd: u8) -> Self {
        Self {
            readme,
            test,
            commit,
            cicd,
        }
    }

    /// Re-run the bounds check on an existing value
    pub fn check_bounds(&self) -> crate::Result<()> {
        Scores::new(
            i64::from(self.readme),
            i64::from(self.test),
            i64::from(self.commit),
            i64::from(self.cicd),
        )
        .map(|_| ())
    }

    pub fn readme(&self) -> u8 {
        self.readme
    }

    pub fn test(&self) -> u8 {
        self.test
    }

    pub fn commit(&self) -> u8 {
        self.commit
    }

    pub fn cicd(&self) -> u8 {
        self.cicd
    }

    pub fn get(&self, field: ScoreField) -> u8 {
        match field {
            ScoreField::Readme => self.readme,
            ScoreField::Test => self.test,
            ScoreField::Commit => self.commit,
            ScoreField::Cicd => self.cicd,
        }
    }

    /// Display composite, always within 0..=100
    pub fn total(&self) -> u32 {
        ScoreField::ALL.iter().map(|f| u32::from(self.get(*f))).sum()
    }
}

/// Validated outcome of parsing model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub scores: Scores,
}

/// Record content before the store assigns identity and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRecordDraft {
    pub repository_id: RepositoryId,
    pub evaluation: EvaluationResult,
}

impl AnalysisRecordDraft {
    pub fn new(repository_id: RepositoryId, evaluation: EvaluationResult) -> Self {
        Self {
            repository_id,
            evaluation,
        }
    }
}

/// Persisted, immutable evaluation of one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: AnalysisId,
    pub repository_id: RepositoryId,
    pub created_at: DateTime<Utc>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub scores: Scores,
}

impl AnalysisRecord {
    pub(crate) fn from_draft(
        id: AnalysisId,
        created_at: DateTime<Utc>,
        draft: AnalysisRecordDraft,
    ) -> Self {
        let EvaluationResult {
            summary,
            strengths,
            improvements,
            scores,
        } = draft.evaluation;

        Self {
            id,
            repository_id: draft.repository_id,
            created_at,
            summary,
            strengths,
            improvements,
            scores,
        }
    }

    pub fn total_score(&self) -> u32 {
        self.scores.total()
    }

    /// "Latest" ordering: later `created_at` wins, ties go to the higher id
    pub fn is_newer_than(&self, other: &AnalysisRecord) -> bool {
        (self.created_at, self.id) > (other.created_at, other.id)
    }
}

/// One entry of a repository's version history, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisVersion {
    pub analysis_id: AnalysisId,
    pub created_at: DateTime<Utc>,
    pub total_score: u32,
    pub version_label: String,
}

impl AnalysisVersion {
    /// Label newest-first records: of N records the newest is `vN`
    pub fn from_history(records: &[AnalysisRecord]) -> Vec<AnalysisVersion> {
        let count = records.len();
        records
            .iter()
            .enumerate()
            .map(|(index, record)| AnalysisVersion {
                analysis_id: record.id,
                created_at: record.created_at,
                total_score: record.total_score(),
                version_label: format!(
                    "v{} ({})",
                    count - index,
                    record.created_at.format("%Y-%m-%d")
                ),
            })
            .collect()
    }
}
