//! Response parser and validator
//!
//! Model output is untrusted text. It is decoded into a loose intermediate
//! shape first and then validated field by field into an
//! [`EvaluationResult`]. Nothing missing is ever defaulted: an absent score
//! is a malformed response, not a zero.
//!
//! Failure precedence, first match wins:
//! 1. [`MalformedResponse`](ReposcoreError::MalformedResponse): not a JSON
//!    object, `summary` absent or not a string, a score key missing or not
//!    an integer
//! 2. [`ScoreOutOfRange`](ReposcoreError::ScoreOutOfRange): readme, test,
//!    commit, cicd checked in that order
//! 3. [`EmptySummary`](ReposcoreError::EmptySummary)
//!
//! The summary and list items are trimmed and blank items dropped, so
//! `parse` normalizes: re-serializing its output parses back unchanged,
//! but an arbitrary [`EvaluationResult`] with padded or blank items does
//! not.

use crate::error::{ReposcoreError, Result};
use crate::types::{EvaluationResult, ScoreField, Scores};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Markdown fence lines such as ```` ```json ```` or a bare ```` ``` ````
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").expect("valid fence regex"));

/// Outermost `{ ... }` span, across newlines
static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object regex"));

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    #[serde(default)]
    summary: Option<Value>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    improvements: Option<Vec<String>>,
    #[serde(default)]
    scores: Option<Map<String, Value>>,
}

/// Parse raw model text into a validated evaluation
pub fn parse(raw: &str) -> Result<EvaluationResult> {
    let candidate = extract_json(raw);

    let value: Value = serde_json::from_str(&candidate)
        .map_err(|e| ReposcoreError::MalformedResponse(format!("not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ReposcoreError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }

    let raw: RawEvaluation = serde_json::from_value(value)
        .map_err(|e| ReposcoreError::MalformedResponse(format!("unexpected shape: {}", e)))?;

    let summary = match raw.summary {
        Some(Value::String(summary)) => summary,
        Some(_) => {
            return Err(ReposcoreError::MalformedResponse(
                "summary is not a string".to_string(),
            ))
        }
        None => {
            return Err(ReposcoreError::MalformedResponse(
                "summary is missing".to_string(),
            ))
        }
    };

    let scores = raw
        .scores
        .ok_or_else(|| ReposcoreError::MalformedResponse("scores is missing".to_string()))?;

    let mut values = [0i64; 4];
    for (slot, field) in values.iter_mut().zip(ScoreField::ALL) {
        *slot = score_value(&scores, field)?;
    }
    let [readme, test, commit, cicd] = values;
    let scores = Scores::new(readme, test, commit, cicd)?;

    let summary = summary.trim();
    if summary.is_empty() {
        return Err(ReposcoreError::EmptySummary);
    }

    Ok(EvaluationResult {
        summary: summary.to_string(),
        strengths: clean_items(raw.strengths),
        improvements: clean_items(raw.improvements),
        scores,
    })
}

/// Strip code fences and narrow to the outermost object when one exists
fn extract_json(raw: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(raw, "");
    match JSON_OBJECT.find(&unfenced) {
        Some(m) => m.as_str().to_string(),
        None => unfenced.trim().to_string(),
    }
}

fn score_value(scores: &Map<String, Value>, field: ScoreField) -> Result<i64> {
    let value = scores.get(field.key()).ok_or_else(|| {
        ReposcoreError::MalformedResponse(format!("score '{}' is missing", field))
    })?;

    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(v)
            } else if n.as_u64().is_some() {
                // Larger than i64::MAX; certainly out of range
                Ok(i64::MAX)
            } else {
                Err(ReposcoreError::MalformedResponse(format!(
                    "score '{}' is not an integer: {}",
                    field, n
                )))
            }
        }
        other => Err(ReposcoreError::MalformedResponse(format!(
            "score '{}' is not an integer: {}",
            field, other
        ))),
    }
}

fn clean_items(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
