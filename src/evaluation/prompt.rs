//! Built-in evaluation instruction

/// Instruction sent as the system message when a caller supplies none.
///
/// It pins the response to the JSON object the parser expects.
pub const DEFAULT_INSTRUCTION: &str = r#"You are a senior software engineer reviewing a code repository.
Evaluate the repository described in the user message and answer with a single JSON object and nothing else:

{
  "summary": "one or two sentences on the overall quality",
  "strengths": ["short bullet", "..."],
  "improvements": ["short bullet", "..."],
  "scores": {
    "readme": 0,
    "test": 0,
    "commit": 0,
    "cicd": 0
  }
}

Scoring rules:
- readme: quality and completeness of the documentation
- test: presence and depth of automated tests
- commit: clarity and granularity of the commit history
- cicd: build, test and release automation
Each score is an integer from 0 to 25. Do not use decimals. Do not wrap the JSON in markdown."#;

/// Caller-supplied instruction, or [`DEFAULT_INSTRUCTION`] when absent or blank
pub fn instruction_or_default(prompt: Option<&str>) -> &str {
    prompt
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_names_every_score_key() {
        for field in crate::types::ScoreField::ALL {
            assert!(DEFAULT_INSTRUCTION.contains(&format!("\"{}\"", field.key())));
        }
        assert!(DEFAULT_INSTRUCTION.contains("0 to 25"));
    }

    #[test]
    fn test_blank_or_missing_prompt_uses_default() {
        assert_eq!(instruction_or_default(None), DEFAULT_INSTRUCTION);
        assert_eq!(instruction_or_default(Some("")), DEFAULT_INSTRUCTION);
        assert_eq!(instruction_or_default(Some(" \n\t")), DEFAULT_INSTRUCTION);
        assert_eq!(instruction_or_default(Some("Score it")), "Score it");
    }
}
