//! Evaluate-and-persist command

use super::helpers::{build_service, read_content, repository_id};
use reposcore_core::{config::Settings, instruction_or_default, Result};
use std::path::PathBuf;

/// Evaluate a registered repository and store the result
pub async fn handle(
    mut settings: Settings,
    id: i64,
    content: Option<String>,
    file: Option<PathBuf>,
    prompt: Option<String>,
    format: String,
) -> Result<()> {
    let repository_id = repository_id(id)?;
    let content = read_content(content, file)?;
    let instruction = instruction_or_default(prompt.as_deref());

    let service = build_service(&mut settings).await?;
    let record = service
        .evaluate_and_persist(repository_id, &content, instruction)
        .await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Analysis {} (repository {})", record.id, record.repository_id);
    println!("  Created: {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Summary: {}", record.summary);
    println!(
        "  Scores:  readme {} / test {} / commit {} / cicd {}  (total {}/100)",
        record.scores.readme(),
        record.scores.test(),
        record.scores.commit(),
        record.scores.cicd(),
        record.total_score()
    );
    for strength in &record.strengths {
        println!("  + {}", strength);
    }
    for improvement in &record.improvements {
        println!("  - {}", improvement);
    }
    Ok(())
}
