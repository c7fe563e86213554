//! History inspection commands

use super::helpers::{build_service, repository_id};
use reposcore_core::{config::Settings, AnalysisId, Result};

/// Print the version list of a repository, newest first
pub async fn handle(mut settings: Settings, id: i64, format: String) -> Result<()> {
    let repository_id = repository_id(id)?;
    let service = build_service(&mut settings).await?;
    let versions = service.history_for(repository_id).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }

    if versions.is_empty() {
        println!("No analyses for repository {}", repository_id);
        return Ok(());
    }

    println!("{} analyses for repository {}:", versions.len(), repository_id);
    for version in versions {
        println!(
            "  {:<16} id {:<6} total {:>3}/100",
            version.version_label, version.analysis_id, version.total_score
        );
    }
    Ok(())
}

/// Print one analysis as JSON
pub async fn show(mut settings: Settings, id: i64) -> Result<()> {
    let service = build_service(&mut settings).await?;
    let record = service.analysis(AnalysisId(id)).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
