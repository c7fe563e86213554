//! Raw completion command

use super::helpers::{build_service, read_content};
use reposcore_core::{config::Settings, Result};
use std::path::PathBuf;

/// Send content and instruction to the gateway and print the raw answer
pub async fn handle(
    mut settings: Settings,
    content: Option<String>,
    file: Option<PathBuf>,
    prompt: String,
) -> Result<()> {
    let content = read_content(content, file)?;
    let service = build_service(&mut settings).await?;

    let raw = service.complete_raw(&content, &prompt).await?;
    println!("{}", raw);
    Ok(())
}
