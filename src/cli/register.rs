//! Repository registration command

use super::helpers::build_service;
use reposcore_core::{config::Settings, Result};

pub async fn handle(mut settings: Settings, html_url: String) -> Result<()> {
    let service = build_service(&mut settings).await?;
    let id = service.register_repository(&html_url).await?;
    println!("{}", id);
    Ok(())
}
