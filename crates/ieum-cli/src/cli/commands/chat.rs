//! Chat command handler.

use std::io;

use anyhow::{Context, Result};
use ieum_core::api::BackendClient;
use ieum_core::config::Config;
use tokio::io::BufReader;

use crate::modes;

pub async fn run(client: BackendClient, config: &Config) -> Result<()> {
    tracing::info!(base_url = client.base_url(), "starting chat");
    let input = BufReader::new(tokio::io::stdin());
    modes::run_chat(input, io::stdout(), client, config.export_dir())
        .await
        .context("interactive chat failed")
}
