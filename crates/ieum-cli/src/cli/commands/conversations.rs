//! Conversation history command handlers.

use anyhow::{Context, Result, bail};
use ieum_core::api::BackendClient;
use ieum_core::conversations::{self, ConversationState, EMPTY_LIST, RenameOutcome};
use ieum_core::dispatch::DispatchState;
use ieum_core::transcript::Transcript;

use crate::modes::chat::sender_prefix;

pub async fn list(client: &BackendClient) {
    let mut state = ConversationState::new();
    conversations::load_list(client, &mut state).await;

    let entries = state.entries();
    if entries.is_empty() {
        println!("{EMPTY_LIST}");
        return;
    }
    for (entry, item) in entries.iter().zip(&state.items) {
        let created = item.created_at.as_deref().unwrap_or("-");
        println!("{}  {}  {}", entry.id, entry.title, created);
    }
}

pub async fn show(client: &BackendClient, id: &str) -> Result<()> {
    let messages = client
        .load_conversation(id)
        .await
        .with_context(|| format!("load conversation '{id}'"))?;
    if messages.is_empty() {
        println!("Conversation '{id}' is empty.");
        return Ok(());
    }
    for message in messages {
        println!("{}{}", sender_prefix(message.sender()), message.text());
    }
    Ok(())
}

pub async fn new(client: &BackendClient) -> Result<()> {
    let created = client
        .create_conversation()
        .await
        .context("create conversation")?;
    match created.conversation_id {
        Some(id) => println!("Created conversation {id}"),
        None => println!("Started a new conversation (no id was returned)"),
    }
    Ok(())
}

pub async fn rename(client: &BackendClient, id: &str, title: &str) -> Result<()> {
    let mut state = ConversationState::new();
    match conversations::rename(client, &mut state, id, title).await {
        RenameOutcome::Renamed => {
            println!(
                "Renamed conversation {id} → {}",
                conversations::display_title(Some(title.trim()))
            );
            Ok(())
        }
        RenameOutcome::Skipped => bail!("Title must not be empty"),
        RenameOutcome::RenamedLocally => bail!("Backend rejected renaming conversation '{id}'"),
        RenameOutcome::Failed => bail!("Failed to rename conversation '{id}'"),
    }
}

pub async fn delete(client: &BackendClient, id: &str) -> Result<()> {
    let mut state = ConversationState::new();
    let mut dispatch = DispatchState::new();
    let mut sink = Transcript::new();

    if !conversations::delete(client, &mut state, &mut dispatch, &mut sink, id).await {
        bail!("Failed to delete conversation '{id}'");
    }
    println!("Deleted conversation {id}");
    Ok(())
}
