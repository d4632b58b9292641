//! One-shot question handler.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result, bail};
use ieum_core::api::BackendClient;
use ieum_core::config::paths;
use ieum_core::dispatch::{Dispatched, LineBuffer, MessageDispatcher, Settlement};
use ieum_core::interrupt::{self, InterruptedError};
use ieum_core::transcript::Transcript;

/// Asks `question` and prints the bot reply.
///
/// Ctrl+C stops the pending answer and exits with status 130.
pub async fn run(client: BackendClient, question: &[String]) -> Result<()> {
    let question = question.join(" ");

    let mut dispatcher = MessageDispatcher::new(client);
    let mut transcript = Transcript::new();
    let mut input = LineBuffer::new();

    let outcome = dispatcher
        .submit_until(
            &question,
            &mut transcript,
            &mut input,
            interrupt::wait_for_interrupt(),
        )
        .await;

    let settlement = match outcome {
        Dispatched::Settled(settlement) => settlement,
        Dispatched::Ignored => bail!("No question provided"),
        Dispatched::CancelRequested => bail!("A question is already pending"),
    };

    if let Some(reply) = transcript.messages().last().filter(|m| m.is_bot()) {
        println!("{}", reply.text());
    }

    match settlement {
        Settlement::Answered | Settlement::Stale => Ok(()),
        Settlement::Cancelled => Err(InterruptedError.into()),
        Settlement::Failed => bail!(
            "Backend request failed (details in {})",
            paths::logs_dir().display()
        ),
    }
}

/// Reads the question from stdin when it is piped; `None` for a terminal.
///
/// # Errors
/// Returns an error if stdin cannot be read.
pub fn read_piped_stdin() -> Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .context("read question from stdin")?;
    Ok(Some(text))
}
