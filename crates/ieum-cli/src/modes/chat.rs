//! Interactive chat REPL.
//!
//! Input is read asynchronously so `:stop` and Ctrl+C stay live while an
//! answer is pending. Each send runs on its own task and reports back over a
//! channel; the loop settles it with the dispatch reducer.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use ieum_core::api::{ApiResult, AskResponse, BackendClient};
use ieum_core::conversations::{self, ConversationState, EMPTY_LIST};
use ieum_core::dispatch::{
    DispatchState, InputCollector, LineBuffer, PlaceholderHandle, RenderSink, SendTicket,
    Settlement, Submit, reducer,
};
use ieum_core::interrupt;
use ieum_core::message::{Message, Sender};
use ieum_core::transcript::Transcript;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

pub const QUIT_COMMAND: &str = ":q";
const STOP_COMMAND: &str = ":stop";
const NEW_COMMAND: &str = ":new";
const LIST_COMMAND: &str = ":list";
const OPEN_COMMAND: &str = ":open";
const SAVE_COMMAND: &str = ":save";
const HELP_COMMAND: &str = ":help";

pub const PROMPT_PREFIX: &str = "you> ";
pub const ASSISTANT_PREFIX: &str = "assistant> ";
const LOADING_TEXT: &str = "...";

const HELP_TEXT: &str = "\
Commands:
  :stop         stop the pending answer
  :new          start a new conversation
  :list         list saved conversations
  :open <id>    open a saved conversation
  :save         save this chat as a text file
  :q            quit";

pub(crate) fn sender_prefix(sender: Sender) -> &'static str {
    match sender {
        Sender::User => PROMPT_PREFIX,
        Sender::Bot => ASSISTANT_PREFIX,
    }
}

/// Prints bot output to a terminal while keeping the full transcript.
///
/// User lines are already on screen as typed, so they are only echoed when
/// replaying a saved conversation.
pub struct TerminalSink<W: Write> {
    out: W,
    transcript: Transcript,
    echo_user: bool,
    error: Option<io::Error>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            transcript: Transcript::new(),
            echo_user: false,
            error: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_none()
            && let Err(e) = writeln!(self.out, "{args}")
        {
            self.error = Some(e);
        }
    }

    fn prompt(&mut self) {
        if self.error.is_none()
            && let Err(e) = write!(self.out, "{PROMPT_PREFIX}").and_then(|()| self.out.flush())
        {
            self.error = Some(e);
        }
    }

    /// Surfaces the first write error since the last check.
    fn check(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn append(&mut self, message: Message) {
        if message.is_bot() || self.echo_user {
            self.line(format_args!(
                "{}{}",
                sender_prefix(message.sender()),
                message.text()
            ));
        }
        self.transcript.append(message);
    }

    fn clear(&mut self) {
        self.transcript.clear();
    }

    fn show_loading_placeholder(&mut self) -> PlaceholderHandle {
        self.line(format_args!("{ASSISTANT_PREFIX}{LOADING_TEXT}"));
        self.transcript.show_loading_placeholder()
    }

    fn remove_loading_placeholder(&mut self, handle: PlaceholderHandle) {
        self.transcript.remove_loading_placeholder(handle);
    }

    fn hide_idle_view(&mut self) {
        self.transcript.hide_idle_view();
    }

    fn show_idle_view(&mut self) {
        self.transcript.show_idle_view();
        self.line(format_args!("청년이음 선배봇 (ieum chat)"));
        self.line(format_args!("Type :help for commands, :q to quit."));
    }
}

struct Completion {
    ticket: SendTicket,
    result: ApiResult<AskResponse>,
}

enum Event {
    Line(String),
    Eof,
    Interrupt,
    Completed(Completion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct ChatRepl<W: Write> {
    client: BackendClient,
    dispatch: DispatchState,
    conversations: ConversationState,
    sink: TerminalSink<W>,
    input: LineBuffer,
    export_dir: PathBuf,
    completions: mpsc::UnboundedSender<Completion>,
    /// Quit once the pending answer settles; `true` prints the farewell.
    pending_quit: Option<bool>,
}

/// Runs the chat loop until `:q`, EOF or an idle Ctrl+C.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn run_chat<R, W>(
    input: R,
    output: W,
    client: BackendClient,
    export_dir: PathBuf,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut repl = ChatRepl {
        client,
        dispatch: DispatchState::new(),
        conversations: ConversationState::new(),
        sink: TerminalSink::new(output),
        input: LineBuffer::new(),
        export_dir,
        completions: tx,
        pending_quit: None,
    };
    let mut lines = input.lines();
    let mut input_open = true;

    repl.sink.show_idle_view();
    repl.sink.prompt();
    repl.sink.check().context("write output")?;

    loop {
        let event = tokio::select! {
            biased;
            Some(done) = rx.recv() => Event::Completed(done),
            () = interrupt::wait_for_interrupt() => Event::Interrupt,
            line = lines.next_line(), if input_open => match line.context("read input")? {
                Some(line) => Event::Line(line),
                None => Event::Eof,
            },
        };

        let flow = match event {
            Event::Completed(done) => repl.settle(done),
            Event::Interrupt => {
                interrupt::reset();
                repl.interrupt()
            }
            Event::Eof => {
                input_open = false;
                repl.request_quit(false)
            }
            Event::Line(line) => repl.handle_line(&line).await,
        };

        repl.sink.check().context("write output")?;
        if flow == Flow::Quit {
            break;
        }
    }

    Ok(())
}

impl<W: Write> ChatRepl<W> {
    async fn handle_line(&mut self, line: &str) -> Flow {
        let trimmed = line.trim();
        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (trimmed, ""),
        };

        match command {
            QUIT_COMMAND => return self.request_quit(true),
            STOP_COMMAND => self.press_stop(),
            NEW_COMMAND => self.new_conversation().await,
            LIST_COMMAND => self.list().await,
            OPEN_COMMAND => self.open(arg).await,
            SAVE_COMMAND => self.save(),
            HELP_COMMAND => self.sink.line(format_args!("{HELP_TEXT}")),
            _ if command.starts_with(':') => {
                self.sink.line(format_args!(
                    "Unknown command {command}. Type {HELP_COMMAND} for commands."
                ));
            }
            _ => {
                let outcome =
                    reducer::submit(&mut self.dispatch, line, &mut self.sink, &mut self.input);
                self.start_or_report(outcome);
            }
        }

        self.prompt_if_idle();
        Flow::Continue
    }

    /// Send/stop control. Typed lines never stay in the buffer, so when idle
    /// this has nothing to send.
    fn press_stop(&mut self) {
        let outcome = reducer::dispatch(&mut self.dispatch, &mut self.sink, &mut self.input);
        self.start_or_report(outcome);
    }

    fn start_or_report(&mut self, outcome: Submit) {
        match outcome {
            Submit::Started(ticket) => self.spawn_send(ticket),
            Submit::CancelRequested => {
                self.input.clear();
                self.sink.line(format_args!("(stopping the pending answer)"));
            }
            Submit::Ignored => {}
        }
    }

    fn spawn_send(&self, ticket: SendTicket) {
        let client = self.client.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = client.ask(&ticket.question, ticket.cancel.clone()).await;
            // The loop may already be gone on shutdown.
            let _ = completions.send(Completion { ticket, result });
        });
    }

    fn settle(&mut self, done: Completion) -> Flow {
        let settlement = reducer::complete(
            &mut self.dispatch,
            done.ticket,
            done.result,
            &mut self.sink,
            &mut self.input,
        );
        if settlement == Settlement::Stale {
            return Flow::Continue;
        }
        if let Some(farewell) = self.pending_quit {
            return self.quit(farewell);
        }
        self.sink.prompt();
        Flow::Continue
    }

    fn interrupt(&mut self) -> Flow {
        if reducer::cancel(&self.dispatch) {
            Flow::Continue
        } else {
            self.sink.line(format_args!(""));
            self.quit(true)
        }
    }

    fn request_quit(&mut self, farewell: bool) -> Flow {
        if self.dispatch.is_sending() {
            // EOF after `:q` must not drop the farewell.
            self.pending_quit = Some(self.pending_quit.unwrap_or(false) || farewell);
            Flow::Continue
        } else {
            self.quit(farewell)
        }
    }

    fn quit(&mut self, farewell: bool) -> Flow {
        if farewell {
            self.sink.line(format_args!("Goodbye!"));
        }
        Flow::Quit
    }

    fn prompt_if_idle(&mut self) {
        if !self.dispatch.is_sending() && self.pending_quit.is_none() {
            self.sink.prompt();
        }
    }

    async fn new_conversation(&mut self) {
        let id = conversations::new_conversation(
            &self.client,
            &mut self.conversations,
            &mut self.dispatch,
            &mut self.sink,
        )
        .await;
        if let Some(id) = id {
            self.sink.line(format_args!("New conversation {id}"));
        }
    }

    async fn list(&mut self) {
        conversations::load_list(&self.client, &mut self.conversations).await;
        let entries = self.conversations.entries();
        if entries.is_empty() {
            self.sink.line(format_args!("{EMPTY_LIST}"));
            return;
        }
        for entry in entries {
            let marker = if entry.active { '*' } else { ' ' };
            self.sink
                .line(format_args!("{marker} {}  {}", entry.title, entry.id));
        }
    }

    async fn open(&mut self, id: &str) {
        if id.is_empty() {
            self.sink.line(format_args!("Usage: {OPEN_COMMAND} <id>"));
            return;
        }
        self.sink.echo_user = true;
        let opened = conversations::open(
            &self.client,
            &mut self.conversations,
            &mut self.dispatch,
            &mut self.sink,
            id,
        )
        .await;
        self.sink.echo_user = false;
        if !opened {
            self.sink
                .line(format_args!("Could not load conversation {id}."));
        }
    }

    fn save(&mut self) {
        match self
            .sink
            .transcript()
            .save_to(&self.export_dir, Local::now())
        {
            Ok(path) => self.sink.line(format_args!("Saved to {}", path.display())),
            Err(e) => self.sink.line(format_args!("{e:#}")),
        }
    }
}
