//! In-memory chat log and plain-text export.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Local, NaiveDate, Timelike};

use crate::dispatch::{PlaceholderHandle, RenderSink};
use crate::message::{Message, Sender};

const HEADER: &str = "=== 청년이음 대화 기록 ===";
const RULE: &str = "========================";

/// Error text when there is nothing to export.
pub const EMPTY_TRANSCRIPT: &str = "저장할 대화 내용이 없습니다.";

/// Rendered messages, excluding loading placeholders.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    placeholders: Vec<PlaceholderHandle>,
    next_placeholder: u64,
    idle_hidden: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Whether the idle (welcome) view would be shown.
    pub fn shows_idle_view(&self) -> bool {
        !self.idle_hidden
    }

    /// Formats the transcript for saving.
    ///
    /// # Errors
    /// Returns an error if there are no messages.
    pub fn export_text(&self, saved_at: DateTime<Local>) -> Result<String> {
        if self.messages.is_empty() {
            bail!(EMPTY_TRANSCRIPT);
        }

        let mut out = format!("{HEADER}\n저장 시간: {}\n{RULE}\n\n", korean_timestamp(saved_at));
        for message in &self.messages {
            let sender = match message.sender() {
                Sender::Bot => "🤖 선배봇",
                Sender::User => "👤 나",
            };
            out.push_str(sender);
            out.push_str(":\n");
            out.push_str(message.text().trim());
            out.push_str("\n\n");
        }
        Ok(out)
    }

    /// Writes the transcript into `dir` and returns the file path.
    ///
    /// # Errors
    /// Returns an error if the transcript is empty or the file cannot be
    /// written.
    pub fn save_to(&self, dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
        let text = self.export_text(now)?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let path = dir.join(export_file_name(now.naive_utc().date()));
        fs::write(&path, text)
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        tracing::info!(path = %path.display(), messages = self.messages.len(), "transcript saved");
        Ok(path)
    }
}

impl RenderSink for Transcript {
    fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    fn clear(&mut self) {
        self.messages.clear();
        self.placeholders.clear();
    }

    fn show_loading_placeholder(&mut self) -> PlaceholderHandle {
        self.next_placeholder += 1;
        let handle = PlaceholderHandle(self.next_placeholder);
        self.placeholders.push(handle);
        handle
    }

    fn remove_loading_placeholder(&mut self, handle: PlaceholderHandle) {
        self.placeholders.retain(|h| *h != handle);
    }

    fn hide_idle_view(&mut self) {
        self.idle_hidden = true;
    }

    fn show_idle_view(&mut self) {
        self.idle_hidden = false;
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("청년이음_대화기록_{}.txt", date.format("%Y-%m-%d"))
}

/// `2026. 3. 9. 오후 2:05:07`
fn korean_timestamp(at: DateTime<Local>) -> String {
    let (is_pm, hour) = at.hour12();
    format!(
        "{}. {}. {}. {} {}:{:02}:{:02}",
        at.year(),
        at.month(),
        at.day(),
        if is_pm { "오후" } else { "오전" },
        hour,
        at.minute(),
        at.second()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, h, m, s).single().unwrap()
    }

    fn sample() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("안녕"));
        transcript.append(Message::bot("반가워요\n"));
        transcript
    }

    #[test]
    fn test_export_format() {
        let text = sample().export_text(at(14, 5, 7)).unwrap();
        assert_eq!(
            text,
            "=== 청년이음 대화 기록 ===\n\
             저장 시간: 2026. 3. 9. 오후 2:05:07\n\
             ========================\n\n\
             👤 나:\n안녕\n\n\
             🤖 선배봇:\n반가워요\n\n"
        );
    }

    #[test]
    fn test_morning_timestamp() {
        assert_eq!(korean_timestamp(at(0, 30, 0)), "2026. 3. 9. 오전 12:30:00");
    }

    #[test]
    fn test_empty_export_fails() {
        let err = Transcript::new().export_text(at(9, 0, 0)).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_TRANSCRIPT);
    }

    #[test]
    fn test_placeholders_are_not_exported() {
        let mut transcript = sample();
        let handle = transcript.show_loading_placeholder();
        assert!(transcript.is_loading());
        assert_eq!(transcript.messages().len(), 2);

        transcript.remove_loading_placeholder(handle);
        transcript.remove_loading_placeholder(handle);
        assert!(!transcript.is_loading());
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(export_file_name(date), "청년이음_대화기록_2026-10-18.txt");
    }

    #[test]
    fn test_save_to_writes_file() {
        let dir = TempDir::new().unwrap();
        let now = at(10, 0, 0);

        let path = sample().save_to(dir.path(), now).unwrap();

        assert!(path.starts_with(dir.path()));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(HEADER));
        assert!(written.contains("👤 나:\n안녕"));
    }

    #[test]
    fn test_idle_view_toggles() {
        let mut transcript = Transcript::new();
        assert!(transcript.shows_idle_view());
        transcript.hide_idle_view();
        assert!(!transcript.shows_idle_view());
        transcript.show_idle_view();
        assert!(transcript.shows_idle_view());
    }
}
