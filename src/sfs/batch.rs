//! # Multi-item commands
//!
//! Commands such as `sfs delete a b c` act on every item even when some of
//! them fail. [`Batch`] collects one [`CmdMessage`] per item and, once every
//! item has been attempted, [`Batch::finish`] turns any failures into a single
//! aggregate error. Items that succeeded are never rolled back.

use crate::error::{Result, SfsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug)]
pub struct Batch {
    singular: &'static str,
    plural: &'static str,
    verb: &'static str,
    attempted: usize,
    failed: usize,
    messages: Vec<CmdMessage>,
}

impl Batch {
    /// `Batch::new("share", "shares", "delete")`
    pub fn new(singular: &'static str, plural: &'static str, verb: &'static str) -> Self {
        Self {
            singular,
            plural,
            verb,
            attempted: 0,
            failed: 0,
            messages: Vec::new(),
        }
    }

    /// Records the outcome for `item`, keeping the value on success.
    pub fn record<T>(&mut self, item: &str, outcome: Result<T>) -> Option<T> {
        self.attempted += 1;
        match outcome {
            Ok(value) => {
                self.messages.push(CmdMessage::success(format!(
                    "Request to {} {} {} has been accepted.",
                    self.verb, self.singular, item
                )));
                Some(value)
            }
            Err(e) => {
                self.failed += 1;
                self.messages.push(CmdMessage::error(format!(
                    "Failed to {} {} {}: {}",
                    self.verb, self.singular, item, e
                )));
                None
            }
        }
    }

    /// Runs `action` for every item.
    pub fn run_all<I, S, F, T>(&mut self, items: I, mut action: F)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str) -> Result<T>,
    {
        for item in items {
            let item = item.as_ref();
            let outcome = action(item);
            self.record(item, outcome);
        }
    }

    pub fn messages(&self) -> &[CmdMessage] {
        &self.messages
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// `Ok` only when nothing failed.
    pub fn finish(&self) -> Result<()> {
        if self.failed == 0 {
            return Ok(());
        }
        let noun = if self.attempted == 1 {
            self.singular
        } else {
            self.plural
        };
        Err(SfsError::CommandError(format!(
            "{} of {} {} failed to {}.",
            self.failed, self.attempted, noun, self.verb
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(item: &str) -> Result<()> {
        if item.starts_with("bad") {
            Err(SfsError::NotFound(format!("{} not found", item)))
        } else {
            Ok(())
        }
    }

    #[test]
    fn succeeds_when_nothing_fails() {
        let mut batch = Batch::new("share", "shares", "delete");
        batch.run_all(["a", "b"], outcome);
        assert!(batch.finish().is_ok());
        assert_eq!(batch.messages().len(), 2);
        assert_eq!(
            batch.messages()[0].content,
            "Request to delete share a has been accepted."
        );
    }

    #[test]
    fn attempts_every_item_and_counts_failures() {
        let mut batch = Batch::new("share", "shares", "delete");
        batch.run_all(["a", "bad-1", "c"], outcome);
        assert_eq!(batch.attempted(), 3);
        assert_eq!(batch.failed(), 1);
        assert_eq!(
            batch.finish().unwrap_err().to_string(),
            "1 of 3 shares failed to delete."
        );
        assert_eq!(batch.messages()[1].level, MessageLevel::Error);
        assert_eq!(
            batch.messages()[1].content,
            "Failed to delete share bad-1: bad-1 not found"
        );
    }

    #[test]
    fn single_item_uses_singular_noun() {
        let mut batch = Batch::new("snapshot", "snapshots", "delete");
        batch.run_all(vec!["bad".to_string()], outcome);
        assert_eq!(
            batch.finish().unwrap_err().to_string(),
            "1 of 1 snapshot failed to delete."
        );
    }

    #[test]
    fn record_keeps_successful_values() {
        let mut batch = Batch::new("lock", "locks", "create");
        assert_eq!(batch.record("l1", Ok(7)), Some(7));
        assert_eq!(batch.record::<i32>("l2", Err(SfsError::CommandError("x".into()))), None);
        assert!(batch.finish().is_err());
    }
}
