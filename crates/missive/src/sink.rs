//! Message delivery.
//!
//! A [`MessageSink`] accepts `(recipient, content)` pairs and returns an id for
//! each accepted message. [`deliver`] pushes a whole batch through a sink in
//! recipient order and collects a [`DeliveryReport`]. Unlike rendering,
//! delivery does not stop at the first failure.

use std::collections::BTreeMap;
use std::io::Write;

use missive_render::RenderedMessages;
use thiserror::Error;

use crate::output::{write_messages, write_text_entry, MessageRow, OutputError, OutputMode};

/// Errors a sink can report for one message.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("recipient rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Destination for rendered messages.
pub trait MessageSink {
    /// Sends one message, returning an identifier for it.
    fn send(&mut self, recipient: &str, content: &str) -> Result<String, SinkError>;
}

/// Result of sending one message.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub recipient: String,
    /// Message id on success.
    pub result: Result<String, SinkError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-recipient outcomes of a [`deliver`] call, in recipient order.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of messages the sink accepted.
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of messages the sink rejected.
    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Sends every message through `sink`, sorted by recipient.
pub fn deliver<S>(sink: &mut S, messages: &RenderedMessages) -> DeliveryReport
where
    S: MessageSink + ?Sized,
{
    let ordered: BTreeMap<&str, &str> = messages
        .iter()
        .map(|(recipient, content)| (recipient.as_str(), content.as_str()))
        .collect();

    tracing::info!(total = ordered.len(), "starting delivery");

    let mut report = DeliveryReport::default();
    for (recipient, content) in ordered {
        let result = sink.send(recipient, content);
        match &result {
            Ok(id) => tracing::debug!(recipient, message_id = %id, "message sent"),
            Err(e) => tracing::error!(recipient, error = %e, "failed to send message"),
        }
        report.outcomes.push(DeliveryOutcome {
            recipient: recipient.to_string(),
            result,
        });
    }

    tracing::info!(
        total = report.total(),
        successful = report.successful(),
        failed = report.failed(),
        "delivery finished"
    );
    report
}

/// Preview sink that prints messages instead of sending them.
///
/// Text mode writes each message as it arrives. Structured modes need the whole
/// batch to produce one document, so messages are buffered until
/// [`finish`](Self::finish).
pub struct WriterSink<W: Write> {
    writer: W,
    mode: OutputMode,
    pending: Vec<MessageRow>,
    sent: usize,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, mode: OutputMode) -> Self {
        Self {
            writer,
            mode,
            pending: Vec::new(),
            sent: 0,
        }
    }

    /// Writes buffered messages, flushes, and returns the writer.
    pub fn finish(mut self) -> Result<W, OutputError> {
        if self.mode.is_structured() {
            write_messages(&mut self.writer, &self.pending, self.mode)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> MessageSink for WriterSink<W> {
    fn send(&mut self, recipient: &str, content: &str) -> Result<String, SinkError> {
        if self.mode.is_structured() {
            self.pending.push(MessageRow {
                recipient: recipient.to_string(),
                message: content.to_string(),
            });
        } else {
            write_text_entry(&mut self.writer, recipient, content, self.sent == 0)?;
        }
        self.sent += 1;
        Ok(format!("preview-{}", self.sent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records sends; rejects recipients listed in `reject`.
    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<(String, String)>,
        reject: Vec<&'static str>,
    }

    impl MessageSink for RecordingSink {
        fn send(&mut self, recipient: &str, content: &str) -> Result<String, SinkError> {
            if self.reject.iter().any(|r| *r == recipient) {
                return Err(SinkError::Rejected(format!("{} is not a member", recipient)));
            }
            self.sent.push((recipient.to_string(), content.to_string()));
            Ok(format!("msg-{}", self.sent.len()))
        }
    }

    fn messages(pairs: &[(&str, &str)]) -> RenderedMessages {
        pairs
            .iter()
            .map(|(r, c)| (r.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_deliver_in_recipient_order() {
        let mut sink = RecordingSink::default();
        let report = deliver(&mut sink, &messages(&[("carol", "c"), ("alice", "a"), ("bob", "b")]));

        let order: Vec<&str> = sink.sent.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(order, vec!["alice", "bob", "carol"]);
        assert_eq!(report.successful(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.outcomes()[0].result.as_deref().unwrap(), "msg-1");
    }

    #[test]
    fn test_deliver_continues_after_failure() {
        let mut sink = RecordingSink {
            reject: vec!["bob"],
            ..Default::default()
        };
        let report = deliver(&mut sink, &messages(&[("alice", "a"), ("bob", "b"), ("carol", "c")]));

        assert_eq!(report.total(), 3);
        assert_eq!(report.successful(), 2);
        assert_eq!(report.failed(), 1);

        let failed: Vec<&str> = report.failures().map(|o| o.recipient.as_str()).collect();
        assert_eq!(failed, vec!["bob"]);
        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_deliver_empty() {
        let mut sink = RecordingSink::default();
        let report = deliver(&mut sink, &RenderedMessages::new());
        assert_eq!(report.total(), 0);
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_writer_sink_text() {
        console::set_colors_enabled(false);
        let mut sink = WriterSink::new(Vec::new(), OutputMode::Text);
        let report = deliver(&mut sink, &messages(&[("bob", "Hi Bob"), ("alice", "Hi Alice")]));
        assert_eq!(report.successful(), 2);

        let out = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(out, "alice\nHi Alice\n\nbob\nHi Bob\n");
    }

    #[test]
    fn test_writer_sink_buffers_structured_output() {
        let mut sink = WriterSink::new(Vec::new(), OutputMode::Csv);
        sink.send("alice", "Hi").unwrap();
        assert!(sink.writer.is_empty());

        let out = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(out, "recipient,message\nalice,Hi\n");
    }
}
