//! Mock adapters for integration tests.
//!
//! Records every outbound notification and event so tests can assert on
//! the full history without touching the Bluedroid stack.

use tappie::app::dispatcher::ChannelId;
use tappie::app::events::AppEvent;
use tappie::app::ports::{EventSink, NotifyError, NotifyPort};

// ── MockNotifyPort ────────────────────────────────────────────

pub struct MockNotifyPort {
    pub sent: Vec<(ChannelId, String)>,
    /// When set, every notify fails with this error.
    pub fail_with: Option<NotifyError>,
}

#[allow(dead_code)]
impl MockNotifyPort {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            fail_with: None,
        }
    }

    pub fn last(&self) -> Option<&(ChannelId, String)> {
        self.sent.last()
    }

    /// Payloads sent on one channel, in order.
    pub fn payloads_for(&self, channel: ChannelId) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, p)| p.as_str())
            .collect()
    }
}

impl Default for MockNotifyPort {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyPort for MockNotifyPort {
    fn notify(&mut self, channel: ChannelId, payload: &str) -> Result<(), NotifyError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent.push((channel, payload.to_string()));
        Ok(())
    }
}

// ── CollectingSink ────────────────────────────────────────────

pub struct CollectingSink {
    pub events: Vec<String>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events.iter().any(|e| e.contains(needle))
    }
}

impl Default for CollectingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(format!("{:?}", event));
    }
}
