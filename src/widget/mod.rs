pub mod simulator;
pub mod transport;

use log::{ info, warn };
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::llm::chat::first_choice_content;
use crate::models::chat::{ ChatMessage, TranscriptEntry };
use crate::models::relay::RelayRequest;
use self::simulator::simulate_reply;
use self::transport::{ RelayTransport, WidgetError };

pub const MAX_TURNS: u32 = 10;
pub const HISTORY_WINDOW: usize = 5;

pub const GREETING: &str =
    "Hi! I'm Jayesh's portfolio assistant. Ask me anything about his experience, projects, or skills.";

/// Shown when the turn budget runs out and whenever the relay fails.
pub const CONTACT_FALLBACK: &str =
    "I can't help further here, but Jayesh would love to hear from you directly: jayeshvishwakarma6028@gmail.com or linkedin.com/in/cmd-jayesh.";

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub max_turns: u32,
    pub history_window: usize,
    /// Pause before the turn-limit advisory appears.
    pub advisory_delay: Duration,
    /// Pause before a simulated reply appears.
    pub simulated_delay: Duration,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            max_turns: MAX_TURNS,
            history_window: HISTORY_WINDOW,
            advisory_delay: Duration::from_millis(500),
            simulated_delay: Duration::from_millis(800),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Idle,
    Sending,
}

/// Why a submission was not accepted. Rejections leave the widget untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    Blank,
    Busy,
    LimitReached,
}

/// Work left to do for an accepted submission.
#[derive(Debug, Clone)]
pub enum Pending {
    LimitAdvisory,
    Simulated(String),
    Relay(RelayRequest),
}

/// Client-side conversation state: transcript, turn budget and the
/// idle/sending gate. One instance per browser session.
pub struct ChatWidget {
    session_id: Uuid,
    config: WidgetConfig,
    transcript: Vec<TranscriptEntry>,
    turns: u32,
    state: WidgetState,
    transport: Option<Arc<dyn RelayTransport>>,
}

impl ChatWidget {
    pub fn new(config: WidgetConfig, transport: Option<Arc<dyn RelayTransport>>) -> Self {
        let session_id = Uuid::new_v4();
        info!(
            "Chat session {} started ({} mode)",
            session_id,
            if transport.is_some() { "relay" } else { "offline" }
        );
        Self {
            session_id,
            config,
            transcript: vec![TranscriptEntry::now(ChatMessage::assistant(GREETING))],
            turns: 0,
            state: WidgetState::Idle,
            transport,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn is_relay_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// The last `history_window` transcript messages, oldest first.
    pub fn outbound_payload(&self) -> RelayRequest {
        let skip = self.transcript.len().saturating_sub(self.config.history_window);
        RelayRequest {
            messages: self.transcript[skip..]
                .iter()
                .map(|entry| entry.message.clone())
                .collect(),
        }
    }

    /// Gate checks plus the user append. On success the widget is `Sending`
    /// until [`ChatWidget::complete`] is called.
    ///
    /// The submission that brings `turns` up to `max_turns` (the 10th by
    /// default) still records the user message and returns
    /// [`Pending::LimitAdvisory`], so the advisory is appended exactly once
    /// and no relay call is made. Every later attempt returns
    /// [`Rejected::LimitReached`] and leaves the transcript untouched.
    pub fn begin(&mut self, text: &str) -> Result<Pending, Rejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejected::Blank);
        }
        if self.state == WidgetState::Sending {
            return Err(Rejected::Busy);
        }
        if self.turns >= self.config.max_turns {
            return Err(Rejected::LimitReached);
        }

        self.transcript.push(TranscriptEntry::now(ChatMessage::user(text)));
        self.turns += 1;
        self.state = WidgetState::Sending;

        if self.turns >= self.config.max_turns {
            info!("Session {} reached its {}-turn limit", self.session_id, self.config.max_turns);
            return Ok(Pending::LimitAdvisory);
        }
        if self.transport.is_none() {
            return Ok(Pending::Simulated(text.to_string()));
        }
        Ok(Pending::Relay(self.outbound_payload()))
    }

    /// Produces the assistant reply for `pending`. Relay failures of any kind
    /// collapse into [`CONTACT_FALLBACK`].
    pub async fn resolve(&self, pending: Pending) -> String {
        match pending {
            Pending::LimitAdvisory => {
                tokio::time::sleep(self.config.advisory_delay).await;
                CONTACT_FALLBACK.to_string()
            }
            Pending::Simulated(text) => {
                tokio::time::sleep(self.config.simulated_delay).await;
                simulate_reply(&text).to_string()
            }
            Pending::Relay(payload) => {
                let Some(transport) = self.transport.as_ref() else {
                    return CONTACT_FALLBACK.to_string();
                };
                let reply = transport.send(&payload).await.and_then(|body| {
                    first_choice_content(&body)
                        .map(str::to_string)
                        .ok_or(WidgetError::MalformedResponse)
                });
                match reply {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Session {} relay call failed: {}", self.session_id, e);
                        CONTACT_FALLBACK.to_string()
                    }
                }
            }
        }
    }

    /// Appends the assistant reply and returns to `Idle`.
    pub fn complete(&mut self, reply: impl Into<String>) {
        if self.state != WidgetState::Sending {
            warn!("Session {} got a reply with nothing in flight; dropping it", self.session_id);
            return;
        }
        self.transcript.push(TranscriptEntry::now(ChatMessage::assistant(reply)));
        self.state = WidgetState::Idle;
    }

    /// One full turn: accept, resolve, append. Returns the appended reply.
    pub async fn submit(&mut self, text: &str) -> Result<String, Rejected> {
        let pending = self.begin(text)?;
        let reply = self.resolve(pending).await;
        self.complete(reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use async_trait::async_trait;
    use serde_json::{ json, Value };
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use std::sync::Mutex;

    struct MockTransport {
        response: Option<Value>,
        calls: AtomicUsize,
        payloads: Mutex<Vec<RelayRequest>>,
    }

    impl MockTransport {
        fn replying(response: Option<Value>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
                payloads: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RelayTransport for MockTransport {
        async fn send(&self, payload: &RelayRequest) -> Result<Value, WidgetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads.lock().unwrap().push(payload.clone());
            self.response.clone().ok_or(WidgetError::MalformedResponse)
        }
    }

    fn instant() -> WidgetConfig {
        WidgetConfig {
            advisory_delay: Duration::ZERO,
            simulated_delay: Duration::ZERO,
            ..WidgetConfig::default()
        }
    }

    fn widget_with(transport: &Arc<MockTransport>) -> ChatWidget {
        ChatWidget::new(instant(), Some(transport.clone() as Arc<dyn RelayTransport>))
    }

    fn reply_of(content: &str) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn starts_idle_with_greeting() {
        let widget = ChatWidget::new(instant(), None);
        assert_eq!(widget.state(), WidgetState::Idle);
        assert_eq!(widget.turns(), 0);
        assert_eq!(widget.transcript().len(), 1);
        assert_eq!(widget.transcript()[0].message, ChatMessage::assistant(GREETING));
        assert!(!widget.is_relay_configured());
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let transport = MockTransport::replying(Some(reply_of("X")));
        let mut widget = widget_with(&transport);
        assert_eq!(widget.submit("   \n").await, Err(Rejected::Blank));
        assert_eq!(widget.transcript().len(), 1);
        assert_eq!(widget.turns(), 0);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn second_submission_while_sending_is_busy() {
        let mut widget = ChatWidget::new(instant(), None);
        assert!(widget.begin("first").is_ok());
        assert_eq!(widget.state(), WidgetState::Sending);
        assert_eq!(widget.begin("second").unwrap_err(), Rejected::Busy);
        assert_eq!(widget.turns(), 1);
        assert_eq!(widget.transcript().len(), 2);

        widget.complete("done");
        assert_eq!(widget.state(), WidgetState::Idle);
        assert!(widget.begin("third").is_ok());
    }

    #[tokio::test]
    async fn relay_reply_is_appended_after_user_entry() {
        let transport = MockTransport::replying(Some(reply_of("X")));
        let mut widget = widget_with(&transport);

        let reply = widget.submit("Who is Jayesh?").await.unwrap();

        assert_eq!(reply, "X");
        let transcript = widget.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].message, ChatMessage::user("Who is Jayesh?"));
        assert_eq!(transcript[2].message, ChatMessage::assistant("X"));
        assert_eq!(widget.state(), WidgetState::Idle);

        let payloads = transport.payloads.lock().unwrap();
        assert_eq!(payloads[0].messages.len(), 2);
        assert_eq!(payloads[0].messages[0].role, Role::Assistant);
        assert_eq!(payloads[0].messages[1], ChatMessage::user("Who is Jayesh?"));
    }

    #[tokio::test]
    async fn payload_is_windowed_to_last_five() {
        let transport = MockTransport::replying(Some(reply_of("ok")));
        let mut widget = widget_with(&transport);
        for i in 0..6 {
            widget.submit(&format!("q{}", i)).await.unwrap();
        }

        let payloads = transport.payloads.lock().unwrap();
        let last = payloads.last().unwrap();
        assert_eq!(last.messages.len(), 5);
        assert_eq!(last.messages[4], ChatMessage::user("q5"));
        assert_eq!(last.messages[0], ChatMessage::user("q3"));
        assert!(payloads.iter().all(|p| p.messages.len() <= 5));
        // the full transcript stays visible
        assert_eq!(widget.transcript().len(), 13);
    }

    #[tokio::test]
    async fn turn_limit_stops_relay_calls() {
        let transport = MockTransport::replying(Some(reply_of("ok")));
        let mut widget = widget_with(&transport);

        for i in 1..=9 {
            assert_eq!(widget.submit(&format!("q{}", i)).await.unwrap(), "ok");
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 9);

        let tenth = widget.submit("q10").await.unwrap();
        assert_eq!(tenth, CONTACT_FALLBACK);
        assert_eq!(widget.turns(), 10);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 9);
        assert_eq!(widget.transcript().last().unwrap().message, ChatMessage::assistant(CONTACT_FALLBACK));

        let before = widget.transcript().len();
        assert_eq!(widget.submit("q11").await, Err(Rejected::LimitReached));
        assert_eq!(widget.transcript().len(), before);
        let advisories = widget
            .transcript()
            .iter()
            .filter(|e| e.message == ChatMessage::assistant(CONTACT_FALLBACK))
            .count();
        assert_eq!(advisories, 1);
        assert_eq!(widget.turns(), 10);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 9);
        assert_eq!(widget.state(), WidgetState::Idle);
    }

    #[tokio::test]
    async fn relay_failures_collapse_to_contact_fallback() {
        let failing = MockTransport::replying(None);
        let mut widget = widget_with(&failing);
        assert_eq!(widget.submit("hello").await.unwrap(), CONTACT_FALLBACK);
        assert_eq!(widget.state(), WidgetState::Idle);

        let malformed = MockTransport::replying(Some(json!({ "error": { "message": "boom" } })));
        let mut widget = widget_with(&malformed);
        assert_eq!(widget.submit("hello").await.unwrap(), CONTACT_FALLBACK);
        assert!(!widget.transcript().iter().any(|e| e.message.content.contains("boom")));
    }

    #[tokio::test]
    async fn offline_mode_uses_simulator() {
        let mut widget = ChatWidget::new(instant(), None);
        let reply = widget.submit("What are his skills?").await.unwrap();
        assert_eq!(reply, simulate_reply("What are his skills?"));
        assert_eq!(widget.transcript().last().unwrap().message.role, Role::Assistant);
    }

    #[test]
    fn stray_reply_is_dropped() {
        let mut widget = ChatWidget::new(instant(), None);
        widget.complete("nobody asked");
        assert_eq!(widget.transcript().len(), 1);
    }
}
