//! Chef voice adapters.
//!
//! The escalation engine asks a [`ChefAgent`] for a line whenever something
//! worth reacting to happens. An agent may answer immediately, answer later
//! through [`ChefAgent::poll`], or not at all; the engine falls back to its own
//! message pool whenever no text is ready, so gameplay never waits on it.
//!
//! | Agent | Behaviour |
//! |-------|-----------|
//! | [`SilentAgent`] | Never answers, the chef speaks from its own pool |
//! | [`FallbackAgent`] | Deterministic round-robin over canned lines |
//! | [`LiveAgent`] | Forwards to a [`ChatBackend`], throttled by a cooldown |

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::catalog::{IngredientId, ToolId};

/// Situations the chef reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChefEvent {
    OrderCompleted,
    IngredientBanned,
    ToolBanned,
    FastCompletion,
    MultipleMistakes,
    Timeout,
    Escalation,
    PerfectOrder,
}

impl ChefEvent {
    pub const ALL: [ChefEvent; 8] = [
        ChefEvent::OrderCompleted,
        ChefEvent::IngredientBanned,
        ChefEvent::ToolBanned,
        ChefEvent::FastCompletion,
        ChefEvent::MultipleMistakes,
        ChefEvent::Timeout,
        ChefEvent::Escalation,
        ChefEvent::PerfectOrder,
    ];
}

/// Primitive facts attached to a request. Unused fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// Remaining-time ratio as a whole percentage.
    pub time_percent: Option<u32>,
    pub mistakes: Option<u32>,
    pub total_orders: Option<u32>,
    pub ingredient: Option<IngredientId>,
    pub tool: Option<ToolId>,
    pub failure_count: Option<u32>,
    pub escalation_level: Option<u32>,
    pub banned_count: Option<usize>,
}

/// One call across the agent boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub event: ChefEvent,
    pub context: EventContext,
    /// Session clock in seconds when the request was made.
    pub now: f64,
}

/// Something that can put words in the chef's mouth.
pub trait ChefAgent {
    /// Answer now, or return `None` to let the caller use its own fallback.
    fn respond(&mut self, request: &AgentRequest) -> Option<String>;

    /// Collect a reply that arrived after its request returned `None`.
    fn poll(&mut self) -> Option<String> {
        None
    }

    /// Forget per-session state.
    fn reset(&mut self) {}
}

/// Agent that never answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAgent;

impl ChefAgent for SilentAgent {
    fn respond(&mut self, _request: &AgentRequest) -> Option<String> {
        None
    }
}

fn fallback_lines(event: ChefEvent) -> &'static [&'static str] {
    match event {
        ChefEvent::OrderCompleted | ChefEvent::MultipleMistakes | ChefEvent::Escalation => &[
            "Acceptable. But I expect MORE from you next time!",
            "You call that speed? My GRANDMOTHER moves faster!",
            "Not bad... for a beginner. Keep it up!",
            "Is that all you've got? FASTER!",
        ],
        ChefEvent::IngredientBanned => &[
            "NO MORE {ingredient}! Time to think CREATIVELY!",
            "{ingredient} is BANNED! Adapt or fail!",
            "I'm SICK of {ingredient}! Use something else!",
        ],
        ChefEvent::ToolBanned => &[
            "The {tool} is BROKEN! Work around it!",
            "{tool} is OUT! A real chef adapts!",
            "No more {tool}! Figure it out!",
        ],
        ChefEvent::FastCompletion => &[
            "TOO EASY for you? Let's FIX that!",
            "Impressive speed. Time to make things HARDER!",
            "You think you're FAST? We'll see about that!",
        ],
        ChefEvent::Timeout => &[
            "OUT OF TIME! This kitchen demands SPEED!",
            "TOO SLOW! Every second counts!",
            "UNACCEPTABLE! Pick up the pace!",
        ],
        ChefEvent::PerfectOrder => &[
            "Finally! THAT'S what I expect. Keep it up!",
            "Perfect execution. But don't get comfortable!",
            "Excellent work. Now do it FASTER!",
        ],
    }
}

fn render(line: &str, context: &EventContext) -> String {
    let ingredient = context.ingredient.map(IngredientId::name).unwrap_or("that");
    let tool = context.tool.map(ToolId::name).unwrap_or("tool");
    line.replace("{ingredient}", ingredient)
        .replace("{tool}", tool)
}

/// Canned lines, cycled in order per event kind.
#[derive(Debug, Clone, Default)]
pub struct FallbackAgent {
    cursors: [usize; ChefEvent::ALL.len()],
}

impl FallbackAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next canned line for `request`.
    pub fn line(&mut self, request: &AgentRequest) -> String {
        let lines = fallback_lines(request.event);
        let cursor = &mut self.cursors[request.event as usize];
        let line = lines[*cursor % lines.len()];
        *cursor = (*cursor + 1) % lines.len();
        render(line, &request.context)
    }
}

impl ChefAgent for FallbackAgent {
    fn respond(&mut self, request: &AgentRequest) -> Option<String> {
        Some(self.line(request))
    }

    fn reset(&mut self) {
        self.cursors = Default::default();
    }
}

/// Failure reported by a chat backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("chat backend disconnected")]
    Disconnected,
    #[error("chat backend rejected the request: {0}")]
    Rejected(String),
}

/// Non-blocking text generator behind a [`LiveAgent`].
pub trait ChatBackend {
    /// Queue a request. Must return without waiting for the reply.
    fn submit(&mut self, request: &AgentRequest) -> Result<(), BackendError>;

    /// Take the reply to the queued request if it has arrived.
    fn try_receive(&mut self) -> Option<Result<String, BackendError>>;
}

/// Agent that forwards requests to a backend.
///
/// At most one request is in flight. While it is, or when a request fails,
/// the canned pool answers instead. New requests inside the cooldown window
/// get no answer at all.
pub struct LiveAgent<B> {
    backend: B,
    cooldown: f64,
    last_request: Option<f64>,
    pending: Option<AgentRequest>,
    fallback: FallbackAgent,
}

impl<B: ChatBackend> LiveAgent<B> {
    pub fn new(backend: B, cooldown: f64) -> Self {
        Self {
            backend,
            cooldown,
            last_request: None,
            pending: None,
            fallback: FallbackAgent::new(),
        }
    }

    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChatBackend> ChefAgent for LiveAgent<B> {
    fn respond(&mut self, request: &AgentRequest) -> Option<String> {
        if self.pending.is_some() {
            return Some(self.fallback.line(request));
        }
        if let Some(last) = self.last_request {
            if request.now - last < self.cooldown {
                return None;
            }
        }
        self.last_request = Some(request.now);
        match self.backend.submit(request) {
            Ok(()) => {
                self.pending = Some(request.clone());
                None
            }
            Err(err) => {
                log::warn!("chef agent request failed: {}", err);
                Some(self.fallback.line(request))
            }
        }
    }

    fn poll(&mut self) -> Option<String> {
        self.pending.as_ref()?;
        match self.backend.try_receive()? {
            Ok(text) => {
                self.pending = None;
                Some(text)
            }
            Err(err) => {
                log::warn!("chef agent reply failed: {}", err);
                let request = self.pending.take()?;
                Some(self.fallback.line(&request))
            }
        }
    }

    fn reset(&mut self) {
        self.last_request = None;
        self.pending = None;
        self.fallback.reset();
    }
}

/// Channel-backed backend: requests go out on one channel, replies come back
/// on another. The serving side holds a [`ChannelServer`].
pub struct ChannelBackend {
    requests: Sender<AgentRequest>,
    replies: Receiver<Result<String, BackendError>>,
}

/// Serving end of a [`ChannelBackend`].
pub struct ChannelServer {
    pub requests: Receiver<AgentRequest>,
    pub replies: Sender<Result<String, BackendError>>,
}

impl ChannelBackend {
    pub fn pair() -> (ChannelBackend, ChannelServer) {
        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (rep_tx, rep_rx) = crossbeam_channel::unbounded();
        (
            ChannelBackend {
                requests: req_tx,
                replies: rep_rx,
            },
            ChannelServer {
                requests: req_rx,
                replies: rep_tx,
            },
        )
    }
}

impl ChatBackend for ChannelBackend {
    fn submit(&mut self, request: &AgentRequest) -> Result<(), BackendError> {
        self.requests
            .send(request.clone())
            .map_err(|_| BackendError::Disconnected)
    }

    fn try_receive(&mut self) -> Option<Result<String, BackendError>> {
        match self.replies.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(BackendError::Disconnected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn request(event: ChefEvent, now: f64) -> AgentRequest {
        AgentRequest {
            event,
            context: EventContext::default(),
            now,
        }
    }

    /// Backend that records submissions and replays scripted replies.
    #[derive(Default)]
    struct ScriptedBackend {
        submitted: Vec<ChefEvent>,
        replies: VecDeque<Result<String, BackendError>>,
        fail_submit: bool,
    }

    impl ChatBackend for ScriptedBackend {
        fn submit(&mut self, request: &AgentRequest) -> Result<(), BackendError> {
            if self.fail_submit {
                return Err(BackendError::Rejected("offline".into()));
            }
            self.submitted.push(request.event);
            Ok(())
        }

        fn try_receive(&mut self) -> Option<Result<String, BackendError>> {
            self.replies.pop_front()
        }
    }

    #[test]
    fn test_fallback_cycles_deterministically() {
        let mut agent = FallbackAgent::new();
        let req = request(ChefEvent::Timeout, 0.0);
        let first = agent.respond(&req).unwrap();
        let second = agent.respond(&req).unwrap();
        let third = agent.respond(&req).unwrap();
        let fourth = agent.respond(&req).unwrap();
        assert_eq!(first, "OUT OF TIME! This kitchen demands SPEED!");
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(first, fourth);
        agent.reset();
        assert_eq!(agent.respond(&req).unwrap(), first);
    }

    #[test]
    fn test_fallback_substitutes_names() {
        let mut agent = FallbackAgent::new();
        let mut req = request(ChefEvent::IngredientBanned, 0.0);
        req.context.ingredient = Some(IngredientId::Tomato);
        assert_eq!(
            agent.respond(&req).unwrap(),
            "NO MORE Tomato! Time to think CREATIVELY!"
        );
        let mut req = request(ChefEvent::ToolBanned, 0.0);
        req.context.tool = Some(ToolId::Knife);
        assert_eq!(agent.respond(&req).unwrap(), "The Knife is BROKEN! Work around it!");
    }

    #[test]
    fn test_every_event_has_lines() {
        for event in ChefEvent::ALL {
            assert!(!fallback_lines(event).is_empty(), "{:?}", event);
        }
    }

    #[test]
    fn test_silent_agent() {
        assert_eq!(SilentAgent.respond(&request(ChefEvent::Escalation, 0.0)), None);
    }

    #[test]
    fn test_live_agent_reply_arrives_later() {
        let mut agent = LiveAgent::new(ScriptedBackend::default(), 10.0);
        assert_eq!(agent.respond(&request(ChefEvent::Escalation, 0.0)), None);
        assert!(agent.is_thinking());
        assert_eq!(agent.poll(), None);

        agent.backend.replies.push_back(Ok("Faster, I said!".into()));
        assert_eq!(agent.poll(), Some("Faster, I said!".into()));
        assert!(!agent.is_thinking());
        assert_eq!(agent.backend().submitted, vec![ChefEvent::Escalation]);
    }

    #[test]
    fn test_live_agent_busy_uses_fallback() {
        let mut agent = LiveAgent::new(ScriptedBackend::default(), 0.0);
        agent.respond(&request(ChefEvent::Escalation, 0.0));
        let busy = agent.respond(&request(ChefEvent::Timeout, 1.0));
        assert_eq!(busy, Some("OUT OF TIME! This kitchen demands SPEED!".into()));
        assert_eq!(agent.backend().submitted.len(), 1);
    }

    #[test]
    fn test_live_agent_cooldown() {
        let mut agent = LiveAgent::new(ScriptedBackend::default(), 10.0);
        agent.respond(&request(ChefEvent::Escalation, 0.0));
        agent.backend.replies.push_back(Ok("one".into()));
        agent.poll();

        assert_eq!(agent.respond(&request(ChefEvent::Escalation, 5.0)), None);
        assert_eq!(agent.backend().submitted.len(), 1);
        agent.respond(&request(ChefEvent::Escalation, 10.0));
        assert_eq!(agent.backend().submitted.len(), 2);
    }

    #[test]
    fn test_live_agent_errors_fall_back() {
        let backend = ScriptedBackend {
            fail_submit: true,
            ..Default::default()
        };
        let mut agent = LiveAgent::new(backend, 10.0);
        let reply = agent.respond(&request(ChefEvent::PerfectOrder, 0.0));
        assert_eq!(reply, Some("Finally! THAT'S what I expect. Keep it up!".into()));

        let mut agent = LiveAgent::new(ScriptedBackend::default(), 10.0);
        agent.respond(&request(ChefEvent::FastCompletion, 0.0));
        agent
            .backend
            .replies
            .push_back(Err(BackendError::Rejected("quota".into())));
        assert_eq!(agent.poll(), Some("TOO EASY for you? Let's FIX that!".into()));
        assert!(!agent.is_thinking());
    }

    #[test]
    fn test_channel_backend_round_trip() {
        let (backend, server) = ChannelBackend::pair();
        let mut agent = LiveAgent::new(backend, 10.0);
        assert_eq!(agent.respond(&request(ChefEvent::Timeout, 0.0)), None);

        let received = server.requests.try_recv().unwrap();
        assert_eq!(received.event, ChefEvent::Timeout);
        server.replies.send(Ok("Move it!".into())).unwrap();
        assert_eq!(agent.poll(), Some("Move it!".into()));
    }

    #[test]
    fn test_channel_backend_disconnect() {
        let (backend, server) = ChannelBackend::pair();
        let mut agent = LiveAgent::new(backend, 10.0);
        agent.respond(&request(ChefEvent::Timeout, 0.0));
        drop(server);
        assert_eq!(
            agent.poll(),
            Some("OUT OF TIME! This kitchen demands SPEED!".into())
        );
    }
}
