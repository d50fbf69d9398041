//! Conversation Session
//!
//! Owns the transcript and runs send transactions one at a time.
//!
//! ```text
//!            send(text)               reply appended
//!   Idle ──────────────────▶ Sending ────────────────▶ Idle
//!                              │
//!                              └─ further sends wait in FIFO order
//! ```
//!
//! Sends are queued on a channel and executed by a single worker task, so a
//! transaction's user and assistant messages are always adjacent in the
//! transcript no matter how long dispatch takes. The worker is the only
//! writer of [`SessionState`]; readers get snapshots through a watch channel.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dispatch::{AnalysisRequest, Dispatcher};
use crate::models::{DatasetView, Message, SessionPhase, SessionState};
use crate::types::DispatchError;

pub const WELCOME_MESSAGE: &str = "Welcome! Upload a dataset to get an instant summary, then ask questions like 'Show sales by region' or 'Forecast revenue next month.'";

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The user/assistant pair produced by one send
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: Message,
    pub assistant: Message,
}

struct Job {
    text: String,
    done: oneshot::Sender<Exchange>,
}

#[derive(Clone)]
pub struct ConversationSession {
    id: Uuid,
    jobs: mpsc::UnboundedSender<Job>,
    state: watch::Receiver<SessionState>,
}

impl ConversationSession {
    /// Start a session with an empty transcript. Must be called inside a
    /// tokio runtime; the worker task lives as long as any clone of the session.
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        dataset: watch::Receiver<DatasetView>,
        timeout: Duration,
    ) -> Self {
        Self::start(dispatcher, dataset, timeout, Vec::new())
    }

    /// Start a session whose transcript opens with the welcome message
    pub fn with_welcome(
        dispatcher: Arc<dyn Dispatcher>,
        dataset: watch::Receiver<DatasetView>,
        timeout: Duration,
    ) -> Self {
        Self::start(
            dispatcher,
            dataset,
            timeout,
            vec![Message::assistant(WELCOME_MESSAGE)],
        )
    }

    fn start(
        dispatcher: Arc<dyn Dispatcher>,
        dataset: watch::Receiver<DatasetView>,
        timeout: Duration,
        transcript: Vec<Message>,
    ) -> Self {
        let id = Uuid::new_v4();
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState {
            transcript,
            pending: false,
        });

        let worker = Worker {
            session_id: id,
            dispatcher,
            dataset,
            timeout,
            state: state_tx,
        };
        tokio::spawn(worker.run(jobs_rx));

        info!(session_id = %id, "Conversation session started");
        Self {
            id,
            jobs: jobs_tx,
            state: state_rx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a message without waiting for it.
    ///
    /// Returns `None` when the text is blank (nothing is queued). Queue order
    /// is the order of `submit` calls.
    pub fn submit(&self, text: &str) -> Option<oneshot::Receiver<Exchange>> {
        if text.trim().is_empty() {
            return None;
        }

        let (done, rx) = oneshot::channel();
        let job = Job {
            text: text.to_string(),
            done,
        };
        if self.jobs.send(job).is_err() {
            error!(session_id = %self.id, "Session worker stopped, message dropped");
            return None;
        }
        Some(rx)
    }

    /// Send a message and wait until both its user and assistant messages
    /// are in the transcript. Blank text is ignored and yields `None`.
    pub async fn send(&self, text: &str) -> Option<Exchange> {
        let rx = self.submit(text)?;
        match rx.await {
            Ok(exchange) => Some(exchange),
            Err(_) => {
                error!(session_id = %self.id, "Session worker stopped before replying");
                None
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }
}

struct Worker {
    session_id: Uuid,
    dispatcher: Arc<dyn Dispatcher>,
    dataset: watch::Receiver<DatasetView>,
    timeout: Duration,
    state: watch::Sender<SessionState>,
}

impl Worker {
    async fn run(self, mut jobs: mpsc::UnboundedReceiver<Job>) {
        while let Some(job) = jobs.recv().await {
            self.execute(job).await;
        }
        debug!(session_id = %self.session_id, "Conversation session closed");
    }

    async fn execute(&self, job: Job) {
        let user = Message::user(job.text.as_str());
        self.state.send_modify(|state| {
            state.pending = true;
            state.transcript.push(user.clone());
        });

        let snapshot = self.dataset.borrow().clone();
        let request = AnalysisRequest::new(self.session_id, &job.text, &snapshot);
        let content = self.resolve(&request).await;

        let assistant = Message::assistant(content);
        self.state.send_modify(|state| {
            state.transcript.push(assistant.clone());
            state.pending = false;
        });

        // The caller may have stopped waiting; the transcript is already updated
        let _ = job.done.send(Exchange { user, assistant });
    }

    /// Dispatch with a timeout. Every failure becomes reply text.
    async fn resolve(&self, request: &AnalysisRequest) -> String {
        let dispatch = AssertUnwindSafe(self.dispatcher.dispatch(request)).catch_unwind();

        match tokio::time::timeout(self.timeout, dispatch).await {
            Ok(Ok(Ok(reply))) => reply.reply,
            Ok(Ok(Err(e))) => {
                warn!(session_id = %self.session_id, "Dispatch failed: {}", e);
                failure_reply(&e)
            }
            Ok(Err(_)) => {
                error!(session_id = %self.session_id, "Dispatcher panicked");
                "Sorry, something went wrong while analyzing your message. Please try again."
                    .to_string()
            }
            Err(_) => {
                let e = DispatchError::Timeout(self.timeout);
                warn!(session_id = %self.session_id, "Dispatch failed: {}", e);
                failure_reply(&e)
            }
        }
    }
}

fn failure_reply(err: &DispatchError) -> String {
    format!("Sorry, I couldn't get an answer from the analysis service. {}.", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{AnalysisReply, PlaceholderDispatcher};
    use crate::dispatch::router::{NOT_CONNECTED, UPLOAD_HINT};
    use crate::ingest::{InMemoryFile, IngestionGate};
    use crate::models::Role;
    use crate::preview::PreviewOptions;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Echoes the message after a delay given by its first word ("slow" waits longer)
    struct EchoDispatcher;

    #[async_trait]
    impl Dispatcher for EchoDispatcher {
        async fn dispatch(
            &self,
            request: &AnalysisRequest,
        ) -> Result<AnalysisReply, DispatchError> {
            let delay = if request.message.starts_with("slow") { 80 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(AnalysisReply::text(format!("echo: {}", request.message)))
        }

        fn is_live(&self) -> bool {
            false
        }
    }

    /// Blocks until released
    struct GatedDispatcher {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Dispatcher for GatedDispatcher {
        async fn dispatch(
            &self,
            _request: &AnalysisRequest,
        ) -> Result<AnalysisReply, DispatchError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(AnalysisReply::text("released"))
        }

        fn is_live(&self) -> bool {
            false
        }
    }

    struct FailingDispatcher;

    #[async_trait]
    impl Dispatcher for FailingDispatcher {
        async fn dispatch(
            &self,
            _request: &AnalysisRequest,
        ) -> Result<AnalysisReply, DispatchError> {
            Err(DispatchError::Status(500))
        }

        fn is_live(&self) -> bool {
            true
        }
    }

    struct HangingDispatcher;

    #[async_trait]
    impl Dispatcher for HangingDispatcher {
        async fn dispatch(
            &self,
            _request: &AnalysisRequest,
        ) -> Result<AnalysisReply, DispatchError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(AnalysisReply::text("too late"))
        }

        fn is_live(&self) -> bool {
            true
        }
    }

    struct PanickingDispatcher;

    #[async_trait]
    impl Dispatcher for PanickingDispatcher {
        async fn dispatch(
            &self,
            _request: &AnalysisRequest,
        ) -> Result<AnalysisReply, DispatchError> {
            panic!("backend exploded");
        }

        fn is_live(&self) -> bool {
            true
        }
    }

    fn no_dataset() -> watch::Receiver<DatasetView> {
        let (tx, rx) = watch::channel(DatasetView::default());
        // Keep the value readable after the sender is gone
        drop(tx);
        rx
    }

    fn demo_session() -> ConversationSession {
        ConversationSession::new(
            Arc::new(PlaceholderDispatcher::new(false)),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        )
    }

    #[tokio::test]
    async fn test_blank_send_is_noop() {
        let session = demo_session();
        assert!(session.send("").await.is_none());
        assert!(session.send("   ").await.is_none());
        assert!(session.submit("\n\t").is_none());

        let state = session.state();
        assert!(state.transcript.is_empty());
        assert_eq!(state.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_send_in_demo_mode() {
        let session = ConversationSession::with_welcome(
            Arc::new(PlaceholderDispatcher::new(false)),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        );
        let before = session.state().transcript.len();
        assert_eq!(before, 1);

        let exchange = session.send("hello").await.unwrap();

        let state = session.state();
        assert_eq!(state.transcript.len(), before + 2);
        assert_eq!(state.transcript[before].role, Role::User);
        assert_eq!(state.transcript[before].content, "hello");
        assert_eq!(state.transcript[before + 1].role, Role::Assistant);
        assert!(state.transcript[before + 1].content.contains(NOT_CONNECTED));
        assert!(state.transcript[before + 1].content.starts_with(UPLOAD_HINT));
        assert_eq!(exchange.user.id, state.transcript[before].id);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_back_to_back_sends_never_interleave() {
        let session = ConversationSession::new(
            Arc::new(EchoDispatcher),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        let (first, second) = tokio::join!(session.send("slow one"), session.send("fast two"));
        assert!(first.is_some() && second.is_some());

        let contents: Vec<(Role, String)> = session
            .state()
            .transcript
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect();
        assert_eq!(
            contents,
            vec![
                (Role::User, "slow one".to_string()),
                (Role::Assistant, "echo: slow one".to_string()),
                (Role::User, "fast two".to_string()),
                (Role::Assistant, "echo: fast two".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_order_is_fifo() {
        let session = ConversationSession::new(
            Arc::new(EchoDispatcher),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        let receivers: Vec<_> = ["slow a", "b", "slow c", "d"]
            .iter()
            .map(|text| session.submit(text).unwrap())
            .collect();
        for rx in receivers {
            rx.await.unwrap();
        }

        let users: Vec<String> = session
            .state()
            .transcript
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect();
        assert_eq!(users, vec!["slow a", "b", "slow c", "d"]);
    }

    #[tokio::test]
    async fn test_pending_while_in_flight() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let session = ConversationSession::new(
            Arc::new(GatedDispatcher {
                started: started.clone(),
                release: release.clone(),
            }),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        let rx = session.submit("question").unwrap();
        started.notified().await;

        let state = session.state();
        assert!(state.pending);
        assert_eq!(state.phase(), SessionPhase::Sending);
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript[0].role, Role::User);

        release.notify_one();
        let exchange = rx.await.unwrap();
        assert_eq!(exchange.assistant.content, "released");
        assert!(!session.state().pending);
    }

    #[tokio::test]
    async fn test_dispatch_failure_becomes_assistant_message() {
        let session = ConversationSession::new(
            Arc::new(FailingDispatcher),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        );
        let exchange = session.send("hi").await.unwrap();

        assert_eq!(exchange.assistant.role, Role::Assistant);
        assert!(exchange.assistant.content.contains("HTTP 500"));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_dispatch_timeout_becomes_assistant_message() {
        let session = ConversationSession::new(
            Arc::new(HangingDispatcher),
            no_dataset(),
            Duration::from_millis(50),
        );
        let exchange = session.send("hi").await.unwrap();

        assert!(exchange.assistant.content.contains("did not answer"));
        assert!(!session.state().pending);
    }

    #[tokio::test]
    async fn test_dispatcher_panic_does_not_wedge_session() {
        let session = ConversationSession::new(
            Arc::new(PanickingDispatcher),
            no_dataset(),
            DEFAULT_DISPATCH_TIMEOUT,
        );
        let first = session.send("one").await.unwrap();
        assert!(first.assistant.content.starts_with("Sorry"));

        // The worker survives and keeps serving
        assert!(session.send("two").await.is_some());
        assert_eq!(session.state().transcript.len(), 4);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_dispatch_sees_dataset_at_execution_time() {
        let gate = IngestionGate::new(PreviewOptions::default());
        let session = ConversationSession::new(
            Arc::new(PlaceholderDispatcher::new(false)),
            gate.subscribe(),
            DEFAULT_DISPATCH_TIMEOUT,
        );

        let before = session.send("first").await.unwrap();
        assert!(before.assistant.content.starts_with(UPLOAD_HINT));

        gate.ingest(&InMemoryFile::new("sales.csv", "region,total\nnorth,1")).await;
        let after = session.send("second").await.unwrap();
        assert_eq!(after.assistant.content, NOT_CONNECTED);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let session = demo_session();
        let mut updates = session.subscribe();

        session.send("hello").await.unwrap();
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_message_ids_unique_across_session() {
        let session = demo_session();
        for text in ["a", "b", "c"] {
            session.send(text).await.unwrap();
        }
        let mut ids: Vec<Uuid> = session.state().transcript.iter().map(|m| m.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
