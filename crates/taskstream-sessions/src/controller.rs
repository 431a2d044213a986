use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use taskstream_core::config::{ApiConfig, ChatConfig};
use taskstream_core::{Credential, MessageId, SessionId, StreamId, TaskstreamConfig};
use taskstream_protocol::{EventStreamParser, ReportPayload, TaskPayload};
use taskstream_transport::{StreamRequest, Transport, TransportError, TransportEvent};

use crate::broadcast::{ChatEvent, ChatNotifier};
use crate::error::ChatError;
use crate::store::MessageLog;
use crate::types::{Message, Phase, SessionSnapshot};

/// How long a cancelled transport gets to release its connection before the
/// stream task drops it.
pub const CANCEL_GRACE: Duration = Duration::from_secs(2);

const CHUNK_CHANNEL_CAPACITY: usize = 64;

/// Drives one session: its message log and at most one in-flight stream.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct ChatController {
    transport: Arc<dyn Transport>,
    api: ApiConfig,
    chat: ChatConfig,
    credential: Option<Credential>,
    shared: Arc<Shared>,
}

/// Handle to a dispatched stream.
#[derive(Debug)]
pub struct StreamHandle {
    id: StreamId,
    task: JoinHandle<()>,
}

impl StreamHandle {
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Wait until the stream task has wound down, whatever the outcome.
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            warn!(stream = %self.id, error = %e, "stream task aborted");
        }
    }
}

struct ActiveStream {
    id: StreamId,
    cancel: CancellationToken,
    placeholder: MessageId,
    /// Structured messages appended so far.
    events: usize,
}

struct SessionState {
    session_id: SessionId,
    log: MessageLog,
    phase: Phase,
    active: Option<ActiveStream>,
}

impl SessionState {
    fn owns(&self, stream: StreamId) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == stream)
    }

    fn take_active(&mut self, stream: StreamId) -> Option<ActiveStream> {
        if self.owns(stream) {
            self.active.take()
        } else {
            None
        }
    }
}

struct Shared {
    state: Mutex<SessionState>,
    notifier: ChatNotifier,
}

impl Shared {
    // Never held across an await.
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, state: &mut SessionState, phase: Phase) {
        state.phase = phase;
        self.notifier.send(ChatEvent::StateChanged {
            session: state.session_id.clone(),
            phase,
        });
    }

    fn append(&self, state: &mut SessionState, message: Message) -> MessageId {
        let id = state.log.push(message.clone());
        self.notifier.send(ChatEvent::MessageAppended {
            session: state.session_id.clone(),
            message,
        });
        id
    }

    fn grow(&self, state: &mut SessionState, id: MessageId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(full) = state.log.append_text(id, text) {
            self.notifier.send(ChatEvent::MessageUpdated {
                session: state.session_id.clone(),
                id,
                text: full,
            });
        }
    }

    /// Freeze the placeholder. An empty one is dropped when `drop_empty`.
    fn seal(&self, state: &mut SessionState, placeholder: MessageId, drop_empty: bool) {
        let empty = state
            .log
            .get(placeholder)
            .and_then(Message::text)
            .is_some_and(str::is_empty);
        if empty && drop_empty && state.log.remove(placeholder).is_some() {
            self.notifier.send(ChatEvent::MessageRemoved {
                session: state.session_id.clone(),
                id: placeholder,
            });
        }
    }

    /// Shared by `cancel_stream` and `switch_session`. Returns false when
    /// nothing was streaming.
    fn cancel_active(&self, state: &mut SessionState) -> bool {
        let Some(active) = state.active.take() else {
            return false;
        };
        self.set_phase(state, Phase::Cancelling);
        active.cancel.cancel();
        self.seal(state, active.placeholder, active.events > 0);
        self.set_phase(state, Phase::Idle);
        info!(session = %state.session_id, stream = %active.id, "stream cancelled");
        true
    }

    /// Feed one chunk through the parser into the log. Returns false once
    /// `stream` is no longer the session's active stream.
    ///
    /// Raw text always grows the placeholder, which was appended before any
    /// of the stream's events. Raw text arriving after an event therefore
    /// shows up above that event in the log.
    fn apply_chunk(&self, stream: StreamId, parser: &mut EventStreamParser, text: &str) -> bool {
        let mut state = self.lock();
        let Some(active) = state.active.as_mut().filter(|a| a.id == stream) else {
            debug!(stream = %stream, "dropping chunk from inactive stream");
            return false;
        };
        let placeholder = active.placeholder;
        let events = parser.consume(text);
        active.events += events.len();

        if let Some(raw) = parser.take_raw() {
            self.grow(&mut state, placeholder, &raw);
        }
        for event in events {
            debug!(stream = %stream, event = %event.event, "structured event");
            self.append(&mut state, Message::bot_event(event));
        }
        true
    }

    fn complete(&self, stream: StreamId, parser: &mut EventStreamParser) {
        let mut state = self.lock();
        let Some(active) = state.take_active(stream) else {
            return;
        };
        if let Some(rest) = parser.finish() {
            self.grow(&mut state, active.placeholder, &rest);
        }
        self.seal(&mut state, active.placeholder, active.events > 0);
        self.set_phase(&mut state, Phase::Idle);
        info!(
            session = %state.session_id,
            stream = %stream,
            events = active.events,
            "stream completed"
        );
    }

    fn fail(&self, stream: StreamId, parser: &mut EventStreamParser, err: &TransportError) {
        let mut state = self.lock();
        let Some(active) = state.take_active(stream) else {
            return;
        };
        if let Some(rest) = parser.finish() {
            self.grow(&mut state, active.placeholder, &rest);
        }
        // The error message takes the empty placeholder's place.
        self.seal(&mut state, active.placeholder, true);
        warn!(session = %state.session_id, stream = %stream, error = %err, "stream failed");
        self.append(&mut state, Message::bot_error(err.user_message()));
        self.set_phase(&mut state, Phase::Idle);
    }

    /// Release a stream that ended as cancelled without anyone cancelling it.
    fn abandon(&self, stream: StreamId) {
        let mut state = self.lock();
        if state.owns(stream) {
            self.cancel_active(&mut state);
        }
    }
}

impl ChatController {
    /// Open `session_id` with a log holding only the configured greeting.
    pub fn new(
        session_id: SessionId,
        transport: Arc<dyn Transport>,
        config: &TaskstreamConfig,
    ) -> Self {
        let state = SessionState {
            session_id,
            log: MessageLog::with_greeting(&config.chat.greeting),
            phase: Phase::Idle,
            active: None,
        };
        Self {
            transport,
            api: config.api.clone(),
            chat: config.chat.clone(),
            credential: config.auth.credential(),
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                notifier: ChatNotifier::new(config.chat.event_capacity),
            }),
        }
    }

    /// Override the credential taken from `[auth]`.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Run `text` as a task. Rejected while another stream is in flight.
    ///
    /// The stream runs on a task spawned onto the current Tokio runtime;
    /// outside one the call fails with [`ChatError::NoRuntime`].
    pub fn send_task(&self, text: &str) -> Result<StreamHandle, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyTask);
        }
        let body = TaskPayload::new(text)
            .with_log_iter(self.chat.log_iter)
            .to_body();
        self.dispatch(text, |api, session| {
            StreamRequest::new(api.task_url(session), body)
        })
    }

    /// Generate a report from `spec`, optionally rendered into `template`.
    /// Same lifecycle and runtime requirement as [`send_task`](Self::send_task).
    pub fn send_report_task(
        &self,
        spec: &str,
        template: Option<&str>,
    ) -> Result<StreamHandle, ChatError> {
        if spec.trim().is_empty() {
            return Err(ChatError::EmptyTask);
        }
        let body = ReportPayload::new(spec, template.map(String::from)).to_body();
        self.dispatch(spec, |api, session| {
            StreamRequest::new(api.report_url(session), body)
        })
    }

    fn dispatch(
        &self,
        text: &str,
        build: impl FnOnce(&ApiConfig, &SessionId) -> StreamRequest,
    ) -> Result<StreamHandle, ChatError> {
        let runtime = Handle::try_current().map_err(|_| ChatError::NoRuntime)?;
        let mut state = self.shared.lock();
        if state.phase != Phase::Idle {
            warn!(session = %state.session_id, "send rejected, a stream is already in flight");
            return Err(ChatError::Busy);
        }

        let req = build(&self.api, &state.session_id).with_credential(self.credential.clone());
        self.shared.append(&mut state, Message::user(text));
        let placeholder = self.shared.append(&mut state, Message::bot_text(""));

        let stream = StreamId::new();
        let cancel = CancellationToken::new();
        state.active = Some(ActiveStream {
            id: stream,
            cancel: cancel.clone(),
            placeholder,
            events: 0,
        });
        self.shared.set_phase(&mut state, Phase::Streaming);
        info!(
            session = %state.session_id,
            stream = %stream,
            endpoint = %req.endpoint,
            "stream started"
        );
        drop(state);

        let task = runtime.spawn(run_stream(
            self.shared.clone(),
            self.transport.clone(),
            req,
            stream,
            cancel,
        ));
        Ok(StreamHandle { id: stream, task })
    }

    /// Abort the in-flight stream, keeping whatever it already produced.
    /// Returns false (and does nothing) when no stream is running.
    pub fn cancel_stream(&self) -> bool {
        let mut state = self.shared.lock();
        self.shared.cancel_active(&mut state)
    }

    /// Make `session` the active session: cancel the previous session's
    /// stream, then reset the log to the greeting. No-op for the current id.
    pub fn switch_session(&self, session: SessionId) -> bool {
        let mut state = self.shared.lock();
        if state.session_id == session {
            return false;
        }
        self.shared.cancel_active(&mut state);
        info!(from = %state.session_id, to = %session, "switching session");
        state.session_id = session.clone();
        state.log.reset(&self.chat.greeting);
        self.shared.notifier.send(ChatEvent::SessionReset { session });
        true
    }

    pub fn session_id(&self) -> SessionId {
        self.shared.lock().session_id.clone()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    pub fn is_streaming(&self) -> bool {
        self.phase() != Phase::Idle
    }

    pub fn messages(&self) -> Vec<Message> {
        self.shared.lock().log.messages().to_vec()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.lock();
        SessionSnapshot {
            session_id: state.session_id.clone(),
            phase: state.phase,
            messages: state.log.messages().to_vec(),
        }
    }

    /// Subscribe to change notifications from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.shared.notifier.subscribe()
    }
}

enum Outcome {
    Completed,
    Failed(TransportError),
    Cancelled,
}

impl From<Result<(), TransportError>> for Outcome {
    fn from(result: Result<(), TransportError>) -> Self {
        match result {
            Ok(()) => Outcome::Completed,
            Err(e) if e.is_cancelled() => Outcome::Cancelled,
            Err(e) => Outcome::Failed(e),
        }
    }
}

async fn run_stream(
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    req: StreamRequest,
    stream: StreamId,
    cancel: CancellationToken,
) {
    let (tx, mut rx) = mpsc::channel::<TransportEvent>(CHUNK_CHANNEL_CAPACITY);
    let open = transport.open(&req, tx, cancel.clone());
    tokio::pin!(open);

    debug!(stream = %stream, transport = transport.name(), "opening transport");

    let mut parser = EventStreamParser::new();
    let mut settled = false;

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Outcome::Cancelled,
            event = rx.recv() => match event {
                Some(TransportEvent::Chunk { text }) => {
                    if !shared.apply_chunk(stream, &mut parser, &text) {
                        break Outcome::Cancelled;
                    }
                }
                Some(TransportEvent::Done) => break Outcome::Completed,
                None => {
                    settled = true;
                    break Outcome::from((&mut open).await);
                }
            },
            result = &mut open => {
                settled = true;
                // Chunks queued before `open` returned still count.
                if drain(&shared, stream, &mut parser, &mut rx) {
                    break Outcome::from(result);
                }
                break Outcome::Cancelled;
            }
        }
    };

    match outcome {
        Outcome::Completed => shared.complete(stream, &mut parser),
        Outcome::Failed(err) => shared.fail(stream, &mut parser, &err),
        Outcome::Cancelled => {
            if !settled && tokio::time::timeout(CANCEL_GRACE, &mut open).await.is_err() {
                warn!(stream = %stream, "transport ignored cancellation, dropping it");
            }
            shared.abandon(stream);
        }
    }
}

fn drain(
    shared: &Shared,
    stream: StreamId,
    parser: &mut EventStreamParser,
    rx: &mut mpsc::Receiver<TransportEvent>,
) -> bool {
    while let Ok(event) = rx.try_recv() {
        if let TransportEvent::Chunk { text } = event {
            if !shared.apply_chunk(stream, parser, &text) {
                return false;
            }
        }
    }
    true
}
