//! `SessionActor` - single-writer host loop around a `CallSession`.
//!
//! SDK callbacks can fire from any task; the actor serializes them. Each
//! message is handled to completion before the next one is received, so a
//! snapshot request never observes a half-applied event. The session itself
//! stays synchronous; only the mailbox is async.

use crate::config::SessionConfig;
use crate::errors::SessionError;
use crate::events::{CallEvent, SdkPayload};
use crate::model::{PeerIdentity, TileRecord};
use crate::session::{CallSession, IngestOutcome};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Default channel buffer size for the session mailbox.
const SESSION_CHANNEL_BUFFER: usize = 256;

/// Messages sent to `SessionActor`.
#[derive(Debug)]
pub enum SessionMessage {
    /// Raw SDK payload to normalize and apply.
    Ingest {
        payload: SdkPayload,
        respond_to: oneshot::Sender<IngestOutcome>,
    },

    /// Raw JSON payload text.
    IngestJson {
        raw: String,
        respond_to: oneshot::Sender<IngestOutcome>,
    },

    /// Already-normalized event.
    Apply {
        event: CallEvent,
        respond_to: oneshot::Sender<IngestOutcome>,
    },

    /// Current tiles.
    GetSnapshot {
        respond_to: oneshot::Sender<Arc<[TileRecord]>>,
    },

    /// Current active-speaker window.
    GetActiveSpeakers {
        respond_to: oneshot::Sender<Vec<PeerIdentity>>,
    },

    /// The local peer, once reported.
    GetLocalPeer {
        respond_to: oneshot::Sender<Option<PeerIdentity>>,
    },

    /// Current grid pages.
    GetPages {
        respond_to: oneshot::Sender<Vec<Vec<TileRecord>>>,
    },

    /// Discard all state (rejoin).
    Reset { respond_to: oneshot::Sender<()> },
}

/// Handle to a `SessionActor`.
#[derive(Clone)]
pub struct SessionActorHandle {
    sender: mpsc::Sender<SessionMessage>,
    cancel_token: CancellationToken,
}

impl SessionActorHandle {
    /// Normalize and apply one SDK payload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn ingest(&self, payload: SdkPayload) -> Result<IngestOutcome, SessionError> {
        self.request(|respond_to| SessionMessage::Ingest {
            payload,
            respond_to,
        })
        .await
    }

    /// Parse, normalize and apply one JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn ingest_json(
        &self,
        raw: impl Into<String>,
    ) -> Result<IngestOutcome, SessionError> {
        let raw = raw.into();
        self.request(|respond_to| SessionMessage::IngestJson { raw, respond_to })
            .await
    }

    /// Apply one normalized event.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn apply(&self, event: CallEvent) -> Result<IngestOutcome, SessionError> {
        self.request(|respond_to| SessionMessage::Apply { event, respond_to })
            .await
    }

    /// Get an immutable snapshot of the tiles.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn snapshot(&self) -> Result<Arc<[TileRecord]>, SessionError> {
        self.request(|respond_to| SessionMessage::GetSnapshot { respond_to })
            .await
    }

    /// Get the active-speaker window.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn active_speakers(&self) -> Result<Vec<PeerIdentity>, SessionError> {
        self.request(|respond_to| SessionMessage::GetActiveSpeakers { respond_to })
            .await
    }

    /// Get the local peer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn local_peer(&self) -> Result<Option<PeerIdentity>, SessionError> {
        self.request(|respond_to| SessionMessage::GetLocalPeer { respond_to })
            .await
    }

    /// Get the grid pages.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn pages(&self) -> Result<Vec<Vec<TileRecord>>, SessionError> {
        self.request(|respond_to| SessionMessage::GetPages { respond_to })
            .await
    }

    /// Discard all session state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ActorUnavailable` if the actor has stopped.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.request(|respond_to| SessionMessage::Reset { respond_to })
            .await
    }

    /// Cancel the session actor.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|e| SessionError::ActorUnavailable(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| SessionError::ActorUnavailable(format!("response receive failed: {e}")))
    }
}

/// The `SessionActor` implementation.
pub struct SessionActor {
    session: CallSession,
    receiver: mpsc::Receiver<SessionMessage>,
    cancel_token: CancellationToken,
    messages_processed: u64,
}

impl SessionActor {
    /// Spawn a new session actor.
    ///
    /// Returns a handle and the task join handle.
    pub fn spawn(
        config: SessionConfig,
        cancel_token: CancellationToken,
    ) -> (SessionActorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_BUFFER);

        let actor = Self {
            session: CallSession::new(config),
            receiver,
            cancel_token: cancel_token.clone(),
            messages_processed: 0,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = SessionActorHandle {
            sender,
            cancel_token,
        };

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "callview.actor.session")]
    async fn run(mut self) {
        info!(target: "callview.actor", "SessionActor started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "callview.actor",
                        "SessionActor received cancellation signal"
                    );
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message);
                            self.messages_processed += 1;
                        }
                        None => {
                            info!(
                                target: "callview.actor",
                                "SessionActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "callview.actor",
            tiles = self.session.tiles().len(),
            messages_processed = self.messages_processed,
            "SessionActor stopped"
        );
    }

    /// Handle a single message. Responses to callers that went away are dropped.
    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Ingest {
                payload,
                respond_to,
            } => {
                let _ = respond_to.send(self.session.ingest(payload));
            }

            SessionMessage::IngestJson { raw, respond_to } => {
                let _ = respond_to.send(self.session.ingest_json(&raw));
            }

            SessionMessage::Apply { event, respond_to } => {
                let _ = respond_to.send(self.session.apply(&event));
            }

            SessionMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.session.snapshot());
            }

            SessionMessage::GetActiveSpeakers { respond_to } => {
                let _ = respond_to.send(self.session.active_speakers().to_vec());
            }

            SessionMessage::GetLocalPeer { respond_to } => {
                let _ = respond_to.send(self.session.local_peer().cloned());
            }

            SessionMessage::GetPages { respond_to } => {
                let pages = self
                    .session
                    .pages()
                    .map(|page| page.into_iter().cloned().collect())
                    .collect();
                let _ = respond_to.send(pages);
            }

            SessionMessage::Reset { respond_to } => {
                self.session.reset();
                let _ = respond_to.send(());
            }
        }
    }
}
