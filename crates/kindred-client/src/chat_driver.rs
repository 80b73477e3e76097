//! Runs a [`ChatSession`] on a tokio task.
//!
//! The task owns the session and is the only thing touching it. One
//! `select!` loop waits on UI commands, the transport subscription and the
//! session's next timer deadline; the session clock is moved forward by the
//! real time elapsed before each wake-up is handled. Dropping every command
//! sender closes the session, which cancels all of its timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use kindred_chat::{ChatEvent, ChatMessage, ChatSession};
use kindred_shared::types::{ConversationId, MessageId};

use crate::collaborators::{MessagingTransport, TransportEvent};

/// Requests from the conversation screen.
#[derive(Debug)]
pub enum ChatCommand {
    SendText(String),
    StartRecording,
    StopRecording,
    CancelRecording,
    MarkRead,
    /// Reply with a copy of the message log.
    Snapshot(oneshot::Sender<Vec<ChatMessage>>),
    Close,
}

/// The UI side of a running driver.
#[derive(Debug)]
pub struct ChatHandle {
    pub conversation: ConversationId,
    pub commands: mpsc::Sender<ChatCommand>,
    /// Session notifications. The driver never waits on this channel: when
    /// the buffer is full, events are dropped and the UI should resync
    /// with [`ChatHandle::snapshot`].
    pub events: mpsc::Receiver<ChatEvent>,
}

impl ChatHandle {
    pub async fn send_text(&self, body: impl Into<String>) -> bool {
        self.commands
            .send(ChatCommand::SendText(body.into()))
            .await
            .is_ok()
    }

    /// Current message log, or `None` once the driver has stopped.
    pub async fn snapshot(&self) -> Option<Vec<ChatMessage>> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(ChatCommand::Snapshot(tx)).await.ok()?;
        rx.await.ok()
    }
}

enum Wake {
    Command(Option<ChatCommand>),
    Transport(Option<TransportEvent>),
    Timer,
}

/// Spawn the driver task for `session`.
///
/// With a transport, outgoing messages are handed to it and its receipts
/// and incoming messages are fed back into the session; the session should
/// then be configured with `simulate_peer = false`. Without one, the
/// session's own simulated peer answers.
pub fn spawn_chat_driver(
    session: ChatSession,
    transport: Option<Arc<dyn MessagingTransport>>,
) -> ChatHandle {
    let conversation = session.conversation_id();
    let (cmd_tx, cmd_rx) = mpsc::channel::<ChatCommand>(64);
    let (event_tx, event_rx) = mpsc::channel::<ChatEvent>(256);

    tokio::spawn(run(session, transport, cmd_rx, event_tx));

    ChatHandle {
        conversation,
        commands: cmd_tx,
        events: event_rx,
    }
}

async fn run(
    mut session: ChatSession,
    transport: Option<Arc<dyn MessagingTransport>>,
    mut cmd_rx: mpsc::Receiver<ChatCommand>,
    event_tx: mpsc::Sender<ChatEvent>,
) {
    let conversation = session.conversation_id();
    let mut incoming = transport
        .as_ref()
        .map(|t| t.subscribe(conversation));
    let mut last = Instant::now();

    info!(conversation = %conversation.short(), "Chat driver started");

    loop {
        let deadline = session.next_deadline();

        let wake = tokio::select! {
            cmd = cmd_rx.recv() => Wake::Command(cmd),
            event = recv_transport(&mut incoming) => Wake::Transport(event),
            _ = sleep_until_deadline(deadline) => Wake::Timer,
        };

        let now = Instant::now();
        session.advance(now.duration_since(last));
        last = now;

        match wake {
            Wake::Command(Some(ChatCommand::Close)) | Wake::Command(None) => {
                session.close();
                forward(&mut session, &event_tx);
                break;
            }
            Wake::Command(Some(cmd)) => handle_command(&mut session, cmd),
            Wake::Transport(Some(event)) => handle_transport(&mut session, event),
            Wake::Transport(None) => {
                warn!(conversation = %conversation.short(), "Transport subscription ended");
                incoming = None;
            }
            Wake::Timer => {}
        }

        // Timers create outgoing messages too (a recording reaching its
        // limit), so the queue is drained after every wake-up.
        let outgoing = session.take_outgoing();
        if let Some(transport) = transport.as_deref() {
            for id in outgoing {
                hand_to_transport(&session, transport, id).await;
            }
        }

        forward(&mut session, &event_tx);
    }

    info!(conversation = %conversation.short(), "Chat driver stopped");
}

fn handle_command(session: &mut ChatSession, cmd: ChatCommand) {
    match cmd {
        ChatCommand::SendText(body) => {
            if let Err(e) = session.send_text(&body) {
                warn!(error = %e, "Send failed");
            }
        }
        ChatCommand::StartRecording => {
            if let Err(e) = session.start_recording() {
                warn!(error = %e, "Cannot start recording");
            }
        }
        ChatCommand::StopRecording => {
            if let Err(e) = session.stop_recording() {
                warn!(error = %e, "Cannot stop recording");
            }
        }
        ChatCommand::CancelRecording => {
            session.cancel_recording();
        }
        ChatCommand::MarkRead => {
            session.mark_latest_received_read();
        }
        ChatCommand::Snapshot(reply) => {
            let _ = reply.send(session.messages().to_vec());
        }
        ChatCommand::Close => {}
    }
}

async fn hand_to_transport(session: &ChatSession, transport: &dyn MessagingTransport, id: MessageId) {
    let Some(message) = session.message(id) else {
        return;
    };
    if let Err(e) = transport
        .send_message(session.conversation_id(), message)
        .await
    {
        // The message stays pending; there is no retry.
        warn!(msg_id = %id, error = %e, "Transport send failed");
    }
}

fn handle_transport(session: &mut ChatSession, event: TransportEvent) {
    let result = match event {
        TransportEvent::Delivered { id } => session.acknowledge(id).map(|_| ()),
        TransportEvent::Incoming { body } => session.receive_peer_message(&body).map(|_| ()),
    };
    if let Err(e) = result {
        debug!(error = %e, "Transport event ignored");
    }
}

fn forward(session: &mut ChatSession, event_tx: &mpsc::Sender<ChatEvent>) {
    for event in session.drain_events() {
        match event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(?event, "Event buffer full, event dropped");
            }
            Err(TrySendError::Closed(_)) => break,
        }
    }
}

async fn recv_transport(rx: &mut Option<mpsc::Receiver<TransportEvent>>) -> Option<TransportEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_deadline(deadline: Option<Duration>) {
    match deadline {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}
