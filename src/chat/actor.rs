use super::client::ChatClient;
use super::machine::ChatTurnStateMachine;
use super::message::ChatRequest;
use crate::error::{ChatError, LoadError};
use crate::model::{ChatTurn, TurnId};
use crate::reveal::RevealUpdate;
use crate::slot::Observers;
use crate::transport::{guarded, ChatTransport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Results travelling back from transport calls and reveal tasks.
#[derive(Debug)]
enum ChatEvent {
    Reply {
        id: TurnId,
        attempt: u32,
        result: Result<String, LoadError>,
    },
    Reveal {
        id: TurnId,
        attempt: u32,
        update: RevealUpdate,
    },
}

/// The conversation actor.
///
/// Owns the ordered list of turns, one [`ChatTurnStateMachine`] each, and is the only
/// task that mutates them. Every change to a turn is broadcast to observers as a fresh
/// [`ChatTurn`] snapshot.
pub struct ConversationActor {
    receiver: mpsc::Receiver<ChatRequest>,
    events_tx: mpsc::UnboundedSender<ChatEvent>,
    events_rx: mpsc::UnboundedReceiver<ChatEvent>,
    turns: Vec<ChatTurnStateMachine>,
    next_id: u64,
    observers: Observers<ChatTurn>,
    reveal_interval: Duration,
}

impl ConversationActor {
    pub fn new(buffer_size: usize, reveal_interval: Duration) -> (Self, ChatClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            events_tx,
            events_rx,
            turns: Vec::new(),
            next_id: 1,
            observers: Observers::default(),
            reveal_interval,
        };
        (actor, ChatClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self, transport: Arc<dyn ChatTransport>) {
        info!("Conversation started");
        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &transport),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_event(event),
            }
        }
        // Dropping the machines cancels any reveal still running.
        info!(turns = self.turns.len(), "Conversation shutdown");
    }

    fn handle_request(&mut self, request: ChatRequest, transport: &Arc<dyn ChatTransport>) {
        match request {
            ChatRequest::Send { text, respond_to } => {
                let id = TurnId(self.next_id);
                self.next_id += 1;
                debug!(turn_id = %id, ?text, "Send");
                self.turns.push(ChatTurnStateMachine::new(id, text));
                let index = self.turns.len() - 1;
                self.publish(index);
                self.dispatch(index, transport);
                let _ = respond_to.send(id);
            }
            ChatRequest::Retry { id, respond_to } => {
                let result = self.index_of(id).and_then(|index| {
                    self.turns[index].retry()?;
                    self.publish(index);
                    self.dispatch(index, transport);
                    Ok(())
                });
                let _ = respond_to.send(result);
            }
            ChatRequest::Interrupt {
                id,
                error,
                respond_to,
            } => {
                let result = self.index_of(id).and_then(|index| {
                    self.turns[index].interrupt(error)?;
                    self.publish(index);
                    Ok(())
                });
                let _ = respond_to.send(result);
            }
            ChatRequest::Turns { respond_to } => {
                let _ = respond_to.send(self.snapshots());
            }
            ChatRequest::Subscribe { respond_to } => {
                let _ = respond_to.send(self.observers.register(self.snapshots()));
            }
            ChatRequest::Unsubscribe { id, respond_to } => {
                let _ = respond_to.send(self.observers.remove(id));
            }
        }
    }

    fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Reply {
                id,
                attempt,
                result,
            } => {
                let Ok(index) = self.index_of(id) else { return };
                let events = self.events_tx.clone();
                let applied = self.turns[index].on_response(
                    attempt,
                    result,
                    self.reveal_interval,
                    move |update| {
                        let _ = events.send(ChatEvent::Reveal {
                            id,
                            attempt,
                            update,
                        });
                    },
                );
                if applied {
                    self.publish(index);
                }
            }
            ChatEvent::Reveal {
                id,
                attempt,
                update,
            } => {
                let Ok(index) = self.index_of(id) else { return };
                if self.turns[index].on_reveal(attempt, update) {
                    self.publish(index);
                }
            }
        }
    }

    /// Hands the turn's text to the transport for its current attempt.
    fn dispatch(&mut self, index: usize, transport: &Arc<dyn ChatTransport>) {
        let turn = &mut self.turns[index];
        let id = turn.id();
        let attempt = turn.attempt();
        let text = turn.user_text().to_string();
        let transport = transport.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = guarded("chat send", async move { transport.send_message(&text).await }).await;
            let _ = events.send(ChatEvent::Reply {
                id,
                attempt,
                result,
            });
        });
        if turn.mark_awaiting(attempt) {
            self.publish(index);
        }
    }

    fn index_of(&self, id: TurnId) -> Result<usize, ChatError> {
        self.turns
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| ChatError::TurnNotFound(id.to_string()))
    }

    fn publish(&mut self, index: usize) {
        let snapshot = self.turns[index].snapshot();
        self.observers.notify(&snapshot);
    }

    fn snapshots(&self) -> Vec<ChatTurn> {
        self.turns.iter().map(ChatTurnStateMachine::snapshot).collect()
    }
}
