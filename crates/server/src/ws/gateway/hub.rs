use parley_shared::constants::QUEUE_RETRY_DELAY_MS;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{encode_frame, Client, ClientId, Registry};
use crate::error::{ActionError, RegistryError};
use crate::queue::{ActionQueue, Origin, QueueEntry, QueueError, QueuedAction};
use crate::store::Store;
use crate::ws::actions::{Action, ActionKind};
use crate::ws::events::ServerFrame;
use crate::ws::router::{Fanout, HandlerContext, Outcome, Router};

enum HubCommand {
    Register {
        client: Client,
        reply: oneshot::Sender<Result<(), RegistryError>>,
    },
    Unregister {
        client_id: ClientId,
    },
    Inspect {
        client_id: ClientId,
        reply: oneshot::Sender<Option<ClientSnapshot>>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// Point-in-time view of one registered connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub user_id: i64,
    pub subscriptions: Vec<i64>,
}

impl ClientSnapshot {
    fn of(client: &Client) -> Self {
        let mut subscriptions: Vec<i64> = client.subscriptions().iter().copied().collect();
        subscriptions.sort_unstable();
        Self {
            user_id: client.user_id,
            subscriptions,
        }
    }
}

/// Cloneable front door to the hub, held by connection tasks and routes.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
    queue: Arc<dyn ActionQueue>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    pub fn next_client_id(&self) -> ClientId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn register(&self, client: Client) -> Result<(), RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(HubCommand::Register { client, reply })
            .map_err(|_| RegistryError::HubStopped)?;
        rx.await.map_err(|_| RegistryError::HubStopped)?
    }

    pub fn unregister(&self, client_id: ClientId) {
        if self
            .commands
            .send(HubCommand::Unregister { client_id })
            .is_err()
        {
            tracing::debug!("Hub already stopped, dropping unregister for client {}", client_id);
        }
    }

    /// Enqueue an action for the consumer loop.
    pub async fn publish(&self, origin: Option<Origin>, action: Action) -> Result<(), QueueError> {
        let body = QueuedAction { origin, action }.encode()?;
        self.queue.publish(body).await
    }

    pub async fn client(&self, client_id: ClientId) -> Option<ClientSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(HubCommand::Inspect { client_id, reply })
            .ok()?;
        rx.await.ok().flatten()
    }

    pub async fn client_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(HubCommand::Count { reply }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// The single consumer of the action queue. It owns the registry, routes
/// each queued action, applies new subscriptions and then broadcasts.
pub struct Hub {
    registry: Registry,
    router: Router,
    store: Store,
    queue: Arc<dyn ActionQueue>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
}

impl Hub {
    pub fn new(store: Store, queue: Arc<dyn ActionQueue>) -> (Self, HubHandle) {
        Self::with_router(store, queue, Router::default())
    }

    pub fn with_router(
        store: Store,
        queue: Arc<dyn ActionQueue>,
        router: Router,
    ) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = HubHandle {
            commands: tx,
            queue: Arc::clone(&queue),
            next_id: Arc::new(AtomicU64::new(1)),
        };
        let hub = Self {
            registry: Registry::new(),
            router,
            store,
            queue,
            commands: rx,
        };
        (hub, handle)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every `HubHandle` is dropped.
    pub async fn run(mut self) {
        tracing::info!("Hub consumer loop started");
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command).await,
                    None => break,
                },
                entry = self.queue.receive() => match entry {
                    Ok(entry) => {
                        self.process(&entry).await;
                        if let Err(e) = self.queue.ack(entry.id).await {
                            tracing::error!("Failed to ack queue entry {}: {}", entry.id, e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to receive from action queue: {}", e);
                        tokio::time::sleep(Duration::from_millis(QUEUE_RETRY_DELAY_MS)).await;
                    }
                },
            }
        }
        tracing::info!("Hub consumer loop stopped");
    }

    async fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { mut client, reply } => {
                self.catch_up(&mut client).await;
                let _ = reply.send(self.registry.register(client));
            }
            HubCommand::Unregister { client_id } => {
                self.registry.unregister(client_id);
            }
            HubCommand::Inspect { client_id, reply } => {
                let _ = reply.send(self.registry.get(client_id).map(ClientSnapshot::of));
            }
            HubCommand::Count { reply } => {
                let _ = reply.send(self.registry.len());
            }
        }
    }

    /// Chatrooms created for the user after the connection hydrated were
    /// fanned out while it was not yet registered. Membership is re-read
    /// here, between queue entries, so nothing created before this point
    /// is missed.
    async fn catch_up(&self, client: &mut Client) {
        match self.store.chatroom_ids_by_user(client.user_id).await {
            Ok(ids) => {
                for chatroom_id in ids {
                    if client.subscribe(chatroom_id) {
                        tracing::debug!(
                            "Client {} picked up chatroom {} at registration",
                            client.id,
                            chatroom_id
                        );
                    }
                }
            }
            Err(e) => tracing::warn!(
                "Could not refresh chatrooms for user {} at registration: {}",
                client.user_id,
                e
            ),
        }
    }

    /// Handle one queue entry. Failures are logged and reported to the
    /// submitting client; they never stop the loop.
    async fn process(&mut self, entry: &QueueEntry) {
        let queued = match QueuedAction::decode(&entry.body) {
            Ok(queued) => queued,
            Err(e) => {
                tracing::warn!("Dropping undecodable queue entry {}: {}", entry.id, e);
                return;
            }
        };

        let kind = queued.action.kind();
        let ctx = HandlerContext {
            store: &self.store,
            origin: queued.origin,
        };
        let result = self.router.route(&ctx, queued.action).await;
        match result {
            Ok(outcome) => self.deliver(kind, outcome),
            Err(e) => {
                tracing::error!("handling failed for action kind {}: {}", kind, e);
                self.report_failure(queued.origin, kind, &e);
            }
        }
    }

    fn deliver(&mut self, kind: ActionKind, outcome: Outcome) {
        for sub in &outcome.subscriptions {
            self.registry.subscribe_user(sub.user_id, sub.chatroom_id);
        }

        match outcome.fanout {
            Fanout::Room {
                chatroom_id,
                action,
            } => {
                let Some(frame) = encode_frame(&action) else {
                    return;
                };
                let report = self.registry.broadcast_room(chatroom_id, &frame);
                tracing::debug!(
                    "{} to chatroom {}: {} delivered, {} failed",
                    kind,
                    chatroom_id,
                    report.delivered,
                    report.failed.len()
                );
            }
            Fanout::PerUser(deliveries) => {
                for (user_id, action) in deliveries {
                    let Some(frame) = encode_frame(&action) else {
                        continue;
                    };
                    let report = self.registry.send_to_user(user_id, &frame);
                    tracing::debug!(
                        "{} to user {}: {} delivered, {} failed",
                        kind,
                        user_id,
                        report.delivered,
                        report.failed.len()
                    );
                }
            }
        }
    }

    fn report_failure(&self, origin: Option<Origin>, kind: ActionKind, err: &ActionError) {
        let Some(client_id) = origin.and_then(|o| o.client_id) else {
            return;
        };
        let Some(frame) = ServerFrame::error(err.to_string(), Some(kind)).encode() else {
            return;
        };
        if let Err(e) = self.registry.send_to(client_id, &frame) {
            tracing::debug!("Could not report failure to client {}: {}", client_id, e);
        }
    }
}
