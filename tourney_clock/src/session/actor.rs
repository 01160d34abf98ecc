//! Session actor implementation with async message handling.

use super::{
    commands::{CommandOutcome, SessionCommand},
    config::SessionConfig,
    engine::{SessionView, Standings, TournamentSession, TournamentState},
    messages::{SessionMessage, SessionNotification},
    persistence::SnapshotStore,
};
use crate::{
    clock::ClockEvent,
    errors::{TournamentError, TournamentResult},
    roster::{BuyInType, Player, PlayerId},
    structure::StructureUpdate,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use uuid::Uuid;

/// Session actor handle for sending messages
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    subscriber_capacity: usize,
}

impl SessionHandle {
    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> TournamentResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TournamentError::Closed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> TournamentResult<T> {
        let (response, receiver) = oneshot::channel();
        self.send(message(response)).await?;
        receiver.await.map_err(|_| TournamentError::Closed)
    }

    /// Apply an operator command
    pub async fn command(&self, command: SessionCommand) -> TournamentResult<CommandOutcome> {
        self.request(|response| SessionMessage::Command { command, response })
            .await?
    }

    pub async fn start(&self) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::Start).await
    }

    pub async fn pause(&self) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::Pause).await
    }

    pub async fn reset(&self) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::Reset).await
    }

    pub async fn skip(&self) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::Skip).await
    }

    pub async fn change_structure(
        &self,
        structure_id: impl Into<String>,
    ) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::ChangeStructure {
            structure_id: structure_id.into(),
        })
        .await
    }

    pub async fn update_structure(
        &self,
        update: StructureUpdate,
    ) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::UpdateStructure { update }).await
    }

    pub async fn add_player(
        &self,
        name: impl Into<String>,
        buy_in_type: BuyInType,
        paid_admin_fee: bool,
    ) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::AddPlayer {
            name: name.into(),
            buy_in_type,
            paid_admin_fee,
        })
        .await
    }

    pub async fn remove_player(&self, player_id: PlayerId) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::RemovePlayer { player_id })
            .await
    }

    pub async fn eliminate_player(&self, player_id: PlayerId) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::EliminatePlayer { player_id })
            .await
    }

    pub async fn record_rebuy(&self, player_id: PlayerId) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::RecordRebuy { player_id }).await
    }

    pub async fn record_addon(&self, player_id: PlayerId) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::RecordAddon { player_id }).await
    }

    pub async fn reset_session(&self) -> TournamentResult<CommandOutcome> {
        self.command(SessionCommand::ResetSession).await
    }

    /// Current read model
    pub async fn state(&self) -> TournamentResult<TournamentState> {
        self.request(|response| SessionMessage::GetState { response })
            .await
    }

    /// Current read model with display helpers
    pub async fn view(&self) -> TournamentResult<SessionView> {
        self.request(|response| SessionMessage::GetView { response })
            .await
    }

    /// Current roster in registration order
    pub async fn players(&self) -> TournamentResult<Vec<Player>> {
        self.request(|response| SessionMessage::GetPlayers { response })
            .await
    }

    /// Active players in registration order, eliminated ones in the order
    /// they went out
    pub async fn standings(&self) -> TournamentResult<Standings> {
        self.request(|response| SessionMessage::GetStandings { response })
            .await
    }

    /// Subscribe to session notifications.
    ///
    /// The current view is delivered immediately, then one update per change.
    pub async fn subscribe(
        &self,
    ) -> TournamentResult<(Uuid, mpsc::Receiver<SessionNotification>)> {
        let subscriber_id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(self.subscriber_capacity);
        self.send(SessionMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await?;
        Ok((subscriber_id, receiver))
    }

    pub async fn unsubscribe(&self, subscriber_id: Uuid) -> TournamentResult<()> {
        self.send(SessionMessage::Unsubscribe { subscriber_id })
            .await
    }

    /// Stop the actor and its countdown driver
    pub async fn shutdown(&self) -> TournamentResult<()> {
        self.send(SessionMessage::Shutdown).await
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Armed countdown driver
struct Countdown {
    generation: u64,
    task: JoinHandle<()>,
}

/// Actor owning a single tournament session.
///
/// Commands and ticks are processed strictly one at a time. While the clock
/// runs, a driver task posts one `Tick` per interval; every transition out of
/// running disarms it, and ticks from a disarmed driver are ignored by
/// generation.
pub struct SessionActor {
    /// Session state
    session: TournamentSession,

    /// Snapshot storage, written after every change
    store: Arc<dyn SnapshotStore>,

    /// Message inbox
    inbox: mpsc::Receiver<SessionMessage>,

    /// Sender handed to the countdown driver; weak so the actor stops when
    /// every handle is dropped
    weak_sender: mpsc::WeakSender<SessionMessage>,

    /// Actor configuration
    config: SessionConfig,

    /// Current countdown driver, if armed
    countdown: Option<Countdown>,

    /// Last issued driver generation
    generation: u64,

    /// Subscribers for session notifications
    subscribers: HashMap<Uuid, mpsc::Sender<SessionNotification>>,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(
        session: TournamentSession,
        store: Arc<dyn SnapshotStore>,
        config: SessionConfig,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);

        let actor = Self {
            session,
            store,
            inbox,
            weak_sender: sender.downgrade(),
            config,
            countdown: None,
            generation: 0,
            subscribers: HashMap::new(),
        };

        let handle = SessionHandle {
            sender,
            subscriber_capacity: config.subscriber_capacity,
        };

        (actor, handle)
    }

    /// Create the actor and run it on the current runtime
    pub fn spawn(
        session: TournamentSession,
        store: Arc<dyn SnapshotStore>,
        config: SessionConfig,
    ) -> SessionHandle {
        let (actor, handle) = Self::new(session, store, config);
        tokio::spawn(actor.run());
        handle
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Session starting on structure '{}'",
            self.session.structure().id
        );

        self.sync_countdown();

        while let Some(message) = self.inbox.recv().await {
            if matches!(message, SessionMessage::Shutdown) {
                break;
            }
            self.handle_message(message);
        }

        self.disarm();
        log::info!("Session stopped");
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Command { command, response } => {
                let result = self.handle_command(command);
                let _ = response.send(result);
            }
            SessionMessage::GetState { response } => {
                let _ = response.send(self.session.state());
            }
            SessionMessage::GetView { response } => {
                let _ = response.send(self.session.view());
            }
            SessionMessage::GetPlayers { response } => {
                let _ = response.send(self.session.players().to_vec());
            }
            SessionMessage::GetStandings { response } => {
                let _ = response.send(self.session.standings());
            }
            SessionMessage::Tick { generation } => self.handle_tick(generation),
            SessionMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                let _ = sender.try_send(SessionNotification::Updated(self.session.view()));
                self.subscribers.insert(subscriber_id, sender);
                log::debug!("Subscriber {} added", subscriber_id);
            }
            SessionMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!("Subscriber {} removed", subscriber_id);
            }
            SessionMessage::Shutdown => {}
        }
    }

    fn handle_command(&mut self, command: SessionCommand) -> TournamentResult<CommandOutcome> {
        let name = command.name();
        let result = self.session.apply(command);

        match &result {
            Ok(outcome) if outcome.changed => {
                log::debug!("Command {} applied", name);
                self.commit(&outcome.events);
            }
            Ok(_) => log::debug!("Command {} was a no-op", name),
            Err(e) => log::info!("Command {} rejected: {}", name, e),
        }

        self.sync_countdown();
        result
    }

    fn handle_tick(&mut self, generation: u64) {
        let current = self.countdown.as_ref().map(|c| c.generation);
        if current != Some(generation) {
            log::trace!("Ignoring stale tick from generation {}", generation);
            return;
        }

        let events = self.session.tick();
        self.commit(&events);
        self.sync_countdown();
    }

    /// Persist, then notify subscribers of the events and the new view
    fn commit(&mut self, events: &[ClockEvent]) {
        if let Err(e) = self.store.save(&self.session.snapshot()) {
            log::error!("Failed to save snapshot: {}", e);
        }

        for event in events {
            log::info!("Clock event: {:?}", event);
            self.notify(SessionNotification::Clock(*event));
        }
        self.notify(SessionNotification::Updated(self.session.view()));
    }

    /// Broadcast a notification to all subscribers
    fn notify(&mut self, notification: SessionNotification) {
        self.subscribers.retain(|subscriber_id, sender| {
            match sender.try_send(notification.clone()) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping notification",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            }
        });
    }

    /// Keep exactly one driver armed while the clock runs, none otherwise
    fn sync_countdown(&mut self) {
        let running = self.session.clock().is_running();
        match (running, self.countdown.is_some()) {
            (true, false) => self.arm(),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    fn arm(&mut self) {
        self.disarm();
        self.generation += 1;

        let generation = self.generation;
        let sender = self.weak_sender.clone();
        let period = self.config.tick_interval;

        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;
                let Some(sender) = sender.upgrade() else {
                    break;
                };
                if sender
                    .send(SessionMessage::Tick { generation })
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        log::debug!("Countdown armed (generation {})", generation);
        self.countdown = Some(Countdown { generation, task });
    }

    fn disarm(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.task.abort();
            log::debug!("Countdown disarmed (generation {})", countdown.generation);
        }
    }
}
