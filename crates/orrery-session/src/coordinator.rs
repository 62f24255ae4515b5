//! Session lifecycle coordinator
//!
//! Drives `Idle -> Activating -> Connected -> Leaving -> Idle` and is the sole
//! mutator of the shared state store. Store and roster live behind one
//! `parking_lot::Mutex` that is never held across an `.await`.
//!
//! Each connected session owns two tasks:
//!
//! - an inbound loop that selects between the session's cancellation token
//!   and the next inbound action, re-checking the token under the state lock
//!   before every apply so nothing is applied once `leave` has started;
//! - an outbound pump that drains a queue of actions into the message
//!   channel in order, so local broadcasts never wait on the network.
//!
//! Both tasks hold only a `Weak` reference to the coordinator, so dropping the
//! last [`SessionCoordinator`] handle cancels the session.
//!
//! A newcomer is answered with one `SynchronizeState` from the earliest other
//! member. Whoever receives a snapshot re-announces its own entry if the
//! snapshot disagrees with it, since presence and immersion are owned by the
//! participant they describe.

use crate::channel::{ActionChannel, InboundAction, InboundActionStream};
use crate::config::CoordinatorConfig;
use crate::errors::{activation_error, Result, SessionError};
use crate::immersion::{ImmersionTracker, ImmersiveSpaceState, InvalidImmersionTransition};
use crate::protocol::{Action, Participant, SharedState, Vector3};
use crate::store::SharedStateStore;
use futures::StreamExt;
use orrery_core::config::ConfigValidation;
use orrery_core::{
    ParticipantId, PhysicalTime, PhysicalTimeEffects, SessionHandle, SessionId,
    SessionTransportEffects, TransportError,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Lifecycle phase of a coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// No session
    #[default]
    Idle,
    /// Session establishment in progress
    Activating,
    /// Joined and exchanging actions
    Connected,
    /// Teardown in progress
    Leaving,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Activating => "activating",
            Self::Connected => "connected",
            Self::Leaving => "leaving",
        };
        f.write_str(name)
    }
}

/// The session currently owned by a coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Transport-assigned session identifier
    pub id: SessionId,
    /// Identifier of the local participant within this session
    pub local_participant: ParticipantId,
    /// Current lifecycle phase
    pub lifecycle: LifecycleState,
}

/// Coordinates one group session at a time.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    transport: Arc<dyn SessionTransportEffects>,
    clock: Arc<dyn PhysicalTimeEffects>,
    state: Mutex<CoordinatorState>,
    snapshots: watch::Sender<SharedState>,
}

#[derive(Default)]
struct CoordinatorState {
    lifecycle: LifecycleState,
    store: SharedStateStore,
    immersion: ImmersionTracker,
    /// Handle of the session from commit until teardown completes
    current: Option<SessionHandle>,
    active: Option<ActiveSession>,
    /// Bumped whenever a pending establishment is superseded
    generation: u64,
}

/// Per-session resources; dropping it cancels the inbound loop
struct ActiveSession {
    handle: SessionHandle,
    cancel: CancellationToken,
    outbound: Option<mpsc::UnboundedSender<Action>>,
    pump: Option<JoinHandle<()>>,
    _inbound: JoinHandle<()>,
}

impl ActiveSession {
    fn enqueue(&self, action: Action) {
        let Some(outbound) = &self.outbound else {
            return;
        };
        if outbound.send(action).is_err() {
            debug!(session_id = %self.handle.session_id, "outbound pump closed; action dropped");
        }
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

enum LeavePlan {
    Done,
    Teardown {
        handle: SessionHandle,
        pump: Option<JoinHandle<()>>,
        _session: ActiveSession,
    },
}

impl SessionCoordinator {
    /// Create a coordinator with injected transport and clock
    pub fn new<T, C>(
        config: CoordinatorConfig,
        transport: T,
        clock: C,
    ) -> orrery_core::Result<Self>
    where
        T: SessionTransportEffects + 'static,
        C: PhysicalTimeEffects + 'static,
    {
        config.validate()?;
        let (snapshots, _) = watch::channel(SharedState::default());
        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                transport: Arc::new(transport),
                clock: Arc::new(clock),
                state: Mutex::new(CoordinatorState::default()),
                snapshots,
            }),
        })
    }

    /// Start a new session offering the configured activity.
    ///
    /// Returns once joined; the inbound loop keeps running in the background.
    /// On failure the coordinator reverts to `Idle`.
    pub async fn activate(&self) -> Result<SessionHandle> {
        let generation = self.inner.begin_activation()?;
        info!(activity = %self.inner.config.activity.identifier, "activating group session");

        let activation = self.inner.transport.activate(&self.inner.config.activity);
        let result = match self.inner.config.activation_timeout() {
            Some(limit) => tokio::time::timeout(limit, activation)
                .await
                .unwrap_or_else(|_| {
                    Err(TransportError::Timeout {
                        operation: "activate".to_string(),
                        timeout_ms: self.inner.config.activation_timeout_ms.unwrap_or_default(),
                    })
                }),
            None => activation.await,
        };

        match result {
            Ok(handle) => self.inner.connect(handle, generation).await,
            Err(err) => {
                self.inner.abandon(generation);
                warn!(error = %err, "session activation failed");
                Err(activation_error(err))
            }
        }
    }

    /// Join a session someone else started, e.g. from an invitation.
    ///
    /// Supersedes a pending activation. Rejected with
    /// [`SessionError::AlreadyConnected`] while another session is active.
    pub async fn join_existing(&self, handle: SessionHandle) -> Result<SessionHandle> {
        let generation = self.inner.begin_join(&handle)?;
        info!(session_id = %handle.session_id, "joining existing session");
        self.inner.connect(handle, generation).await
    }

    /// Leave the current session.
    ///
    /// A no-op when idle or already leaving. Queued outbound actions get
    /// `outbound_drain_timeout_ms` to flush before the transport is told.
    pub async fn leave(&self) {
        let plan = self.inner.begin_leave();
        let LeavePlan::Teardown {
            handle,
            pump,
            _session,
        } = plan
        else {
            return;
        };

        if let Some(mut pump) = pump {
            let drain = self.inner.config.outbound_drain_timeout();
            if tokio::time::timeout(drain, &mut pump).await.is_err() {
                warn!(
                    session_id = %handle.session_id,
                    timeout_ms = self.inner.config.outbound_drain_timeout_ms,
                    "outbound queue did not drain before leave; dropping remaining actions"
                );
                pump.abort();
            }
        }

        if let Err(err) = self.inner.transport.leave(&handle).await {
            warn!(session_id = %handle.session_id, error = %err, "transport leave failed");
        }

        self.inner.finish_leave();
        info!(session_id = %handle.session_id, "left session");
    }

    /// Apply `action` locally right away, then queue it for broadcast.
    ///
    /// Dropped without error when not connected.
    pub async fn broadcast_local(&self, action: Action) {
        let now = self.inner.now().await;
        self.inner.apply_local(now, |_| action);
    }

    /// Add `delta` to the local globe rotation and broadcast the result
    pub async fn rotate_globe(&self, delta: Vector3) {
        let now = self.inner.now().await;
        self.inner
            .apply_local(now, |store| Action::RotateGlobe(store.globe_rotation() + delta));
    }

    /// Broadcast the full local snapshot so every participant converges on it
    pub async fn request_full_sync(&self) {
        let now = self.inner.now().await;
        self.inner
            .apply_local(now, |store| Action::SynchronizeState(store.current_snapshot()));
    }

    /// Report a change of the local immersive space.
    ///
    /// Settled transitions are announced to the session when connected.
    pub async fn set_immersive_space_state(
        &self,
        next: ImmersiveSpaceState,
    ) -> std::result::Result<(), InvalidImmersionTransition> {
        let now = self.inner.now().await;
        self.inner.set_immersion(next, now)
    }

    /// Present shared state
    pub fn current_snapshot(&self) -> SharedState {
        self.inner.state.lock().store.current_snapshot()
    }

    /// Number of participants in the roster
    pub fn participant_count(&self) -> usize {
        self.inner.state.lock().store.roster().count()
    }

    /// Returns `true` while connected to a session
    pub fn is_connected(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Connected
    }

    /// Current lifecycle phase
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.inner.state.lock().lifecycle
    }

    /// The session this coordinator owns, if any
    pub fn session(&self) -> Option<Session> {
        let state = self.inner.state.lock();
        state.current.as_ref().map(|handle| Session {
            id: handle.session_id,
            local_participant: handle.local_participant.clone(),
            lifecycle: state.lifecycle,
        })
    }

    /// Local immersive space phase
    pub fn immersive_space_state(&self) -> ImmersiveSpaceState {
        self.inner.state.lock().immersion.state()
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SharedState> {
        self.inner.snapshots.subscribe()
    }

    /// Configuration in use
    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }
}

impl fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SessionCoordinator")
            .field("lifecycle", &state.lifecycle)
            .field("session", &state.current.as_ref().map(|h| h.session_id))
            .finish_non_exhaustive()
    }
}

impl CoordinatorInner {
    /// Application time for the next apply; falls back to the last applied
    /// timestamp when the clock fails.
    async fn now(&self) -> PhysicalTime {
        match self.clock.physical_time().await {
            Ok(now) => now,
            Err(err) => {
                warn!(error = %err, "clock unavailable; reusing last applied timestamp");
                self.state.lock().store.last_updated()
            }
        }
    }

    fn publish(&self, state: &CoordinatorState) {
        self.snapshots.send_replace(state.store.current_snapshot());
    }

    fn occupied(state: &CoordinatorState) -> Option<SessionError> {
        match (state.lifecycle, &state.current) {
            (LifecycleState::Connected | LifecycleState::Leaving, Some(handle)) => {
                Some(SessionError::AlreadyConnected {
                    session_id: handle.session_id,
                })
            }
            _ => None,
        }
    }

    fn begin_activation(&self) -> Result<u64> {
        let mut state = self.state.lock();
        if let Some(err) = Self::occupied(&state) {
            return Err(err);
        }
        if state.lifecycle == LifecycleState::Activating {
            return Err(SessionError::activation_failed(
                "session establishment already in progress",
            ));
        }
        state.lifecycle = LifecycleState::Activating;
        state.generation += 1;
        Ok(state.generation)
    }

    fn begin_join(&self, handle: &SessionHandle) -> Result<u64> {
        let mut state = self.state.lock();
        if let Some(err) = Self::occupied(&state) {
            warn!(
                session_id = %handle.session_id,
                error = %err,
                "rejecting join while another session is active"
            );
            return Err(err);
        }
        if state.lifecycle == LifecycleState::Activating {
            info!(session_id = %handle.session_id, "join supersedes pending activation");
        }
        state.lifecycle = LifecycleState::Activating;
        state.generation += 1;
        Ok(state.generation)
    }

    fn is_pending(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.generation == generation && state.lifecycle == LifecycleState::Activating
    }

    /// Revert a failed establishment to `Idle` unless it was superseded
    fn abandon(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation == generation && state.lifecycle == LifecycleState::Activating {
            state.lifecycle = LifecycleState::Idle;
        }
    }

    async fn release_superseded(&self, handle: &SessionHandle) -> SessionError {
        info!(session_id = %handle.session_id, "establishment superseded; releasing session");
        if let Err(err) = self.transport.leave(handle).await {
            debug!(session_id = %handle.session_id, error = %err, "release failed");
        }
        SessionError::activation_failed("superseded by leave or another join")
    }

    async fn connect(
        self: &Arc<Self>,
        handle: SessionHandle,
        generation: u64,
    ) -> Result<SessionHandle> {
        if !self.is_pending(generation) {
            return Err(self.release_superseded(&handle).await);
        }

        if let Err(err) = self.transport.join(&handle).await {
            self.abandon(generation);
            warn!(session_id = %handle.session_id, error = %err, "joining session failed");
            return Err(activation_error(err));
        }

        if let Some(spatial) = &self.config.spatial {
            match self.transport.configure_spatial(&handle, spatial).await {
                Ok(()) => debug!(
                    session_id = %handle.session_id,
                    template = ?spatial.template,
                    "spatial configuration applied"
                ),
                Err(err) => warn!(
                    session_id = %handle.session_id,
                    error = %err,
                    "spatial configuration failed; continuing without it"
                ),
            }
        }

        let channel = match self.transport.message_channel(&handle).await {
            Ok(channel) => ActionChannel::new(channel),
            Err(err) => {
                if let Err(leave_err) = self.transport.leave(&handle).await {
                    debug!(
                        session_id = %handle.session_id,
                        error = %leave_err,
                        "leave after channel failure failed"
                    );
                }
                self.abandon(generation);
                warn!(session_id = %handle.session_id, error = %err, "message channel unavailable");
                return Err(activation_error(err));
            }
        };

        let now = self.now().await;
        if !self.commit(&handle, channel, generation, now) {
            return Err(self.release_superseded(&handle).await);
        }

        info!(
            session_id = %handle.session_id,
            participant_id = %handle.local_participant,
            "session connected"
        );
        Ok(handle)
    }

    /// Enter `Connected`: register self, start the session tasks, announce
    /// presence. Returns `false` if the establishment was superseded.
    fn commit(
        self: &Arc<Self>,
        handle: &SessionHandle,
        channel: ActionChannel,
        generation: u64,
        now: PhysicalTime,
    ) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation || state.lifecycle != LifecycleState::Activating {
            return false;
        }

        let local_id = handle.local_participant.clone();
        let local = Participant::new(local_id.clone(), self.config.display_name.clone());
        state
            .store
            .apply(&local_id, Action::ParticipantJoined(local.clone()), now);

        let cancel = CancellationToken::new();
        let (outbound, queue) = mpsc::unbounded_channel();
        let inbound = tokio::spawn(run_inbound_loop(
            Arc::downgrade(self),
            channel.receive(),
            cancel.clone(),
            generation,
            handle.session_id,
        ));
        let pump = tokio::spawn(run_outbound_pump(channel, queue, handle.session_id));

        let active = ActiveSession {
            handle: handle.clone(),
            cancel,
            outbound: Some(outbound),
            pump: Some(pump),
            _inbound: inbound,
        };
        active.enqueue(Action::ParticipantJoined(local));

        if let Some(style) = state.immersion.open_style().map(str::to_string) {
            let enter = Action::EnterImmersiveSpace(style);
            state.store.apply(&local_id, enter.clone(), now);
            active.enqueue(enter);
        }

        state.current = Some(handle.clone());
        state.active = Some(active);
        state.lifecycle = LifecycleState::Connected;
        self.publish(&state);
        true
    }

    fn begin_leave(&self) -> LeavePlan {
        let mut state = self.state.lock();
        match state.lifecycle {
            LifecycleState::Idle | LifecycleState::Leaving => {
                debug!(lifecycle = %state.lifecycle, "leave ignored");
                return LeavePlan::Done;
            }
            LifecycleState::Activating => {
                state.generation += 1;
                state.lifecycle = LifecycleState::Idle;
                info!("pending session establishment cancelled");
                return LeavePlan::Done;
            }
            LifecycleState::Connected => {}
        }

        let Some(mut active) = state.active.take() else {
            state.lifecycle = LifecycleState::Idle;
            state.current = None;
            return LeavePlan::Done;
        };
        state.lifecycle = LifecycleState::Leaving;
        active.cancel.cancel();
        info!(session_id = %active.handle.session_id, "leaving session");

        let farewell = Action::ParticipantLeft(active.handle.local_participant.clone());
        active.enqueue(farewell);
        active.outbound = None;

        LeavePlan::Teardown {
            handle: active.handle.clone(),
            pump: active.pump.take(),
            _session: active,
        }
    }

    fn finish_leave(&self) {
        let mut state = self.state.lock();
        state.store.reset();
        state.current = None;
        state.lifecycle = LifecycleState::Idle;
        self.publish(&state);
    }

    /// Tear down a session whose inbound stream ended without a local leave
    fn end_session(&self, generation: u64, session_id: SessionId) {
        let mut state = self.state.lock();
        let same_session = state.generation == generation
            && state.lifecycle == LifecycleState::Connected
            && state.current.as_ref().map(|h| h.session_id) == Some(session_id);
        if !same_session {
            return;
        }
        state.active = None;
        state.store.reset();
        state.current = None;
        state.lifecycle = LifecycleState::Idle;
        self.publish(&state);
        info!(session_id = %session_id, "session ended by transport");
    }

    fn apply_local(&self, now: PhysicalTime, build: impl FnOnce(&SharedStateStore) -> Action) {
        let mut state = self.state.lock();
        let CoordinatorState {
            lifecycle,
            store,
            active,
            ..
        } = &mut *state;

        let active = match active {
            Some(active) if *lifecycle == LifecycleState::Connected => active,
            _ => {
                debug!(lifecycle = %lifecycle, "not connected; local action dropped");
                return;
            }
        };

        let action = build(store);
        trace!(action = action.kind(), "applying local action");
        store.apply(&active.handle.local_participant, action.clone(), now);
        active.enqueue(action);
        self.publish(&state);
    }

    fn apply_inbound(&self, cancel: &CancellationToken, inbound: InboundAction, now: PhysicalTime) {
        let mut state = self.state.lock();
        if cancel.is_cancelled() {
            debug!(action = inbound.action.kind(), "session cancelled; inbound action dropped");
            return;
        }

        let InboundAction { sender, action } = inbound;
        let kind = action.kind();
        let newcomer = match &action {
            Action::ParticipantJoined(participant) if self.config.sync_late_joiners => {
                Some(participant.id.clone())
            }
            _ => None,
        };
        let synchronized = matches!(action, Action::SynchronizeState(_));

        let outcome = state.store.apply(&sender, action, now);
        trace!(action = kind, sender = %sender, ?outcome, "applied inbound action");

        let CoordinatorState {
            store,
            immersion,
            active,
            ..
        } = &mut *state;
        if let Some(active) = active.as_ref() {
            let local_id = &active.handle.local_participant;

            if let Some(newcomer) = newcomer.filter(|_| outcome.is_changed()) {
                if answers_joiner(store, local_id, &newcomer) {
                    debug!(participant_id = %newcomer, "sending full state to late joiner");
                    active.enqueue(Action::SynchronizeState(store.current_snapshot()));
                }
            }

            if synchronized {
                let repairs = local_entry_repairs(
                    store,
                    local_id,
                    &self.config.display_name,
                    immersion.open_style(),
                );
                for repair in repairs {
                    debug!(action = repair.kind(), "restoring own roster entry after sync");
                    store.apply(local_id, repair.clone(), now);
                    active.enqueue(repair);
                }
            }
        }
        self.publish(&state);
    }

    fn set_immersion(
        &self,
        next: ImmersiveSpaceState,
        now: PhysicalTime,
    ) -> std::result::Result<(), InvalidImmersionTransition> {
        let mut state = self.state.lock();
        let style = self.config.default_immersion_style.clone();
        let Some(announcement) = state.immersion.transition(next, &style)? else {
            return Ok(());
        };
        debug!(state = %next, action = announcement.kind(), "immersive space settled");

        let CoordinatorState {
            lifecycle,
            store,
            active,
            ..
        } = &mut *state;
        if let (LifecycleState::Connected, Some(active)) = (*lifecycle, active.as_ref()) {
            store.apply(&active.handle.local_participant, announcement.clone(), now);
            active.enqueue(announcement);
            self.publish(&state);
        }
        Ok(())
    }
}

/// Returns `true` if `local` is the earliest member besides `newcomer`.
///
/// Every member with the same roster picks the same responder, so a joiner
/// receives one snapshot instead of one per member.
fn answers_joiner(
    store: &SharedStateStore,
    local: &ParticipantId,
    newcomer: &ParticipantId,
) -> bool {
    newcomer != local && store.roster().ids().find(|id| *id != newcomer) == Some(local)
}

/// Actions that bring the local participant's roster entry back in line with
/// local truth after a snapshot overwrote it.
///
/// Each participant is the authority over its own presence and immersion; a
/// snapshot taken before our announcements arrived would otherwise erase them.
fn local_entry_repairs(
    store: &SharedStateStore,
    local: &ParticipantId,
    display_name: &str,
    open_style: Option<&str>,
) -> Vec<Action> {
    let mut repairs = Vec::new();
    if !store.roster().contains(local) {
        repairs.push(Action::ParticipantJoined(Participant::new(
            local.clone(),
            display_name,
        )));
    }

    let entry = store.roster().get(local);
    let immersive = entry.is_some_and(|p| p.is_immersive);
    let style = entry.and_then(|p| p.immersion_style.as_deref());
    match open_style {
        Some(open) if !(immersive && style == Some(open)) => {
            repairs.push(Action::EnterImmersiveSpace(open.to_string()));
        }
        None if immersive || style.is_some() => repairs.push(Action::ExitImmersiveSpace),
        _ => {}
    }
    repairs
}

async fn run_inbound_loop(
    inner: Weak<CoordinatorInner>,
    mut inbound: InboundActionStream,
    cancel: CancellationToken,
    generation: u64,
    session_id: SessionId,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = inbound.next() => next,
        };
        let Some(inner) = inner.upgrade() else {
            break;
        };

        match next {
            Some(Ok(action)) => {
                let now = inner.now().await;
                inner.apply_inbound(&cancel, action, now);
            }
            Some(Err(err)) => {
                warn!(session_id = %session_id, error = %err, "dropping malformed inbound message");
            }
            None => {
                if !cancel.is_cancelled() {
                    inner.end_session(generation, session_id);
                }
                break;
            }
        }
    }
    debug!(session_id = %session_id, "inbound loop stopped");
}

async fn run_outbound_pump(
    channel: ActionChannel,
    mut queue: mpsc::UnboundedReceiver<Action>,
    session_id: SessionId,
) {
    while let Some(action) = queue.recv().await {
        if let Err(err) = channel.send(&action).await {
            warn!(
                session_id = %session_id,
                action = action.kind(),
                error = %err,
                "broadcast failed"
            );
        }
    }
    debug!(session_id = %session_id, "outbound queue drained");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ParticipantId {
        ParticipantId::from(raw)
    }

    fn store_with(members: &[&str]) -> SharedStateStore {
        let mut store = SharedStateStore::new();
        for member in members {
            store.apply(
                &id(member),
                Action::ParticipantJoined(Participant::new(*member, *member)),
                PhysicalTime::from_millis(1),
            );
        }
        store
    }

    #[test]
    fn test_only_earliest_member_answers_joiner() {
        let store = store_with(&["ana", "ben", "carol"]);
        assert!(answers_joiner(&store, &id("ana"), &id("carol")));
        assert!(!answers_joiner(&store, &id("ben"), &id("carol")));
        assert!(!answers_joiner(&store, &id("carol"), &id("carol")));

        // The earliest member joining again is answered by the next one.
        assert!(answers_joiner(&store, &id("ben"), &id("ana")));
    }

    #[test]
    fn test_repairs_restore_missing_entry_and_open_space() {
        let store = store_with(&["ana"]);
        let repairs = local_entry_repairs(&store, &id("ben"), "Ben", Some("full"));
        assert_eq!(
            repairs,
            vec![
                Action::ParticipantJoined(Participant::new("ben", "Ben")),
                Action::EnterImmersiveSpace("full".to_string()),
            ]
        );
    }

    #[test]
    fn test_repairs_reannounce_overwritten_immersion() {
        let mut store = store_with(&["ana", "ben"]);
        assert_eq!(
            local_entry_repairs(&store, &id("ben"), "Ben", Some("mixed")),
            vec![Action::EnterImmersiveSpace("mixed".to_string())]
        );

        store.apply(
            &id("ben"),
            Action::EnterImmersiveSpace("mixed".to_string()),
            PhysicalTime::from_millis(2),
        );
        assert!(local_entry_repairs(&store, &id("ben"), "Ben", Some("mixed")).is_empty());
        assert_eq!(
            local_entry_repairs(&store, &id("ben"), "Ben", None),
            vec![Action::ExitImmersiveSpace]
        );
    }

    #[test]
    fn test_no_repairs_when_entry_matches() {
        let store = store_with(&["ana", "ben"]);
        assert!(local_entry_repairs(&store, &id("ben"), "Ben", None).is_empty());
    }
}
