//! In-memory group-session transport
//!
//! [`MemorySessionHub`] plays the role of the platform's group-session
//! service. Each participant gets a [`MemoryTransport`] bound to the hub;
//! payloads sent by one member are delivered to every other member of the
//! same session, in send order.
//!
//! Behavior toggles let tests refuse or stall activation, fail or stall
//! sends, and reject spatial configuration.

use async_trait::async_trait;
use futures::StreamExt;
use indexmap::IndexMap;
use orrery_core::{
    ActivityDescriptor, InboundMessage, InboundMessageStream, InvitationEffects, InvitationStream,
    MessageChannel, ParticipantId, SessionHandle, SessionId, SessionTransportEffects,
    SpatialConfiguration, TransportError,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;

struct HubMember {
    sender: mpsc::UnboundedSender<InboundMessage>,
    receiver: Option<mpsc::UnboundedReceiver<InboundMessage>>,
}

#[derive(Default)]
struct HubState {
    sessions: HashMap<SessionId, IndexMap<ParticipantId, HubMember>>,
    invitations: HashMap<ParticipantId, Vec<mpsc::UnboundedSender<SessionHandle>>>,
}

/// Shared in-memory group-session service
#[derive(Clone, Default)]
pub struct MemorySessionHub {
    state: Arc<Mutex<HubState>>,
}

impl MemorySessionHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport for `participant`, bound to this hub
    pub fn transport(&self, participant: impl Into<ParticipantId>) -> MemoryTransport {
        MemoryTransport {
            hub: self.clone(),
            participant: participant.into(),
            behavior: Arc::new(TransportBehavior::default()),
            log: Arc::new(Mutex::new(TransportLog::default())),
        }
    }

    /// Create a session nobody has joined yet
    pub fn create_session(&self) -> SessionId {
        let session_id = SessionId::new();
        self.state.lock().sessions.insert(session_id, IndexMap::new());
        session_id
    }

    /// Deliver an invitation to `session_id` to every invitation subscriber of
    /// `participant`. Returns the number of subscribers reached.
    pub fn invite(&self, session_id: SessionId, participant: impl Into<ParticipantId>) -> usize {
        let participant = participant.into();
        let handle = SessionHandle::new(session_id, participant.clone());
        let mut state = self.state.lock();
        let Some(subscribers) = state.invitations.get_mut(&participant) else {
            return 0;
        };
        subscribers.retain(|tx| tx.send(handle.clone()).is_ok());
        subscribers.len()
    }

    /// End a session for everyone; every member's inbound stream terminates
    pub fn end_session(&self, session_id: SessionId) {
        self.state.lock().sessions.remove(&session_id);
    }

    /// Deliver raw bytes to one member as if `sender` had sent them
    pub fn deliver_raw(
        &self,
        session_id: SessionId,
        sender: impl Into<ParticipantId>,
        recipient: &ParticipantId,
        payload: Vec<u8>,
    ) -> bool {
        let state = self.state.lock();
        state
            .sessions
            .get(&session_id)
            .and_then(|members| members.get(recipient))
            .is_some_and(|member| {
                member
                    .sender
                    .send(InboundMessage {
                        sender: sender.into(),
                        payload,
                    })
                    .is_ok()
            })
    }

    /// Participants currently joined to `session_id`, in join order
    pub fn members(&self, session_id: SessionId) -> Vec<ParticipantId> {
        self.state
            .lock()
            .sessions
            .get(&session_id)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the hub knows `session_id`
    pub fn has_session(&self, session_id: SessionId) -> bool {
        self.state.lock().sessions.contains_key(&session_id)
    }

    fn join(&self, handle: &SessionHandle) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let members = state
            .sessions
            .get_mut(&handle.session_id)
            .ok_or_else(|| TransportError::Unavailable {
                reason: format!("no such session {}", handle.session_id),
            })?;
        members
            .entry(handle.local_participant.clone())
            .or_insert_with(|| {
                let (sender, receiver) = mpsc::unbounded_channel();
                HubMember {
                    sender,
                    receiver: Some(receiver),
                }
            });
        Ok(())
    }

    fn leave(&self, handle: &SessionHandle) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        let members = state
            .sessions
            .get_mut(&handle.session_id)
            .ok_or(TransportError::NotConnected)?;
        members
            .shift_remove(&handle.local_participant)
            .map(|_| ())
            .ok_or(TransportError::NotConnected)
    }

    fn take_receiver(
        &self,
        handle: &SessionHandle,
    ) -> Result<Option<mpsc::UnboundedReceiver<InboundMessage>>, TransportError> {
        let mut state = self.state.lock();
        state
            .sessions
            .get_mut(&handle.session_id)
            .and_then(|members| members.get_mut(&handle.local_participant))
            .map(|member| member.receiver.take())
            .ok_or(TransportError::NotConnected)
    }

    fn broadcast(
        &self,
        session_id: SessionId,
        from: &ParticipantId,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        let state = self.state.lock();
        let members = state
            .sessions
            .get(&session_id)
            .filter(|members| members.contains_key(from))
            .ok_or(TransportError::NotConnected)?;
        for (id, member) in members {
            if id == from {
                continue;
            }
            // A member whose receiver is gone simply misses the message.
            let _ = member.sender.send(InboundMessage {
                sender: from.clone(),
                payload: payload.clone(),
            });
        }
        Ok(())
    }

    fn subscribe_invitations(&self, participant: &ParticipantId) -> InvitationStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state
            .lock()
            .invitations
            .entry(participant.clone())
            .or_default()
            .push(tx);
        UnboundedReceiverStream::new(rx).boxed()
    }
}

/// Gate that holds callers while stalled
struct Gate {
    stalled: watch::Sender<bool>,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            stalled: watch::channel(false).0,
        }
    }
}

impl Gate {
    fn set(&self, stalled: bool) {
        self.stalled.send_replace(stalled);
    }

    async fn pass(&self) {
        let mut rx = self.stalled.subscribe();
        // The sender lives as long as the gate, so this only returns once released.
        let _ = rx.wait_for(|stalled| !*stalled).await;
    }
}

#[derive(Default)]
struct TransportBehavior {
    refuse_activation: AtomicBool,
    fail_sends: AtomicBool,
    spatial_unsupported: AtomicBool,
    activation_gate: Gate,
    send_gate: Gate,
}

/// Calls a [`MemoryTransport`] has seen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportLog {
    /// Activities passed to `activate`
    pub activations: Vec<ActivityDescriptor>,
    /// Sessions passed to `join`
    pub joins: Vec<SessionId>,
    /// Sessions passed to `leave`
    pub leaves: Vec<SessionId>,
    /// Accepted spatial configurations
    pub spatial: Vec<SpatialConfiguration>,
    /// Payloads accepted by the message channel
    pub sent: Vec<Vec<u8>>,
}

/// One participant's view of a [`MemorySessionHub`]
#[derive(Clone)]
pub struct MemoryTransport {
    hub: MemorySessionHub,
    participant: ParticipantId,
    behavior: Arc<TransportBehavior>,
    log: Arc<Mutex<TransportLog>>,
}

impl MemoryTransport {
    /// Participant id assigned to this transport's user
    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    /// Hub this transport is bound to
    pub fn hub(&self) -> &MemorySessionHub {
        &self.hub
    }

    /// Make `activate` fail with [`TransportError::Refused`]
    pub fn set_refuse_activation(&self, refuse: bool) {
        self.behavior.refuse_activation.store(refuse, Ordering::SeqCst);
    }

    /// Hold `activate` calls until released with `false`
    pub fn set_stall_activation(&self, stall: bool) {
        self.behavior.activation_gate.set(stall);
    }

    /// Make channel sends fail with [`TransportError::SendFailed`]
    pub fn set_fail_sends(&self, fail: bool) {
        self.behavior.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Hold channel sends until released with `false`
    pub fn set_stall_sends(&self, stall: bool) {
        self.behavior.send_gate.set(stall);
    }

    /// Make `configure_spatial` fail with [`TransportError::NotImplemented`]
    pub fn set_spatial_unsupported(&self, unsupported: bool) {
        self.behavior
            .spatial_unsupported
            .store(unsupported, Ordering::SeqCst);
    }

    /// Snapshot of the calls seen so far
    pub fn log(&self) -> TransportLog {
        self.log.lock().clone()
    }
}

#[async_trait]
impl SessionTransportEffects for MemoryTransport {
    async fn activate(
        &self,
        activity: &ActivityDescriptor,
    ) -> Result<SessionHandle, TransportError> {
        self.log.lock().activations.push(activity.clone());
        self.behavior.activation_gate.pass().await;
        if self.behavior.refuse_activation.load(Ordering::SeqCst) {
            return Err(TransportError::Refused {
                reason: "activation refused".to_string(),
            });
        }
        let session_id = self.hub.create_session();
        Ok(SessionHandle::new(session_id, self.participant.clone()))
    }

    async fn join(&self, handle: &SessionHandle) -> Result<(), TransportError> {
        self.hub.join(handle)?;
        self.log.lock().joins.push(handle.session_id);
        Ok(())
    }

    async fn leave(&self, handle: &SessionHandle) -> Result<(), TransportError> {
        self.log.lock().leaves.push(handle.session_id);
        self.hub.leave(handle)
    }

    async fn message_channel(
        &self,
        handle: &SessionHandle,
    ) -> Result<Arc<dyn MessageChannel>, TransportError> {
        let receiver = self.hub.take_receiver(handle)?;
        Ok(Arc::new(MemoryChannel {
            hub: self.hub.clone(),
            handle: handle.clone(),
            receiver: Mutex::new(receiver),
            behavior: Arc::clone(&self.behavior),
            log: Arc::clone(&self.log),
        }))
    }

    async fn configure_spatial(
        &self,
        _handle: &SessionHandle,
        configuration: &SpatialConfiguration,
    ) -> Result<(), TransportError> {
        if self.behavior.spatial_unsupported.load(Ordering::SeqCst) {
            return Err(TransportError::NotImplemented);
        }
        self.log.lock().spatial.push(configuration.clone());
        Ok(())
    }
}

impl InvitationEffects for MemoryTransport {
    fn invitations(&self) -> InvitationStream {
        self.hub.subscribe_invitations(&self.participant)
    }
}

/// Message channel for one member of one hub session
pub struct MemoryChannel {
    hub: MemorySessionHub,
    handle: SessionHandle,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<InboundMessage>>>,
    behavior: Arc<TransportBehavior>,
    log: Arc<Mutex<TransportLog>>,
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    async fn send(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.behavior.send_gate.pass().await;
        if self.behavior.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed {
                reason: "send failure injected".to_string(),
            });
        }
        self.hub.broadcast(
            self.handle.session_id,
            &self.handle.local_participant,
            payload.clone(),
        )?;
        self.log.lock().sent.push(payload);
        Ok(())
    }

    fn receive(&self) -> InboundMessageStream {
        match self.receiver.lock().take() {
            Some(receiver) => UnboundedReceiverStream::new(receiver).boxed(),
            None => futures::stream::empty().boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_members_receive_each_others_payloads() {
        let hub = MemorySessionHub::new();
        let ana = hub.transport("ana");
        let ben = hub.transport("ben");

        let handle = ana.activate(&ActivityDescriptor::default()).await.unwrap();
        ana.join(&handle).await.unwrap();
        let ben_handle = SessionHandle::new(handle.session_id, ParticipantId::from("ben"));
        ben.join(&ben_handle).await.unwrap();

        let ana_channel = ana.message_channel(&handle).await.unwrap();
        let ben_channel = ben.message_channel(&ben_handle).await.unwrap();
        let mut ben_inbound = ben_channel.receive();
        let mut ana_inbound = ana_channel.receive();

        ana_channel.send(vec![1, 2, 3]).await.unwrap();
        let message = ben_inbound.next().await.unwrap();
        assert_eq!(message.sender, ParticipantId::from("ana"));
        assert_eq!(message.payload, vec![1, 2, 3]);

        hub.end_session(handle.session_id);
        assert!(ana_inbound.next().await.is_none());
        assert!(ben_inbound.next().await.is_none());
    }

    #[tokio::test]
    async fn test_refused_activation() {
        let hub = MemorySessionHub::new();
        let ana = hub.transport("ana");
        ana.set_refuse_activation(true);
        let err = ana.activate(&ActivityDescriptor::default()).await.unwrap_err();
        assert!(matches!(err, TransportError::Refused { .. }));
    }

    #[tokio::test]
    async fn test_send_requires_membership() {
        let hub = MemorySessionHub::new();
        let ana = hub.transport("ana");
        let handle = ana.activate(&ActivityDescriptor::default()).await.unwrap();
        ana.join(&handle).await.unwrap();
        let channel = ana.message_channel(&handle).await.unwrap();
        ana.leave(&handle).await.unwrap();
        assert_eq!(channel.send(vec![0]).await, Err(TransportError::NotConnected));
    }

    #[tokio::test]
    async fn test_invitations_reach_subscribers() {
        let hub = MemorySessionHub::new();
        let ben = hub.transport("ben");
        let mut invitations = ben.invitations();
        let session_id = hub.create_session();

        assert_eq!(hub.invite(session_id, "ben"), 1);
        let handle = invitations.next().await.unwrap();
        assert_eq!(handle.session_id, session_id);
        assert_eq!(handle.local_participant, ParticipantId::from("ben"));
        assert_eq!(hub.invite(session_id, "nobody"), 0);
    }
}
