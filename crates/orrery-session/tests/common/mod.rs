//! Shared fixtures for coordinator integration tests
#![allow(dead_code)]

use orrery_core::{ParticipantId, SessionHandle, SessionId};
use orrery_session::{CoordinatorConfig, SessionCoordinator};
use orrery_testkit::{init_test_tracing, wait_until, MemorySessionHub, MemoryTransport, SimulatedTimeHandler};
use std::time::Duration;

/// Upper bound for anything that crosses a task boundary
pub const WAIT: Duration = Duration::from_secs(2);

/// One participant: a coordinator and the transport it was built with
pub struct Peer {
    pub id: ParticipantId,
    pub coordinator: SessionCoordinator,
    pub transport: MemoryTransport,
}

pub fn config(display_name: &str) -> CoordinatorConfig {
    CoordinatorConfig {
        display_name: display_name.to_string(),
        outbound_drain_timeout_ms: 200,
        ..CoordinatorConfig::default()
    }
}

pub fn peer_with(
    hub: &MemorySessionHub,
    clock: &SimulatedTimeHandler,
    id: &str,
    config: CoordinatorConfig,
) -> Peer {
    init_test_tracing();
    let transport = hub.transport(id);
    let coordinator = SessionCoordinator::new(config, transport.clone(), clock.clone()).unwrap();
    Peer {
        id: ParticipantId::from(id),
        coordinator,
        transport,
    }
}

pub fn peer(hub: &MemorySessionHub, clock: &SimulatedTimeHandler, id: &str) -> Peer {
    peer_with(hub, clock, id, config(id))
}

impl Peer {
    /// Handle this peer would receive when invited to `session_id`
    pub fn invitation(&self, session_id: SessionId) -> SessionHandle {
        SessionHandle::new(session_id, self.id.clone())
    }

    pub fn session_id(&self) -> SessionId {
        self.coordinator.session().unwrap().id
    }
}

/// Ana starts a session and Ben joins it; returns once both rosters agree
pub async fn connected_pair() -> (MemorySessionHub, SimulatedTimeHandler, Peer, Peer) {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");
    let ben = peer(&hub, &clock, "ben");

    let handle = ana.coordinator.activate().await.unwrap();
    ben.coordinator
        .join_existing(ben.invitation(handle.session_id))
        .await
        .unwrap();

    let converged = wait_until(WAIT, || {
        ana.coordinator.participant_count() == 2
            && ana.coordinator.current_snapshot() == ben.coordinator.current_snapshot()
    })
    .await;
    assert!(converged, "pair did not converge after join");
    (hub, clock, ana, ben)
}
