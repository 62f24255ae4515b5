//! Multi-participant reconciliation tests

mod common;

use common::{config, connected_pair, peer, peer_with, Peer, WAIT};
use orrery_core::{ParticipantId, PhysicalTime};
use orrery_session::{
    encode_action, Action, CoordinatorConfig, ImmersiveSpaceState, Participant, Planet,
    SharedState, Vector3,
};
use orrery_testkit::{wait_until, MemorySessionHub, SimulatedTimeHandler};
use std::time::Duration;

#[tokio::test]
async fn test_remote_actions_are_applied() {
    let (_hub, _clock, ana, ben) = connected_pair().await;

    ana.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Mars))
        .await;
    assert!(
        wait_until(WAIT, || ben.coordinator.current_snapshot().selected_planet
            == Some(Planet::Mars))
        .await
    );

    ben.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Venus))
        .await;
    assert!(
        wait_until(WAIT, || ana.coordinator.current_snapshot().selected_planet
            == Some(Planet::Venus))
        .await
    );
}

#[tokio::test]
async fn test_rotation_is_accumulated_by_sender() {
    let (_hub, _clock, ana, ben) = connected_pair().await;

    let step = Vector3::new(0.1, 0.0, -0.2);
    ana.coordinator.rotate_globe(step).await;
    ana.coordinator.rotate_globe(step).await;

    let expected = step + step;
    assert_eq!(ana.coordinator.current_snapshot().globe_rotation, expected);
    assert!(
        wait_until(WAIT, || ben.coordinator.current_snapshot().globe_rotation == expected).await
    );
}

#[tokio::test]
async fn test_late_joiner_receives_full_state() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");
    let ben = peer(&hub, &clock, "ben");

    let handle = ana.coordinator.activate().await.unwrap();
    ana.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Saturn))
        .await;
    ana.coordinator
        .rotate_globe(Vector3::new(0.0, 1.5, 0.0))
        .await;

    ben.coordinator
        .join_existing(ben.invitation(handle.session_id))
        .await
        .unwrap();

    assert!(
        wait_until(WAIT, || {
            ben.coordinator.current_snapshot() == ana.coordinator.current_snapshot()
        })
        .await
    );
    let snapshot = ben.coordinator.current_snapshot();
    assert_eq!(snapshot.selected_planet, Some(Planet::Saturn));
    assert_eq!(snapshot.globe_rotation, Vector3::new(0.0, 1.5, 0.0));
    let ids: Vec<_> = snapshot.participants.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![ParticipantId::from("ana"), ParticipantId::from("ben")]);
}

#[tokio::test]
async fn test_late_joiner_sync_can_be_disabled() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer_with(
        &hub,
        &clock,
        "ana",
        CoordinatorConfig {
            sync_late_joiners: false,
            ..config("ana")
        },
    );
    let ben = peer(&hub, &clock, "ben");

    let handle = ana.coordinator.activate().await.unwrap();
    ana.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Saturn))
        .await;
    ben.coordinator
        .join_existing(ben.invitation(handle.session_id))
        .await
        .unwrap();

    assert!(wait_until(WAIT, || ana.coordinator.participant_count() == 2).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ben.coordinator.current_snapshot().selected_planet, None);
    assert_eq!(ben.coordinator.participant_count(), 1);
}

#[tokio::test]
async fn test_full_sync_repairs_divergence() {
    let (hub, _clock, ana, ben) = connected_pair().await;
    let session_id = ana.session_id();

    // A message only Ben sees makes the two views diverge.
    let stray = encode_action(&Action::SelectPlanet(Planet::Mercury)).unwrap();
    assert!(hub.deliver_raw(session_id, "carol", &ben.id, stray));
    assert!(
        wait_until(WAIT, || ben.coordinator.current_snapshot().selected_planet
            == Some(Planet::Mercury))
        .await
    );
    assert_ne!(
        ana.coordinator.current_snapshot(),
        ben.coordinator.current_snapshot()
    );

    ana.coordinator.request_full_sync().await;
    assert!(
        wait_until(WAIT, || {
            ana.coordinator.current_snapshot() == ben.coordinator.current_snapshot()
        })
        .await
    );
    assert_eq!(ben.coordinator.current_snapshot().selected_planet, None);
}

#[tokio::test]
async fn test_leave_is_announced_to_others() {
    let (_hub, _clock, ana, ben) = connected_pair().await;

    ben.coordinator.leave().await;
    assert!(wait_until(WAIT, || ana.coordinator.participant_count() == 1).await);
    assert_eq!(
        ana.coordinator.current_snapshot().participants[0].id,
        ParticipantId::from("ana")
    );
    assert_eq!(ben.coordinator.current_snapshot(), SharedState::default());
}

#[tokio::test]
async fn test_nothing_applied_after_leave() {
    let (_hub, _clock, ana, ben) = connected_pair().await;

    ben.coordinator.leave().await;
    ana.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Jupiter))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(ben.coordinator.current_snapshot(), SharedState::default());
}

#[tokio::test]
async fn test_join_then_leave_restores_count() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");
    let handle = ana.coordinator.activate().await.unwrap();
    let baseline = ana.coordinator.participant_count();

    let joined = encode_action(&Action::ParticipantJoined(Participant::new("p1", "Ana"))).unwrap();
    let left = encode_action(&Action::ParticipantLeft(ParticipantId::from("p1"))).unwrap();
    hub.deliver_raw(handle.session_id, "p1", &ana.id, joined);
    assert!(wait_until(WAIT, || ana.coordinator.participant_count() == baseline + 1).await);
    hub.deliver_raw(handle.session_id, "p1", &ana.id, left);
    assert!(wait_until(WAIT, || ana.coordinator.participant_count() == baseline).await);

    let snapshot = ana.coordinator.current_snapshot();
    assert!(snapshot.participant(&ParticipantId::from("p1")).is_none());
}

#[tokio::test]
async fn test_malformed_message_does_not_stop_loop() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");
    let handle = ana.coordinator.activate().await.unwrap();

    hub.deliver_raw(handle.session_id, "mallory", &ana.id, vec![0xff, 0xfe, 0x01]);
    hub.deliver_raw(handle.session_id, "mallory", &ana.id, Vec::new());
    let valid = encode_action(&Action::SelectPlanet(Planet::Earth)).unwrap();
    hub.deliver_raw(handle.session_id, "mallory", &ana.id, valid);

    assert!(
        wait_until(WAIT, || ana.coordinator.current_snapshot().selected_planet
            == Some(Planet::Earth))
        .await
    );
    assert!(ana.coordinator.is_connected());
}

#[tokio::test]
async fn test_immersion_from_unknown_sender_is_ignored() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");
    let handle = ana.coordinator.activate().await.unwrap();
    let before = ana.coordinator.current_snapshot().participants;

    let enter = encode_action(&Action::EnterImmersiveSpace("full".to_string())).unwrap();
    let marker = encode_action(&Action::SelectPlanet(Planet::Mars)).unwrap();
    hub.deliver_raw(handle.session_id, "ghost", &ana.id, enter);
    hub.deliver_raw(handle.session_id, "ghost", &ana.id, marker);

    assert!(
        wait_until(WAIT, || ana.coordinator.current_snapshot().selected_planet
            == Some(Planet::Mars))
        .await
    );
    assert_eq!(ana.coordinator.current_snapshot().participants, before);
}

#[tokio::test]
async fn test_immersive_space_is_announced() {
    let (_hub, _clock, ana, ben) = connected_pair().await;
    let ana_id = ana.id.clone();

    ana.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::InTransition)
        .await
        .unwrap();
    ana.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::Open)
        .await
        .unwrap();

    assert!(
        wait_until(WAIT, || {
            ben.coordinator
                .current_snapshot()
                .participant(&ana_id)
                .is_some_and(|p| p.is_immersive)
        })
        .await
    );
    let snapshot = ben.coordinator.current_snapshot();
    assert_eq!(
        snapshot.participant(&ana_id).unwrap().immersion_style.as_deref(),
        Some("progressive")
    );
    assert!(ana.coordinator.current_snapshot().participant(&ana_id).unwrap().is_immersive);

    assert!(ana
        .coordinator
        .set_immersive_space_state(ImmersiveSpaceState::Closed)
        .await
        .is_err());
    ana.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::InTransition)
        .await
        .unwrap();
    ana.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::Closed)
        .await
        .unwrap();

    assert!(
        wait_until(WAIT, || {
            ben.coordinator
                .current_snapshot()
                .participant(&ana_id)
                .is_some_and(|p| !p.is_immersive && p.immersion_style.is_none())
        })
        .await
    );
}

#[tokio::test]
async fn test_open_immersive_space_is_announced_on_connect() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");

    ana.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::InTransition)
        .await
        .unwrap();
    ana.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::Open)
        .await
        .unwrap();
    assert_eq!(
        ana.coordinator.immersive_space_state(),
        ImmersiveSpaceState::Open
    );

    ana.coordinator.activate().await.unwrap();
    let snapshot = ana.coordinator.current_snapshot();
    let me = snapshot.participant(&ana.id).unwrap();
    assert!(me.is_immersive);
    assert_eq!(me.immersion_style.as_deref(), Some("progressive"));
}

async fn open_immersive_space(peer: &Peer) {
    peer.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::InTransition)
        .await
        .unwrap();
    peer.coordinator
        .set_immersive_space_state(ImmersiveSpaceState::Open)
        .await
        .unwrap();
}

fn member_ids(snapshot: &SharedState) -> Vec<ParticipantId> {
    snapshot.participants.iter().map(|p| p.id.clone()).collect()
}

#[tokio::test]
async fn test_joiner_keeps_open_immersive_space_after_sync() {
    let hub = MemorySessionHub::new();
    let clock = SimulatedTimeHandler::default();
    let ana = peer(&hub, &clock, "ana");
    let ben = peer(&hub, &clock, "ben");

    let handle = ana.coordinator.activate().await.unwrap();
    ana.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Neptune))
        .await;
    open_immersive_space(&ben).await;
    ben.coordinator
        .join_existing(ben.invitation(handle.session_id))
        .await
        .unwrap();

    let ben_id = ben.id.clone();
    let immersive_everywhere = |peer: &Peer| {
        peer.coordinator
            .current_snapshot()
            .participant(&ben_id)
            .is_some_and(|p| p.is_immersive)
    };
    assert!(
        wait_until(WAIT, || {
            immersive_everywhere(&ana)
                && immersive_everywhere(&ben)
                && ana.coordinator.current_snapshot() == ben.coordinator.current_snapshot()
        })
        .await
    );

    // Nothing still in flight undoes the agreement.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = ben.coordinator.current_snapshot();
    assert_eq!(ana.coordinator.current_snapshot(), snapshot);
    assert_eq!(member_ids(&snapshot), vec![ana.id.clone(), ben.id.clone()]);
    assert_eq!(snapshot.selected_planet, Some(Planet::Neptune));
    assert_eq!(
        snapshot.participant(&ben_id).unwrap().immersion_style.as_deref(),
        Some("progressive")
    );
}

#[tokio::test]
async fn test_three_peers_converge_after_late_join() {
    let (hub, clock, ana, ben) = connected_pair().await;
    let carol = peer(&hub, &clock, "carol");

    ana.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Jupiter))
        .await;
    ben.coordinator
        .rotate_globe(Vector3::new(0.0, 0.0, 0.7))
        .await;
    assert!(
        wait_until(WAIT, || {
            ana.coordinator.current_snapshot() == ben.coordinator.current_snapshot()
        })
        .await
    );

    open_immersive_space(&carol).await;
    carol
        .coordinator
        .join_existing(carol.invitation(ana.session_id()))
        .await
        .unwrap();

    let all_equal = || {
        let a = ana.coordinator.current_snapshot();
        a.participant_count() == 3
            && a == ben.coordinator.current_snapshot()
            && a == carol.coordinator.current_snapshot()
            && a.participant(&carol.id).is_some_and(|p| p.is_immersive)
    };
    assert!(wait_until(WAIT, || all_equal()).await);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(all_equal());
    let snapshot = carol.coordinator.current_snapshot();
    assert_eq!(
        member_ids(&snapshot),
        vec![ana.id.clone(), ben.id.clone(), carol.id.clone()]
    );
    assert_eq!(snapshot.selected_planet, Some(Planet::Jupiter));
    assert_eq!(snapshot.globe_rotation, Vector3::new(0.0, 0.0, 0.7));
}

#[tokio::test]
async fn test_full_sync_converges_across_clocks() {
    let hub = MemorySessionHub::new();
    let ana_clock = SimulatedTimeHandler::new(1_000);
    let ben_clock = SimulatedTimeHandler::new(50_000);
    let ana = peer(&hub, &ana_clock, "ana");
    let ben = peer(&hub, &ben_clock, "ben");

    let handle = ana.coordinator.activate().await.unwrap();
    ben.coordinator
        .join_existing(ben.invitation(handle.session_id))
        .await
        .unwrap();
    assert!(
        wait_until(WAIT, || {
            ana.coordinator.participant_count() == 2
                && ana
                    .coordinator
                    .current_snapshot()
                    .same_content(&ben.coordinator.current_snapshot())
        })
        .await
    );

    ben_clock.advance(500);
    ben.coordinator
        .broadcast_local(Action::SelectPlanet(Planet::Uranus))
        .await;
    assert!(
        wait_until(WAIT, || ana.coordinator.current_snapshot().selected_planet
            == Some(Planet::Uranus))
        .await
    );
    assert_ne!(
        ana.coordinator.current_snapshot(),
        ben.coordinator.current_snapshot()
    );

    ana_clock.advance(250);
    ana.coordinator.request_full_sync().await;
    assert!(
        wait_until(WAIT, || {
            ana.coordinator.current_snapshot() == ben.coordinator.current_snapshot()
        })
        .await
    );
    // Ben adopts the timestamp of Ana's last apply, not his own clock.
    assert_eq!(
        ben.coordinator.current_snapshot().last_updated,
        PhysicalTime::from_millis(1_000)
    );
}
