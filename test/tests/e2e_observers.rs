use std::time::Duration;

use shoal_client::{DespawnEvent, OwnershipEvent, SpawnEvent};
use shoal_server::{
    AlwaysCondition, DisconnectEvent, DistanceCondition, ObjectSpawn, ObserverSettings,
    OwnerOnlyCondition, Position, SceneCondition, ServerConfig,
};
use shoal_shared::{ClientId, ObjectId, SceneId};
use shoal_test::TestSession;

/// Slightly more than one tick at 60 Hz
const ONE_TICK: Duration = Duration::from_millis(17);

fn open_session() -> TestSession {
    let _ = env_logger::builder().is_test(true).try_init();
    TestSession::new(ServerConfig {
        require_auth: false,
        ..Default::default()
    })
}

fn connect(session: &mut TestSession) -> (usize, ClientId) {
    let (index, client_id) = session.connect_client();
    let client_id = client_id.expect("open server authenticates on connect");
    (index, client_id)
}

fn spawn(
    session: &mut TestSession,
    owner: Option<ClientId>,
    spawn: ObjectSpawn,
) -> ObjectId {
    let object = session
        .server()
        .spawn_object(owner, spawn)
        .expect("server is running");
    session.settle();
    object
}

fn spawned(session: &mut TestSession, index: usize) -> Vec<(ObjectId, bool)> {
    session.client(index).take_events().read::<SpawnEvent>().collect()
}

fn despawned(session: &mut TestSession, index: usize) -> Vec<ObjectId> {
    session.client(index).take_events().read::<DespawnEvent>().collect()
}

#[test]
fn always_condition_reaches_every_client() {
    let mut session = open_session();
    let (a, _) = connect(&mut session);
    let (b, _) = connect(&mut session);
    session.client(a).take_events();
    session.client(b).take_events();

    let object = spawn(
        &mut session,
        None,
        ObjectSpawn::new(ObserverSettings::new().with_condition(AlwaysCondition)),
    );

    assert_eq!(spawned(&mut session, a), vec![(object, false)]);
    assert_eq!(spawned(&mut session, b), vec![(object, false)]);
}

#[test]
fn late_joiner_sees_existing_objects() {
    let mut session = open_session();
    let object = session
        .server()
        .spawn_object(
            None,
            ObjectSpawn::new(ObserverSettings::new().with_condition(AlwaysCondition)),
        )
        .unwrap();

    let (a, _) = connect(&mut session);

    assert!(session.client(a).observes(&object));
}

#[test]
fn owner_only_object_stays_with_its_owner() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);
    let (b, _) = connect(&mut session);
    session.client(a).take_events();
    session.client(b).take_events();

    let object = spawn(
        &mut session,
        Some(a_id),
        ObjectSpawn::new(ObserverSettings::new().with_condition(OwnerOnlyCondition)),
    );

    assert_eq!(spawned(&mut session, a), vec![(object, true)]);
    assert!(session.client(a).owns(&object));
    assert!(spawned(&mut session, b).is_empty());
}

#[test]
fn scene_condition_follows_loaded_scenes() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);
    let level = SceneId(3);

    let object = spawn(
        &mut session,
        None,
        ObjectSpawn::new(ObserverSettings::new().with_condition(SceneCondition)).in_scene(level),
    );
    assert!(!session.client(a).observes(&object));

    session.server().client_loaded_scene(&a_id, level).unwrap();
    session.settle();
    assert!(session.client(a).observes(&object));

    session.client(a).take_events();
    session.server().client_unloaded_scene(&a_id, &level).unwrap();
    session.settle();
    assert_eq!(despawned(&mut session, a), vec![object]);
}

#[test]
fn moving_a_scene_object_rebuilds_its_observers() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);
    session.server().client_loaded_scene(&a_id, SceneId(1)).unwrap();

    let object = spawn(
        &mut session,
        None,
        ObjectSpawn::new(ObserverSettings::new().with_condition(SceneCondition))
            .in_scene(SceneId(2)),
    );
    assert!(!session.client(a).observes(&object));

    session
        .server()
        .set_object_scene(&object, Some(SceneId(1)))
        .unwrap();
    session.settle();

    assert!(session.client(a).observes(&object));
}

#[test]
fn distance_condition_is_rechecked_on_tick() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);
    let (b, _) = connect(&mut session);

    let avatar = spawn(
        &mut session,
        Some(a_id),
        ObjectSpawn::new(ObserverSettings::new().with_condition(OwnerOnlyCondition))
            .at(Position::new(0.0, 0.0, 0.0)),
    );
    let tree = spawn(
        &mut session,
        None,
        ObjectSpawn::new(ObserverSettings::new().with_condition(DistanceCondition::new(10.0)))
            .at(Position::new(5.0, 0.0, 0.0)),
    );

    assert!(session.client(a).observes(&avatar));
    assert!(session.client(a).observes(&tree));
    // owns nothing, so has no point to measure from
    assert!(!session.client(b).observes(&tree));

    session
        .server()
        .set_object_position(&tree, Position::new(20.0, 0.0, 0.0))
        .unwrap();
    session.settle();
    // positions are only re-evaluated on a tick
    assert!(session.client(a).observes(&tree));

    session.frame(ONE_TICK);
    session.settle();
    assert!(!session.client(a).observes(&tree));

    session
        .server()
        .set_object_position(&avatar, Position::new(15.0, 0.0, 0.0))
        .unwrap();
    session.frame(ONE_TICK);
    session.settle();
    assert!(session.client(a).observes(&tree));
}

#[test]
fn ownership_transfer_updates_both_owners() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);
    let (b, b_id) = connect(&mut session);

    let object = spawn(
        &mut session,
        Some(a_id),
        ObjectSpawn::new(ObserverSettings::new().with_condition(AlwaysCondition)),
    );
    session.client(a).take_events();
    session.client(b).take_events();

    session.server().give_ownership(&object, &b_id).unwrap();
    session.settle();

    let a_changes: Vec<(ObjectId, bool)> = session
        .client(a)
        .take_events()
        .read::<OwnershipEvent>()
        .collect();
    let b_changes: Vec<(ObjectId, bool)> = session
        .client(b)
        .take_events()
        .read::<OwnershipEvent>()
        .collect();
    assert_eq!(a_changes, vec![(object, false)]);
    assert_eq!(b_changes, vec![(object, true)]);
    assert!(session.client(b).owns(&object));
    assert!(!session.client(a).owns(&object));
}

#[test]
fn losing_ownership_of_owner_only_object_hides_it() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);

    let object = spawn(
        &mut session,
        Some(a_id),
        ObjectSpawn::new(ObserverSettings::new().with_condition(OwnerOnlyCondition)),
    );
    session.client(a).take_events();

    session.server().remove_ownership(&object).unwrap();
    session.settle();

    assert_eq!(despawned(&mut session, a), vec![object]);
}

#[test]
fn disconnect_despawns_owned_objects_for_everyone() {
    let mut session = open_session();
    let (a, a_id) = connect(&mut session);
    let (b, _) = connect(&mut session);

    let object = spawn(
        &mut session,
        Some(a_id),
        ObjectSpawn::new(ObserverSettings::new().with_condition(AlwaysCondition)),
    );
    assert!(session.client(b).observes(&object));
    session.client(b).take_events();
    session.server().take_events();

    session.client_manager(a).stop_client();
    session.settle();

    assert_eq!(despawned(&mut session, b), vec![object]);
    assert!(session.server().object(&object).is_none());
    let disconnected: Vec<ClientId> = session
        .server()
        .take_events()
        .read::<DisconnectEvent>()
        .map(|(client_id, _)| client_id)
        .collect();
    assert_eq!(disconnected, vec![a_id]);
}

#[test]
fn server_despawn_reaches_observers() {
    let mut session = open_session();
    let (a, _) = connect(&mut session);

    let object = spawn(
        &mut session,
        None,
        ObjectSpawn::new(ObserverSettings::new().with_condition(AlwaysCondition)),
    );
    session.client(a).take_events();

    session.server().despawn_object(&object).unwrap();
    session.settle();

    assert_eq!(despawned(&mut session, a), vec![object]);
    assert!(!session.client(a).observes(&object));
}
