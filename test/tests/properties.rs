use std::{
    cell::RefCell,
    collections::HashSet,
    net::SocketAddr,
    rc::Rc,
    time::Duration,
};

use proptest::prelude::*;

use shoal_server::{
    AlwaysCondition, ConnectionRegistry, DistanceCondition, ObjectSpawn, ObserverSettings,
    ObserverStateChange, OwnerOnlyCondition, Position, SceneCondition, ServerConfig,
};
use shoal_shared::{Channel, ClientId, SceneId, TickConfig, TickPhase, TickScheduler};
use shoal_test::{Chat, TestSession};

fn open_session() -> TestSession {
    let _ = env_logger::builder().is_test(true).try_init();
    TestSession::new(ServerConfig {
        require_auth: false,
        ..Default::default()
    })
}

#[derive(Clone, Copy, Debug)]
enum ConditionKind {
    Always,
    OwnerOnly,
    Scene,
    Distance(f32),
}

fn condition_kind() -> impl Strategy<Value = ConditionKind> {
    prop_oneof![
        Just(ConditionKind::Always),
        Just(ConditionKind::OwnerOnly),
        Just(ConditionKind::Scene),
        (0.0f32..50.0).prop_map(ConditionKind::Distance),
    ]
}

fn settings(kinds: &[ConditionKind]) -> ObserverSettings {
    let mut settings = ObserverSettings::new();
    for kind in kinds {
        match kind {
            ConditionKind::Always => settings.add_condition(AlwaysCondition),
            ConditionKind::OwnerOnly => settings.add_condition(OwnerOnlyCondition),
            ConditionKind::Scene => settings.add_condition(SceneCondition),
            ConditionKind::Distance(max) => settings.add_condition(DistanceCondition::new(*max)),
        }
    }
    settings
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn owner_always_observes_its_object(
        kinds in prop::collection::vec(condition_kind(), 0..4),
        scene in prop::option::of(0u32..3),
        x in -100.0f32..100.0,
    ) {
        let mut session = open_session();
        let (a, a_id) = session.connect_client();
        let (_, b_id) = session.connect_client();
        let (a_id, b_id) = (a_id.unwrap(), b_id.unwrap());

        let mut spawn = ObjectSpawn::new(settings(&kinds)).at(Position::new(x, 0.0, 0.0));
        if let Some(scene) = scene {
            spawn = spawn.in_scene(SceneId(scene));
        }
        let object = session.server().spawn_object(Some(a_id), spawn).unwrap();
        session.settle();

        prop_assert!(session.server().object(&object).unwrap().is_observed_by(&a_id));
        prop_assert!(session.client(a).observes(&object));

        // taking the object's scene away from its owner changes nothing
        if let Some(scene) = scene {
            session.server().client_loaded_scene(&a_id, SceneId(scene)).unwrap();
            session.server().client_unloaded_scene(&a_id, &SceneId(scene)).unwrap();
        }
        session.server().give_ownership(&object, &b_id).unwrap();
        session.settle();
        prop_assert!(session.server().object(&object).unwrap().is_observed_by(&b_id));
    }

    #[test]
    fn rebuilding_twice_changes_nothing(
        kinds in prop::collection::vec(condition_kind(), 1..4),
        loads_scene in any::<bool>(),
        owned in any::<bool>(),
    ) {
        let mut session = open_session();
        let (_, a_id) = session.connect_client();
        let (_, b_id) = session.connect_client();
        let (a_id, b_id) = (a_id.unwrap(), b_id.unwrap());
        if loads_scene {
            session.server().client_loaded_scene(&b_id, SceneId(1)).unwrap();
        }
        let owner = if owned { Some(a_id) } else { None };
        let object = session
            .server()
            .spawn_object(owner, ObjectSpawn::new(settings(&kinds)).in_scene(SceneId(1)))
            .unwrap();

        for client_id in [a_id, b_id] {
            session.server().rebuild_observers(&object, &client_id).unwrap();
            let again = session.server().rebuild_observers(&object, &client_id).unwrap();
            prop_assert_eq!(again, ObserverStateChange::Unchanged);
        }
    }

    #[test]
    fn chats_arrive_intact_and_in_order(texts in prop::collection::vec(".{0,40}", 1..8)) {
        let mut session = open_session();
        let (a, _) = session.connect_client();

        let received: Rc<RefCell<Vec<Chat>>> = Rc::default();
        let sink = received.clone();
        session
            .server()
            .register_broadcast::<Chat, _>(move |_, chat| sink.borrow_mut().push(chat))
            .unwrap();

        for text in &texts {
            session.client(a).send(&Chat::new(text), Channel::Reliable).unwrap();
        }
        session.settle();

        let expected: Vec<Chat> = texts.iter().map(|text| Chat::new(text)).collect();
        prop_assert_eq!(received.borrow().clone(), expected);
    }

    #[test]
    fn ticks_advance_one_at_a_time(
        rate in 1u16..240,
        frames in prop::collection::vec(0u64..100, 1..50),
    ) {
        let mut scheduler = TickScheduler::new(&TickConfig {
            simulation_rate: rate,
            ..Default::default()
        });
        scheduler.set_active(true);
        let tick_delta = scheduler.tick_delta().unwrap();

        let mut last = scheduler.tick();
        let mut total = 0u32;
        let mut elapsed_total = Duration::ZERO;
        for millis in frames {
            let elapsed = Duration::from_millis(millis);
            elapsed_total += elapsed;
            total += scheduler.advance(elapsed, |phase| {
                if let TickPhase::Tick(tick) = phase {
                    assert_eq!(tick, last.wrapping_add(1));
                    last = tick;
                }
            });
            prop_assert!(scheduler.accumulated() < tick_delta);
        }

        let expected = elapsed_total.as_nanos() / tick_delta.as_nanos();
        prop_assert_eq!(u128::from(total), expected);
        prop_assert_eq!(scheduler.tick(), total);
    }

    #[test]
    fn client_ids_are_never_reused(removals in prop::collection::vec(any::<bool>(), 1..64)) {
        let mut registry = ConnectionRegistry::new();
        let mut issued = HashSet::new();

        for (port, remove) in removals.into_iter().enumerate() {
            let address = SocketAddr::from(([127, 0, 0, 1], 1000 + port as u16));
            let client_id: ClientId = registry.add(address).unwrap();
            prop_assert!(issued.insert(client_id));
            if remove {
                prop_assert!(registry.remove(&client_id).is_some());
            }
        }
    }
}
