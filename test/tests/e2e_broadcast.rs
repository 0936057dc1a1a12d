use std::{cell::RefCell, rc::Rc};

use shoal_server::{
    AlwaysCondition, ErrorEvent, ObjectSpawn, ObserverSettings, OwnerOnlyCondition, ServerConfig,
    ServerError,
};
use shoal_shared::{Channel, ClientId, RouterError};
use shoal_test::{Chat, LinkConditionerConfig, PlayerInput, TestSession};

fn open_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        ..Default::default()
    }
}

fn open_session() -> TestSession {
    let _ = env_logger::builder().is_test(true).try_init();
    TestSession::new(open_config())
}

type Inbox<M> = Rc<RefCell<Vec<M>>>;

fn client_inbox(session: &mut TestSession, index: usize) -> Inbox<Chat> {
    let inbox: Inbox<Chat> = Rc::default();
    let sink = inbox.clone();
    session
        .client(index)
        .register_broadcast::<Chat, _>(move |chat| sink.borrow_mut().push(chat))
        .unwrap();
    inbox
}

#[test]
fn chat_round_trip() {
    let mut session = open_session();
    let (a, a_id) = session.connect_client();
    let (b, _) = session.connect_client();

    let received: Inbox<(ClientId, Chat)> = Rc::default();
    let sink = received.clone();
    session
        .server()
        .register_broadcast::<Chat, _>(move |client_id, chat| {
            sink.borrow_mut().push((client_id, chat))
        })
        .unwrap();
    let a_inbox = client_inbox(&mut session, a);
    let b_inbox = client_inbox(&mut session, b);

    session
        .client(a)
        .send(&Chat::new("hello"), Channel::Reliable)
        .unwrap();
    session.settle();

    assert_eq!(
        received.borrow().as_slice(),
        &[(a_id.unwrap(), Chat::new("hello"))]
    );

    session
        .server()
        .broadcast(&Chat::new("welcome"), Channel::Reliable)
        .unwrap();
    session.settle();

    assert_eq!(a_inbox.borrow().as_slice(), &[Chat::new("welcome")]);
    assert_eq!(b_inbox.borrow().as_slice(), &[Chat::new("welcome")]);
}

#[test]
fn send_to_reaches_one_client() {
    let mut session = open_session();
    let (a, _) = session.connect_client();
    let (b, b_id) = session.connect_client();
    let a_inbox = client_inbox(&mut session, a);
    let b_inbox = client_inbox(&mut session, b);

    session
        .server()
        .send_to(&b_id.unwrap(), &Chat::new("psst"), Channel::Reliable)
        .unwrap();
    session.settle();

    assert!(a_inbox.borrow().is_empty());
    assert_eq!(b_inbox.borrow().as_slice(), &[Chat::new("psst")]);
}

#[test]
fn observer_broadcast_skips_non_observers() {
    let mut session = open_session();
    let (a, a_id) = session.connect_client();
    let (b, _) = session.connect_client();
    let a_inbox = client_inbox(&mut session, a);
    let b_inbox = client_inbox(&mut session, b);

    let private = session
        .server()
        .spawn_object(
            a_id,
            ObjectSpawn::new(ObserverSettings::new().with_condition(OwnerOnlyCondition)),
        )
        .unwrap();
    let public = session
        .server()
        .spawn_object(
            None,
            ObjectSpawn::new(ObserverSettings::new().with_condition(AlwaysCondition)),
        )
        .unwrap();

    session
        .server()
        .broadcast_to_observers(&private, &Chat::new("mine"), Channel::Reliable)
        .unwrap();
    session
        .server()
        .broadcast_to_observers(&public, &Chat::new("ours"), Channel::Reliable)
        .unwrap();
    session.settle();

    assert_eq!(
        a_inbox.borrow().as_slice(),
        &[Chat::new("mine"), Chat::new("ours")]
    );
    assert_eq!(b_inbox.borrow().as_slice(), &[Chat::new("ours")]);
}

#[test]
fn unregistered_handler_stops_receiving() {
    let mut session = open_session();
    let (a, _) = session.connect_client();

    let first: Inbox<Chat> = Rc::default();
    let second: Inbox<Chat> = Rc::default();
    let first_sink = first.clone();
    let second_sink = second.clone();
    let first_key = session
        .server()
        .register_broadcast::<Chat, _>(move |_, chat| first_sink.borrow_mut().push(chat))
        .unwrap();
    session
        .server()
        .register_broadcast::<Chat, _>(move |_, chat| second_sink.borrow_mut().push(chat))
        .unwrap();

    session
        .client(a)
        .send(&Chat::new("one"), Channel::Reliable)
        .unwrap();
    session.settle();
    assert!(session.server().unregister_broadcast::<Chat>(first_key));
    session
        .client(a)
        .send(&Chat::new("two"), Channel::Reliable)
        .unwrap();
    session.settle();

    assert_eq!(first.borrow().as_slice(), &[Chat::new("one")]);
    assert_eq!(
        second.borrow().as_slice(),
        &[Chat::new("one"), Chat::new("two")]
    );
}

#[test]
fn broadcast_without_handler_is_reported_and_dropped() {
    let mut session = open_session();
    let (a, _) = session.connect_client();
    session.server().take_events();

    session
        .client(a)
        .send(&Chat::new("anyone?"), Channel::Reliable)
        .unwrap();
    session.settle();

    let errors: Vec<ServerError> = session.server().take_events().read::<ErrorEvent>().collect();
    assert!(matches!(
        errors.as_slice(),
        [ServerError::Router(RouterError::UnknownMessage { .. })]
    ));
}

#[test]
fn link_conditioner_drops_only_unreliable_packets() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = TestSession::with_link_conditioner(
        open_config(),
        LinkConditionerConfig::new(0.5, 0x5EED),
    );
    let (a, a_id) = session.connect_client();
    assert!(a_id.is_some(), "system packets travel reliably");

    let inputs: Inbox<PlayerInput> = Rc::default();
    let chats: Inbox<Chat> = Rc::default();
    let input_sink = inputs.clone();
    let chat_sink = chats.clone();
    session
        .server()
        .register_broadcast::<PlayerInput, _>(move |_, input| input_sink.borrow_mut().push(input))
        .unwrap();
    session
        .server()
        .register_broadcast::<Chat, _>(move |_, chat| chat_sink.borrow_mut().push(chat))
        .unwrap();

    const SENT: u32 = 200;
    for sequence in 0..SENT {
        let input = PlayerInput {
            sequence,
            dx: 1.0,
            dy: 0.0,
        };
        session
            .client(a)
            .send(&input, Channel::Unreliable)
            .unwrap();
        session
            .client(a)
            .send(&Chat::new("still here"), Channel::Reliable)
            .unwrap();
    }
    session.settle();

    let delivered = inputs.borrow().len() as u32;
    assert!(delivered > 0 && delivered < SENT, "delivered {}", delivered);
    assert_eq!(chats.borrow().len() as u32, SENT);
}
