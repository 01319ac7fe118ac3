use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task::JoinHandle;
use wamp_engine::{
    core::{
        cancel::CallCancelMode,
        id::Id,
        stream::MessageStream,
    },
    message::message::{
        InterruptMessage,
        InvocationMessage,
        Message,
    },
    peer::{
        interrupt::Interrupt,
        invocation::{
            Invocation,
            InvocationTable,
            RpcYield,
        },
        procedure::{
            Procedure,
            run_procedure,
        },
        session::{
            ChannelSession,
            Session,
        },
    },
    serializer::serializer::{
        SerializerType,
        new_serializer,
    },
    transport::direct_transport::direct_transport_pair,
};
use wamp_engine_uri::Uri;
use wamp_engine_values::{
    Dictionary,
    List,
    Value,
};

const PROCEDURE: &str = "com.myapp.count";

/// Counts up to the requested number, sending each step as progress.
struct Count;

#[async_trait]
impl Procedure for Count {
    async fn invoke(&self, invocation: Arc<Invocation>) -> Result<RpcYield> {
        let to = invocation.argument_as::<u64>(0)?;
        for i in 1..to {
            invocation
                .send_progress(RpcYield::new(List::from_iter([Value::Integer(i)])))
                .await?;
        }
        Ok(RpcYield::new(List::from_iter([Value::Integer(to)])))
    }
}

/// Runs until interrupted.
struct Forever;

#[async_trait]
impl Procedure for Forever {
    async fn invoke(&self, invocation: Arc<Invocation>) -> Result<RpcYield> {
        let interrupt = invocation.wait_for_interrupt().await?;
        Err(interrupt.into())
    }
}

/// A minimal callee dispatch loop: inbound INVOCATION and INTERRUPT messages are handed to the
/// procedure and its invocations, and outbound messages are written to the same stream.
fn start_callee(mut stream: MessageStream, procedure: Arc<dyn Procedure>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (session, mut message_rx) = ChannelSession::new();
        let session: Arc<dyn Session> = Arc::new(session);
        let invocations = Arc::new(InvocationTable::new());
        loop {
            tokio::select! {
                message = message_rx.recv() => {
                    match message {
                        Some(message) => stream.send_message(message).await.unwrap(),
                        None => break,
                    }
                }
                message = stream.next_message() => {
                    match message.unwrap() {
                        Some(Message::Invocation(message)) => {
                            let invocation = Arc::new(Invocation::new(
                                session.clone(),
                                message,
                                Uri::try_from(PROCEDURE).unwrap(),
                            ));
                            invocations.insert(invocation.clone()).await;
                            tokio::spawn({
                                let procedure = procedure.clone();
                                let invocations = invocations.clone();
                                async move {
                                    let request_id = invocation.request_id();
                                    run_procedure(procedure, invocation).await;
                                    invocations.remove(request_id).await;
                                }
                            });
                        }
                        Some(Message::Interrupt(message)) => {
                            invocations.deliver_interrupt(Interrupt::from(message)).await;
                        }
                        Some(message) => panic!("unexpected message: {message:?}"),
                        None => break,
                    }
                }
            }
        }
    })
}

fn invocation_message(request: u64, details: Dictionary, arguments: List) -> Message {
    Message::Invocation(InvocationMessage {
        request: Id::try_from(request).unwrap(),
        registered_registration: Id::try_from(1).unwrap(),
        details,
        call_arguments: arguments,
        call_arguments_keyword: Dictionary::default(),
    })
}

fn router_and_callee(procedure: Arc<dyn Procedure>) -> (MessageStream, JoinHandle<()>) {
    let (router, callee) = direct_transport_pair();
    let router = MessageStream::new(Box::new(router), new_serializer(SerializerType::MessagePack));
    let callee = MessageStream::new(Box::new(callee), new_serializer(SerializerType::MessagePack));
    (router, start_callee(callee, procedure))
}

#[tokio::test]
async fn callee_streams_progress_then_result() {
    test_utils::setup::setup_test_environment();

    let (mut router, _callee) = router_and_callee(Arc::new(Count));
    router
        .send_message(invocation_message(
            1,
            Dictionary::from_iter([("receive_progress".to_owned(), Value::Bool(true))]),
            List::from_iter([Value::Integer(3)]),
        ))
        .await
        .unwrap();

    for i in 1..3 {
        assert_matches::assert_matches!(
            router.next_message().await,
            Ok(Some(Message::Yield(message))) => {
                assert_eq!(message.invocation_request.value(), 1);
                assert_eq!(message.options.get("progress"), Some(&Value::Bool(true)));
                assert_eq!(message.arguments, List::from_iter([Value::Integer(i)]));
            }
        );
    }
    assert_matches::assert_matches!(
        router.next_message().await,
        Ok(Some(Message::Yield(message))) => {
            assert!(message.options.is_empty());
            assert_eq!(message.arguments, List::from_iter([Value::Integer(3)]));
        }
    );
}

#[tokio::test]
async fn callee_reports_error_when_progress_is_not_requested() {
    test_utils::setup::setup_test_environment();

    let (mut router, _callee) = router_and_callee(Arc::new(Count));
    router
        .send_message(invocation_message(
            2,
            Dictionary::default(),
            List::from_iter([Value::Integer(3)]),
        ))
        .await
        .unwrap();
    assert_matches::assert_matches!(
        router.next_message().await,
        Ok(Some(Message::Error(message))) => {
            assert_eq!(message.request.value(), 2);
            assert_eq!(message.error.as_ref(), "wamp.error.internal");
        }
    );
}

#[tokio::test]
async fn callee_reports_missing_argument() {
    test_utils::setup::setup_test_environment();

    let (mut router, _callee) = router_and_callee(Arc::new(Count));
    router
        .send_message(invocation_message(3, Dictionary::default(), List::default()))
        .await
        .unwrap();
    assert_matches::assert_matches!(
        router.next_message().await,
        Ok(Some(Message::Error(message))) => {
            assert_eq!(message.request_type, 68);
            assert_eq!(message.error.as_ref(), "wamp.error.invalid_argument");
            assert_eq!(message.arguments_keyword.get("key"), Some(&Value::Integer(0)));
        }
    );
}

#[tokio::test]
async fn callee_stops_on_interrupt() {
    test_utils::setup::setup_test_environment();

    let (mut router, _callee) = router_and_callee(Arc::new(Forever));
    router
        .send_message(invocation_message(4, Dictionary::default(), List::default()))
        .await
        .unwrap();
    router
        .send_message(Message::Interrupt(InterruptMessage {
            invocation_request: Id::try_from(4).unwrap(),
            options: Dictionary::from_iter([(
                "mode".to_owned(),
                Value::from(Into::<&'static str>::into(CallCancelMode::Kill)),
            )]),
        }))
        .await
        .unwrap();
    assert_matches::assert_matches!(
        router.next_message().await,
        Ok(Some(Message::Error(message))) => {
            assert_eq!(message.request.value(), 4);
            assert_eq!(message.error.as_ref(), "wamp.error.canceled");
        }
    );

    // Interrupts for finished invocations are ignored.
    router
        .send_message(Message::Interrupt(InterruptMessage {
            invocation_request: Id::try_from(4).unwrap(),
            options: Dictionary::default(),
        }))
        .await
        .unwrap();
    router
        .send_message(invocation_message(5, Dictionary::default(), List::default()))
        .await
        .unwrap();
    router
        .send_message(Message::Interrupt(InterruptMessage {
            invocation_request: Id::try_from(5).unwrap(),
            options: Dictionary::from_iter([("reason".to_owned(), Value::from("com.myapp.stop"))]),
        }))
        .await
        .unwrap();
    assert_matches::assert_matches!(
        router.next_message().await,
        Ok(Some(Message::Error(message))) => {
            assert_eq!(message.request.value(), 5);
            assert_eq!(message.error.as_ref(), "com.myapp.stop");
        }
    );
}

#[tokio::test]
async fn callee_sends_nothing_after_kill_no_wait() {
    test_utils::setup::setup_test_environment();

    let (mut router, _callee) = router_and_callee(Arc::new(Forever));
    router
        .send_message(invocation_message(6, Dictionary::default(), List::default()))
        .await
        .unwrap();
    router
        .send_message(Message::Interrupt(InterruptMessage {
            invocation_request: Id::try_from(6).unwrap(),
            options: Dictionary::from_iter([("mode".to_owned(), Value::from("killnowait"))]),
        }))
        .await
        .unwrap();

    // The next response belongs to the following invocation.
    router
        .send_message(invocation_message(7, Dictionary::default(), List::default()))
        .await
        .unwrap();
    router
        .send_message(Message::Interrupt(InterruptMessage {
            invocation_request: Id::try_from(7).unwrap(),
            options: Dictionary::default(),
        }))
        .await
        .unwrap();
    assert_matches::assert_matches!(
        router.next_message().await,
        Ok(Some(Message::Error(message))) => {
            assert_eq!(message.request.value(), 7);
        }
    );
}
