use cosmos_core::chat::{ChatClient, ConversationActor};
use cosmos_core::error::{ChatError, LoadError};
use cosmos_core::mock::ScriptedChat;
use cosmos_core::model::{ChatTurn, ResponseState, TurnId};
use cosmos_core::slot::Subscription;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const TICK: Duration = Duration::from_millis(75);

fn start(chat: &ScriptedChat) -> ChatClient {
    let (actor, client) = ConversationActor::new(16, TICK);
    tokio::spawn(actor.run(Arc::new(chat.clone())));
    client
}

/// Collects snapshots of turn `id` up to and including the first one in `until`.
async fn collect_until(
    sub: &mut Subscription<ChatTurn>,
    id: TurnId,
    until: ResponseState,
) -> Vec<ChatTurn> {
    timeout(Duration::from_secs(60), async {
        let mut seen = Vec::new();
        while let Some(turn) = sub.next().await {
            if turn.id != id {
                continue;
            }
            let done = turn.response_state == until;
            seen.push(turn);
            if done {
                return seen;
            }
        }
        panic!("conversation went away");
    })
    .await
    .expect("turn never reached the expected state")
}

fn states(turns: &[ChatTurn]) -> Vec<ResponseState> {
    let mut out: Vec<ResponseState> = turns.iter().map(|t| t.response_state).collect();
    out.dedup();
    out
}

#[tokio::test(start_paused = true)]
async fn failed_turn_is_retried_in_place() {
    let chat = ScriptedChat::new();
    chat.expect_send()
        .return_err(LoadError::Network("timeout".into()));
    chat.expect_send().return_ok("Hi there, explorer".into());

    let client = start(&chat);
    let mut sub = client.subscribe().await.unwrap();
    let id = client.send("Hello").await.unwrap();

    let first = collect_until(&mut sub, id, ResponseState::Failed).await;
    let failed = first.last().unwrap();
    assert_eq!(failed.error_detail.as_deref(), Some("timeout"));
    assert_eq!(failed.user_text, "Hello");
    assert!(failed.can_retry());

    client.retry(id).await.unwrap();
    let second = collect_until(&mut sub, id, ResponseState::Displayed).await;
    assert_eq!(
        states(&second),
        vec![
            ResponseState::Sending,
            ResponseState::AwaitingResponse,
            ResponseState::Revealing,
            ResponseState::Displayed,
        ]
    );
    let shown = second.last().unwrap();
    assert_eq!(shown.id, id);
    assert_eq!(shown.user_text, "Hello");
    assert_eq!(shown.revealed_text(), "Hi there, explorer");
    assert_eq!(shown.error_detail, None);

    assert_eq!(client.turns().await.unwrap().len(), 1);
    assert_eq!(chat.sent(), vec!["Hello", "Hello"]);
    chat.verify();
}

#[tokio::test(start_paused = true)]
async fn reveal_grows_word_by_word() {
    let chat = ScriptedChat::new();
    chat.expect_send().return_ok("Mars is red".into());

    let client = start(&chat);
    let mut sub = client.subscribe().await.unwrap();
    let id = client.send("What colour is Mars?").await.unwrap();

    let seen = collect_until(&mut sub, id, ResponseState::Displayed).await;
    let mut prefixes: Vec<&str> = seen
        .iter()
        .filter(|t| t.response_state != ResponseState::Sending)
        .filter(|t| t.response_state != ResponseState::AwaitingResponse)
        .map(ChatTurn::revealed_text)
        .collect();
    prefixes.dedup();
    assert_eq!(prefixes, vec!["", "Mars", "Mars is", "Mars is red"]);
}

#[tokio::test(start_paused = true)]
async fn interrupted_reveal_never_leaks_into_the_retry() {
    let chat = ScriptedChat::new();
    chat.expect_send()
        .return_ok("the first answer is rather long".into());
    chat.expect_send().return_ok("second".into());

    let client = start(&chat);
    let mut sub = client.subscribe().await.unwrap();
    let id = client.send("Tell me about Io").await.unwrap();

    timeout(Duration::from_secs(60), async {
        while let Some(turn) = sub.next().await {
            if turn.response_state == ResponseState::Revealing && turn.revealed_prefix_len > 0 {
                break;
            }
        }
    })
    .await
    .unwrap();

    client
        .interrupt(id, LoadError::Transient("stream reset".into()))
        .await
        .unwrap();
    let failed = collect_until(&mut sub, id, ResponseState::Failed).await;
    let failed = failed.last().unwrap();
    assert_eq!(failed.error_detail.as_deref(), Some("stream reset"));
    assert_eq!(failed.revealed_text(), "");

    client.retry(id).await.unwrap();
    let after = collect_until(&mut sub, id, ResponseState::Displayed).await;
    for turn in &after {
        assert!(matches!(turn.response_text.as_deref(), None | Some("second")));
    }
    assert_eq!(after.last().unwrap().revealed_text(), "second");

    tokio::time::sleep(TICK * 10).await;
    assert_eq!(sub.try_next(), None);
}

#[tokio::test(start_paused = true)]
async fn turns_fail_independently() {
    let chat = ScriptedChat::new();
    chat.expect_send().return_ok("Saturn".into());
    chat.expect_send()
        .return_err(LoadError::Network("offline".into()));

    let client = start(&chat);
    let mut sub = client.subscribe().await.unwrap();
    let first = client.send("Which planet has rings?").await.unwrap();
    collect_until(&mut sub, first, ResponseState::Displayed).await;

    let second = client.send("And the biggest?").await.unwrap();
    collect_until(&mut sub, second, ResponseState::Failed).await;

    let turns = client.turns().await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].response_state, ResponseState::Displayed);
    assert!(!turns[0].is_thinking());
    assert_eq!(turns[1].response_state, ResponseState::Failed);
    assert_eq!(client.turn(first).await.unwrap().revealed_text(), "Saturn");
}

#[tokio::test]
async fn invalid_operations_are_rejected() {
    let chat = ScriptedChat::new();
    let pending = chat.expect_send().deferred();

    let client = start(&chat);
    let id = client.send("Ping").await.unwrap();

    assert!(matches!(
        client.retry(id).await,
        Err(ChatError::InvalidTransition { operation: "retry", .. })
    ));
    assert!(matches!(
        client.retry(TurnId(99)).await,
        Err(ChatError::TurnNotFound(_))
    ));
    assert!(matches!(
        client.turn(TurnId(99)).await,
        Err(ChatError::TurnNotFound(_))
    ));
    assert!(client.turn(id).await.unwrap().is_thinking());

    pending.err(LoadError::Network("gone".into()));
}

#[tokio::test]
async fn late_subscriber_sees_existing_turns_first() {
    let chat = ScriptedChat::new();
    let _pending = chat.expect_send().deferred();

    let client = start(&chat);
    let id = client.send("Anyone out there?").await.unwrap();

    let mut sub = client.subscribe().await.unwrap();
    let first = sub.try_next().expect("existing turn replayed");
    assert_eq!(first.id, id);
    assert_eq!(first.response_state, ResponseState::AwaitingResponse);

    assert!(client.unsubscribe(sub.id()).await.unwrap());
    assert!(!client.unsubscribe(sub.id()).await.unwrap());
}
