//! # Scripted Transports
//!
//! In-memory doubles for [`DataTransport`], [`ImageTransport`] and [`ChatTransport`] with a
//! fluent expectation API. Each call consumes the next scripted expectation for that
//! method, in order; an unscripted call panics inside the transport task, which the
//! crate's fetch boundaries turn into a `Failed` state.
//!
//! ```rust,ignore
//! let data = ScriptedData::new();
//! data.expect_picture().return_ok(picture);
//! data.expect_events().return_err(LoadError::Network("offline".into()));
//!
//! // Hold a reply until the test decides to release it.
//! let pending = data.expect_picture().deferred();
//! // ...
//! pending.ok(other_picture);
//!
//! data.verify(); // all expectations consumed
//! ```

use crate::error::LoadError;
use crate::model::{EventsFeed, PictureResource};
use crate::transport::{ChatTransport, DataTransport, ImageTransport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Reply<T> {
    Ready(Result<T, LoadError>),
    Deferred(oneshot::Receiver<Result<T, LoadError>>),
}

struct Expectation<T> {
    argument: Option<String>,
    reply: Reply<T>,
}

/// FIFO of expectations for one transport method, plus a log of received calls.
struct Script<T> {
    name: &'static str,
    queue: Arc<Mutex<VecDeque<Expectation<T>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl<T> Clone for Script<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            queue: self.queue.clone(),
            calls: self.calls.clone(),
        }
    }
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Send + 'static> Script<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn expect(&self, argument: Option<String>) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            script: self.clone(),
            argument,
        }
    }

    async fn answer(&self, argument: &str) -> Result<T, LoadError> {
        locked(&self.calls).push(argument.to_string());
        let next = locked(&self.queue).pop_front();
        let Some(expectation) = next else {
            panic!("{}: unexpected call ({argument:?})", self.name);
        };
        if let Some(expected) = &expectation.argument {
            assert_eq!(expected, argument, "{}: argument mismatch", self.name);
        }
        match expectation.reply {
            Reply::Ready(result) => result,
            Reply::Deferred(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(LoadError::Transient("scripted reply dropped".into()))),
        }
    }

    fn calls(&self) -> Vec<String> {
        locked(&self.calls).clone()
    }

    fn verify(&self) {
        let remaining = locked(&self.queue).len();
        if remaining != 0 {
            panic!("{}: {} expectation(s) not met", self.name, remaining);
        }
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<T> {
    script: Script<T>,
    argument: Option<String>,
}

impl<T: Send + 'static> ExpectationBuilder<T> {
    pub fn return_ok(self, value: T) {
        self.push(Reply::Ready(Ok(value)));
    }

    pub fn return_err(self, error: LoadError) {
        self.push(Reply::Ready(Err(error)));
    }

    /// The call will wait until the returned [`Responder`] is used (or dropped).
    pub fn deferred(self) -> Responder<T> {
        let (sender, receiver) = oneshot::channel();
        self.push(Reply::Deferred(receiver));
        Responder { sender }
    }

    fn push(self, reply: Reply<T>) {
        locked(&self.script.queue).push_back(Expectation {
            argument: self.argument,
            reply,
        });
    }
}

/// Releases a deferred reply.
pub struct Responder<T> {
    sender: oneshot::Sender<Result<T, LoadError>>,
}

impl<T> Responder<T> {
    pub fn ok(self, value: T) {
        let _ = self.sender.send(Ok(value));
    }

    pub fn err(self, error: LoadError) {
        let _ = self.sender.send(Err(error));
    }
}

// =============================================================================
// TRANSPORTS
// =============================================================================

/// Scripted [`DataTransport`].
#[derive(Clone)]
pub struct ScriptedData {
    picture: Script<PictureResource>,
    events: Script<EventsFeed>,
}

impl Default for ScriptedData {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedData {
    pub fn new() -> Self {
        Self {
            picture: Script::new("fetch_picture"),
            events: Script::new("fetch_events"),
        }
    }

    pub fn expect_picture(&self) -> ExpectationBuilder<PictureResource> {
        self.picture.expect(None)
    }

    pub fn expect_events(&self) -> ExpectationBuilder<EventsFeed> {
        self.events.expect(None)
    }

    pub fn picture_calls(&self) -> usize {
        self.picture.calls().len()
    }

    pub fn events_calls(&self) -> usize {
        self.events.calls().len()
    }

    pub fn verify(&self) {
        self.picture.verify();
        self.events.verify();
    }
}

#[async_trait]
impl DataTransport for ScriptedData {
    async fn fetch_picture(&self) -> Result<PictureResource, LoadError> {
        self.picture.answer("").await
    }

    async fn fetch_events(&self) -> Result<EventsFeed, LoadError> {
        self.events.answer("").await
    }
}

/// Scripted [`ImageTransport`]; each expectation is bound to a URL.
#[derive(Clone)]
pub struct ScriptedImages {
    fetch: Script<Vec<u8>>,
}

impl Default for ScriptedImages {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedImages {
    pub fn new() -> Self {
        Self {
            fetch: Script::new("fetch_image"),
        }
    }

    pub fn expect_fetch(&self, url: impl Into<String>) -> ExpectationBuilder<Vec<u8>> {
        self.fetch.expect(Some(url.into()))
    }

    /// URLs requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.fetch.calls()
    }

    pub fn verify(&self) {
        self.fetch.verify();
    }
}

#[async_trait]
impl ImageTransport for ScriptedImages {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self.fetch.answer(url).await
    }
}

/// Scripted [`ChatTransport`].
#[derive(Clone)]
pub struct ScriptedChat {
    send: Script<String>,
}

impl Default for ScriptedChat {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedChat {
    pub fn new() -> Self {
        Self {
            send: Script::new("send_message"),
        }
    }

    pub fn expect_send(&self) -> ExpectationBuilder<String> {
        self.send.expect(None)
    }

    /// Outbound texts received so far, in call order.
    pub fn sent(&self) -> Vec<String> {
        self.send.calls()
    }

    pub fn verify(&self) {
        self.send.verify();
    }
}

#[async_trait]
impl ChatTransport for ScriptedChat {
    async fn send_message(&self, text: &str) -> Result<String, LoadError> {
        self.send.answer(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaKind;

    #[tokio::test]
    async fn expectations_are_consumed_in_order() {
        let data = ScriptedData::new();
        data.expect_picture()
            .return_ok(PictureResource::new("First", MediaKind::Video, None));
        data.expect_picture()
            .return_err(LoadError::Network("offline".into()));

        assert_eq!(data.fetch_picture().await.unwrap().title, "First");
        assert_eq!(
            data.fetch_picture().await,
            Err(LoadError::Network("offline".into()))
        );
        assert_eq!(data.picture_calls(), 2);
        data.verify();
    }

    #[tokio::test]
    async fn deferred_reply_waits_for_responder() {
        let chat = ScriptedChat::new();
        let responder = chat.expect_send().deferred();

        let transport = chat.clone();
        let call = tokio::spawn(async move { transport.send_message("Hi").await });
        tokio::task::yield_now().await;
        assert!(!call.is_finished());

        responder.ok("Hello there".into());
        assert_eq!(call.await.unwrap(), Ok("Hello there".to_string()));
        assert_eq!(chat.sent(), vec!["Hi".to_string()]);
    }

    #[tokio::test]
    #[should_panic(expected = "expectation(s) not met")]
    async fn verify_reports_leftovers() {
        let images = ScriptedImages::new();
        images.expect_fetch("https://example.org/x.png").return_ok(vec![]);
        images.verify();
    }
}
