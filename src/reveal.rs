//! # Progressive Reveal
//!
//! [`RevealController`] discloses a complete text one word token per tick.
//!
//! A token is a word together with the whitespace in front of it, so every emitted
//! prefix is a slice of the original string: spacing is never rebuilt. Leading
//! whitespace belongs to the first token and trailing whitespace to the last one.
//! `"Mars is red"` reveals as `"Mars"`, `"Mars is"`, `"Mars is red"`.
//!
//! The sequence of prefixes depends only on the number of ticks, never on how late a
//! tick fires.
//!
//! ## Cancellation
//!
//! Progress is published while holding the controller's lock, and [`RevealController::cancel`]
//! flips the phase under the same lock. Once `cancel` returns no further update is
//! delivered. A cancelled controller stays inert; start a new one for a new reveal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Where a reveal stands. Constructing the controller is the idle moment, so a live
/// controller is never idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Revealing,
    Complete,
    Cancelled,
}

/// Delivered to the controller's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealUpdate {
    /// Byte length of the prefix now visible.
    Progress(usize),
    /// The whole text is visible; no more updates follow.
    Complete,
}

/// End offsets of each word token, the last one always being `text.len()`.
pub fn token_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut in_word = false;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if in_word {
                ends.push(i);
                in_word = false;
            }
        } else {
            in_word = true;
        }
    }
    if in_word {
        ends.push(text.len());
    } else if let Some(last) = ends.last_mut() {
        *last = text.len();
    }
    ends
}

#[derive(Debug)]
struct Progress {
    phase: RevealPhase,
    revealed: usize,
}

fn locked(m: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Paced, cancellable reveal of one text.
#[derive(Debug)]
pub struct RevealController {
    progress: Arc<Mutex<Progress>>,
    full_len: usize,
    task: Option<JoinHandle<()>>,
}

impl RevealController {
    /// Starts revealing `full_text`, one token every `interval`.
    ///
    /// `on_update` runs on the reveal task with the controller's lock held; it must not
    /// call back into this controller. Text without any word completes at once.
    pub fn start<F>(full_text: &str, interval: Duration, mut on_update: F) -> Self
    where
        F: FnMut(RevealUpdate) + Send + 'static,
    {
        let ends = token_ends(full_text);
        let full_len = full_text.len();

        if ends.is_empty() {
            on_update(RevealUpdate::Complete);
            return Self {
                progress: Arc::new(Mutex::new(Progress {
                    phase: RevealPhase::Complete,
                    revealed: full_len,
                })),
                full_len,
                task: None,
            };
        }

        debug!(tokens = ends.len(), ?interval, "Reveal started");
        let progress = Arc::new(Mutex::new(Progress {
            phase: RevealPhase::Revealing,
            revealed: 0,
        }));
        let shared = progress.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let last = ends.len() - 1;
            for (i, end) in ends.into_iter().enumerate() {
                ticker.tick().await;
                let mut state = locked(&shared);
                if state.phase != RevealPhase::Revealing {
                    return;
                }
                state.revealed = end;
                on_update(RevealUpdate::Progress(end));
                if i == last {
                    state.phase = RevealPhase::Complete;
                    on_update(RevealUpdate::Complete);
                }
            }
        });

        Self {
            progress,
            full_len,
            task: Some(task),
        }
    }

    /// Halts the reveal. No-op once complete or already cancelled.
    pub fn cancel(&mut self) {
        {
            let mut state = locked(&self.progress);
            if state.phase == RevealPhase::Revealing {
                state.phase = RevealPhase::Cancelled;
                debug!(revealed = state.revealed, "Reveal cancelled");
            }
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn phase(&self) -> RevealPhase {
        locked(&self.progress).phase
    }

    pub fn revealed_len(&self) -> usize {
        locked(&self.progress).revealed
    }

    pub fn full_len(&self) -> usize {
        self.full_len
    }

    pub fn is_active(&self) -> bool {
        self.phase() == RevealPhase::Revealing
    }
}

impl Drop for RevealController {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const TICK: Duration = Duration::from_millis(75);

    fn prefixes(text: &str) -> Vec<&str> {
        token_ends(text).into_iter().map(|e| &text[..e]).collect()
    }

    #[test]
    fn tokens_keep_original_spacing() {
        assert_eq!(prefixes("Mars is red"), vec!["Mars", "Mars is", "Mars is red"]);
        assert_eq!(prefixes("  two\n\nlines  "), vec!["  two", "  two\n\nlines  "]);
        assert_eq!(prefixes("héllo wörld"), vec!["héllo", "héllo wörld"]);
        assert!(token_ends("").is_empty());
        assert!(token_ends(" \t ").is_empty());
    }

    fn start(text: &str) -> (RevealController, mpsc::UnboundedReceiver<RevealUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = RevealController::start(text, TICK, move |u| {
            let _ = tx.send(u);
        });
        (controller, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn reveals_each_token_then_completes() {
        let (controller, mut rx) = start("a b c");
        let mut lengths = Vec::new();
        while let Some(update) = rx.recv().await {
            match update {
                RevealUpdate::Progress(n) => lengths.push(n),
                RevealUpdate::Complete => break,
            }
        }
        assert_eq!(lengths, vec![1, 3, 5]);
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(controller.phase(), RevealPhase::Complete);
        assert_eq!(controller.revealed_len(), controller.full_len());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_second_tick_stops_for_good() {
        let text = "Mars is red";
        let (mut controller, mut rx) = start(text);
        assert_eq!(rx.recv().await, Some(RevealUpdate::Progress(4)));
        assert_eq!(rx.recv().await, Some(RevealUpdate::Progress(7)));

        controller.cancel();
        tokio::time::sleep(TICK * 10).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(&text[..controller.revealed_len()], "Mars is");
        assert_eq!(controller.phase(), RevealPhase::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn starts_revealing_with_nothing_shown() {
        let (controller, mut rx) = start("Mars is red");
        assert_eq!(controller.phase(), RevealPhase::Revealing);
        assert_eq!(controller.revealed_len(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_tick_reveals_nothing() {
        let (mut controller, mut rx) = start("never shown");
        controller.cancel();
        tokio::time::sleep(TICK * 5).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(controller.revealed_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_complete_is_noop() {
        let (mut controller, mut rx) = start("done");
        assert_eq!(rx.recv().await, Some(RevealUpdate::Progress(4)));
        assert_eq!(rx.recv().await, Some(RevealUpdate::Complete));
        controller.cancel();
        controller.cancel();
        assert_eq!(controller.phase(), RevealPhase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn late_ticks_do_not_change_the_sequence() {
        let (_controller, mut rx) = start("one two three");
        // Stall well past several intervals before draining.
        tokio::time::sleep(TICK * 7).await;
        let mut seen = Vec::new();
        while let Ok(u) = rx.try_recv() {
            seen.push(u);
        }
        assert_eq!(
            seen,
            vec![
                RevealUpdate::Progress(3),
                RevealUpdate::Progress(7),
                RevealUpdate::Progress(13),
                RevealUpdate::Complete,
            ]
        );
    }

    #[tokio::test]
    async fn blank_text_completes_immediately() {
        let (controller, mut rx) = start("   ");
        assert_eq!(rx.try_recv(), Ok(RevealUpdate::Complete));
        assert_eq!(controller.phase(), RevealPhase::Complete);
        assert_eq!(controller.revealed_len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_controller_stops_updates() {
        let (controller, mut rx) = start("gone before shown");
        drop(controller);
        tokio::time::sleep(TICK * 5).await;
        assert!(rx.try_recv().is_err());
    }
}
