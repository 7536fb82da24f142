// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Repeating timer used to re-render the cycle countdown.

use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Calls a tick function on a fixed period until stopped.
///
/// At most one timer runs per instance: [RepeatingTimer::start] stops the previous timer first,
/// [RepeatingTimer::stop] may be called any number of times, and dropping the instance stops it.
pub struct RepeatingTimer {
    period: Duration,
    running: Option<Running>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, running: None }
    }

    /// Start ticking. The first tick happens immediately.
    pub fn start<F>(&mut self, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();

        let cancel = CancellationToken::new();
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let handle = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = interval.tick() => tick(),
                    }
                }
            }
        });
        self.running = Some(Running { cancel, handle });
    }

    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            running.handle.abort();
            tracing::trace!("stopped repeating timer");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Render a number of seconds as `HH:MM:SS`, with days prefixed when needed.
pub fn format_countdown(seconds: u64) -> String {
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let (hours, minutes, secs) = (rest / 3600, rest % 3600 / 60, rest % 60);
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let tick = {
            let count = count.clone();
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };
        (count, tick)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_stopped() {
        let (count, tick) = counter();
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.start(tick);
        assert!(timer.is_running());

        tokio::time::sleep(Duration::from_millis(3500)).await;
        // Ticks at 0s, 1s, 2s and 3s.
        assert_eq!(count.load(Ordering::SeqCst), 4);

        timer.stop();
        assert!(!timer.is_running());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.stop();
        let (_count, tick) = counter();
        timer.start(tick);
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_timer() {
        let (first, first_tick) = counter();
        let (second, second_tick) = counter();
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));

        timer.start(first_tick);
        timer.start(second_tick);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_timer() {
        let (count, tick) = counter();
        {
            let mut timer = RepeatingTimer::new(Duration::from_secs(1));
            timer.start(tick);
            tokio::time::sleep(Duration::from_millis(1500)).await;
        }
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[test]
    fn formats_countdown() {
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(43_200), "12:00:00");
        assert_eq!(format_countdown(3_725), "01:02:05");
        assert_eq!(format_countdown(90_061), "1d 01:01:01");
    }
}
