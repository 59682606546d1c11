// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Replays a frozen recording on a fixed period until stopped.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, span, Instrument, Level, Span};

use crate::{instruments::Instruments, recorder::VoiceEvent, voices::VoiceKind};

/// Time allowed for a percussive voice to finish sounding when working out
/// where a recording ends.
pub const PERCUSSIVE_END_PAD: Duration = Duration::from_millis(100);

/// The shortest loop that will be played.
pub const DEFAULT_MINIMUM_PERIOD: Duration = Duration::from_secs(1);

/// Silence between the end of the last event and the start of the next iteration.
pub const DEFAULT_SEAM_GAP: Duration = Duration::from_millis(50);

/// Parameters used to derive a loop period from a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Lower bound for the period. Must be non-zero.
    pub minimum_period: Duration,
    /// Added after the end of the last event.
    pub seam_gap: Duration,
    /// Nominal tail of a percussive voice.
    pub percussive_end_pad: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        LoopTiming {
            minimum_period: DEFAULT_MINIMUM_PERIOD,
            seam_gap: DEFAULT_SEAM_GAP,
            percussive_end_pad: PERCUSSIVE_END_PAD,
        }
    }
}

/// A recording ready to be looped: its events sorted by offset and the period
/// they repeat on.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopPlan {
    period: Duration,
    events: Vec<VoiceEvent>,
}

impl LoopPlan {
    /// Builds a plan from recorded events. Returns None if there are no events.
    pub fn new(mut events: Vec<VoiceEvent>, timing: &LoopTiming) -> Option<LoopPlan> {
        if events.is_empty() {
            return None;
        }

        // Stable, so simultaneous events keep the order they were recorded in.
        events.sort_by_key(|event| event.offset());

        let last_end = events
            .iter()
            .map(|event| {
                event.offset()
                    + match event.kind() {
                        VoiceKind::Sustained => event.duration(),
                        VoiceKind::Percussive => timing.percussive_end_pad,
                    }
            })
            .max()
            .unwrap_or_default();

        Some(LoopPlan {
            period: timing.minimum_period.max(last_end + timing.seam_gap),
            events,
        })
    }

    /// The time between the starts of two consecutive iterations.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The events in playback order.
    pub fn events(&self) -> &[VoiceEvent] {
        &self.events
    }
}

struct Running {
    join: JoinHandle<()>,
    plan: Arc<LoopPlan>,
}

/// Drives at most one loop plan at a time.
///
/// Each started plan gets a generation number. Every timer remembers the
/// generation it was scheduled under and does nothing once that generation is
/// no longer live, so a timer that fires after a stop is dropped even if
/// its task hasn't been torn down yet.
pub struct Looper {
    instruments: Arc<Instruments>,
    generation: Arc<AtomicU64>,
    running: Option<Running>,
    span: Span,
}

impl Looper {
    pub fn new(instruments: Arc<Instruments>) -> Looper {
        Looper {
            instruments,
            generation: Arc::new(AtomicU64::new(0)),
            running: None,
            span: span!(Level::INFO, "looper"),
        }
    }

    /// Starts looping the plan, stopping whatever was looping before. The first
    /// iteration starts immediately. Must be called from within a tokio runtime.
    pub fn start(&mut self, plan: LoopPlan) {
        self.stop();

        let _enter = self.span.enter();
        let token = self.generation.load(Ordering::Acquire);
        let plan = Arc::new(plan);

        info!(
            events = plan.events().len(),
            period = format!("{:?}", plan.period()),
            "Starting loop."
        );

        let join = tokio::spawn(
            Looper::run(
                plan.clone(),
                self.instruments.clone(),
                self.generation.clone(),
                token,
            )
            .instrument(self.span.clone()),
        );
        self.running = Some(Running { join, plan });
    }

    /// Stops the current loop. Returns false if nothing was looping.
    pub fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        let _enter = self.span.enter();
        // Invalidate timers first so nothing fires while the task is torn down.
        self.generation.fetch_add(1, Ordering::AcqRel);
        running.join.abort();
        info!("Stopped loop.");
        true
    }

    /// Returns true while a plan is looping.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The plan currently looping.
    pub fn plan(&self) -> Option<&LoopPlan> {
        self.running.as_ref().map(|running| running.plan.as_ref())
    }

    /// Schedules iterations back to back. Iteration `n` starts at
    /// `start + n * period` no matter how late earlier timers fired.
    async fn run(
        plan: Arc<LoopPlan>,
        instruments: Arc<Instruments>,
        generation: Arc<AtomicU64>,
        token: u64,
    ) {
        let mut iteration_start = Instant::now();
        let mut iteration: u64 = 0;
        // Timers from the previous iteration stay alive for one more period in
        // case one of them is running late. Older ones are aborted on drop.
        let mut current: JoinSet<()> = JoinSet::new();

        loop {
            if generation.load(Ordering::Acquire) != token {
                return;
            }
            debug!(iteration, "Starting loop iteration.");

            let mut timers = JoinSet::new();
            for (index, event) in plan.events().iter().enumerate() {
                let deadline = iteration_start + event.offset();
                let plan = plan.clone();
                let instruments = instruments.clone();
                let generation = generation.clone();
                timers.spawn(
                    async move {
                        sleep_until(deadline).await;
                        if generation.load(Ordering::Acquire) != token {
                            return;
                        }
                        let event = &plan.events()[index];
                        debug!(
                            note = event.voice().label,
                            offset = format!("{:?}", event.offset()),
                            "Replaying event."
                        );
                        instruments.replay(event);
                    }
                    .in_current_span(),
                );
            }
            let draining = std::mem::replace(&mut current, timers);

            iteration_start += plan.period();
            iteration += 1;
            sleep_until(iteration_start).await;
            drop(draining);
        }
    }
}

impl Drop for Looper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use tokio::time::sleep;

    use crate::{
        instruments::Instruments,
        recorder::VoiceEvent,
        testutil::{MockPlayer, MockVisual, Played},
        voices::{DRUMS, PIANO},
    };

    use super::{LoopPlan, LoopTiming, Looper};

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn hit(index: usize, offset: u64) -> VoiceEvent {
        VoiceEvent::Percussive {
            voice: &DRUMS[index],
            offset: ms(offset),
        }
    }

    fn note(index: usize, offset: u64, duration: u64) -> VoiceEvent {
        VoiceEvent::Sustained {
            voice: &PIANO[index],
            offset: ms(offset),
            duration: ms(duration),
        }
    }

    fn looper() -> (Looper, Arc<MockPlayer>) {
        let sound = Arc::new(MockPlayer::new());
        let instruments = Arc::new(Instruments::new(
            sound.clone(),
            Arc::new(MockVisual::new()),
            ms(800),
        ));
        (Looper::new(instruments), sound)
    }

    /// Asserts that `actual` is within a few milliseconds of `expected`.
    fn assert_near(expected: Duration, actual: Duration) {
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        assert!(
            diff <= ms(5),
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_empty_recording_has_no_plan() {
        assert_eq!(None, LoopPlan::new(Vec::new(), &LoopTiming::default()));
    }

    #[test]
    fn test_single_hit_uses_minimum_period() {
        let plan = LoopPlan::new(vec![hit(0, 0)], &LoopTiming::default()).expect("plan");
        assert_eq!(ms(1000), plan.period());
    }

    #[test]
    fn test_single_note_period() {
        let plan = LoopPlan::new(vec![note(0, 200, 1000)], &LoopTiming::default()).expect("plan");
        assert_eq!(ms(1250), plan.period());
    }

    #[test]
    fn test_period_covers_longest_event() {
        // The latest start isn't the latest end.
        let plan = LoopPlan::new(
            vec![note(1, 100, 2000), hit(2, 900), note(3, 1500, 100)],
            &LoopTiming::default(),
        )
        .expect("plan");
        assert_eq!(ms(2150), plan.period());
    }

    #[test]
    fn test_period_bounds() {
        let timing = LoopTiming::default();
        let recordings = vec![
            vec![hit(0, 0)],
            vec![hit(0, 950)],
            vec![note(0, 0, 10)],
            vec![note(0, 400, 600), hit(1, 1000)],
            vec![hit(6, 3000), note(8, 20, 5000), hit(0, 0)],
            vec![note(2, 999, 1), note(3, 999, 0)],
        ];

        for events in recordings {
            let ends: Vec<Duration> = events
                .iter()
                .map(|event| match event {
                    VoiceEvent::Sustained {
                        offset, duration, ..
                    } => *offset + *duration,
                    VoiceEvent::Percussive { offset, .. } => *offset + timing.percussive_end_pad,
                })
                .collect();
            let last_end = ends.into_iter().max().expect("non-empty");

            let plan = LoopPlan::new(events, &timing).expect("plan");
            assert!(plan.period() >= timing.minimum_period);
            assert!(plan.period() >= last_end + timing.seam_gap);
        }
    }

    #[test]
    fn test_custom_timing() {
        let timing = LoopTiming {
            minimum_period: ms(250),
            seam_gap: Duration::ZERO,
            percussive_end_pad: ms(40),
        };
        let plan = LoopPlan::new(vec![hit(0, 100)], &timing).expect("plan");
        assert_eq!(ms(250), plan.period());

        let plan = LoopPlan::new(vec![hit(0, 300)], &timing).expect("plan");
        assert_eq!(ms(340), plan.period());
    }

    #[test]
    fn test_events_sorted_stably() {
        let plan = LoopPlan::new(
            vec![hit(0, 500), note(0, 100, 100), note(1, 500, 100), hit(1, 0)],
            &LoopTiming::default(),
        )
        .expect("plan");
        assert_eq!(
            &[hit(1, 0), note(0, 100, 100), hit(0, 500), note(1, 500, 100)],
            plan.events()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_replays_every_period() {
        let (mut looper, sound) = looper();
        let plan = LoopPlan::new(vec![note(1, 200, 300), hit(0, 0)], &LoopTiming::default())
            .expect("plan");
        assert_eq!(ms(1000), plan.period());

        looper.start(plan);
        assert!(looper.is_running());
        sleep(ms(3500)).await;

        let played = sound.played();
        let drums: Vec<Duration> = played
            .iter()
            .filter_map(|played| match played {
                Played::Percussive { voice: 0, at } => Some(*at),
                _ => None,
            })
            .collect();
        let notes: Vec<Duration> = played
            .iter()
            .filter_map(|played| match played {
                Played::Sustained {
                    voice: 1,
                    duration,
                    at,
                } => {
                    assert_eq!(ms(300), *duration);
                    Some(*at)
                }
                _ => None,
            })
            .collect();

        assert_eq!(4, drums.len(), "drums played at {:?}", drums);
        assert_eq!(4, notes.len(), "notes played at {:?}", notes);
        for (i, at) in drums.iter().enumerate() {
            assert_near(ms(1000 * i as u64), *at);
        }
        for (i, at) in notes.iter().enumerate() {
            assert_near(ms(1000 * i as u64 + 200), *at);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_simultaneous_events_fire_once_per_iteration() {
        let (mut looper, sound) = looper();
        let plan = LoopPlan::new(vec![note(4, 500, 200), hit(2, 500)], &LoopTiming::default())
            .expect("plan");

        looper.start(plan);
        sleep(ms(2900)).await;

        let played = sound.played();
        assert_eq!(6, played.len(), "played {:?}", played);
        for iteration in 0..3u64 {
            let in_iteration: Vec<&Played> = played
                .iter()
                .filter(|played| {
                    let at = played.at();
                    at >= ms(iteration * 1000) && at < ms((iteration + 1) * 1000)
                })
                .collect();
            assert_eq!(2, in_iteration.len());
            assert!(in_iteration
                .iter()
                .any(|played| matches!(played, Played::Sustained { voice: 4, .. })));
            assert!(in_iteration
                .iter()
                .any(|played| matches!(played, Played::Percussive { voice: 2, .. })));
            for played in in_iteration {
                assert_near(ms(iteration * 1000 + 500), played.at());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_replays() {
        let (mut looper, sound) = looper();
        let plan = LoopPlan::new(
            vec![hit(0, 0), hit(1, 400), note(2, 700, 200)],
            &LoopTiming::default(),
        )
        .expect("plan");

        looper.start(plan);
        sleep(ms(1500)).await;
        // 3 from the first iteration, 2 from the second.
        assert_eq!(5, sound.played().len());

        assert!(looper.stop());
        assert!(!looper.is_running());
        assert!(looper.plan().is_none());
        sleep(ms(10_000)).await;
        assert_eq!(5, sound.played().len());

        // Stopping again is harmless.
        assert!(!looper.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_plan() {
        let (mut looper, sound) = looper();
        looper.start(LoopPlan::new(vec![hit(0, 300)], &LoopTiming::default()).expect("plan"));
        sleep(ms(100)).await;

        looper.start(LoopPlan::new(vec![hit(5, 600)], &LoopTiming::default()).expect("plan"));
        assert_eq!(
            Some(&[hit(5, 600)][..]),
            looper.plan().map(|plan| plan.events())
        );
        sleep(ms(5000)).await;

        let played = sound.played();
        assert!(!played.is_empty());
        assert!(
            played
                .iter()
                .all(|played| matches!(played, Played::Percussive { voice: 5, .. })),
            "old plan still playing: {:?}",
            played
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_loop() {
        let (mut looper, sound) = looper();
        looper.start(LoopPlan::new(vec![hit(0, 500)], &LoopTiming::default()).expect("plan"));
        sleep(ms(100)).await;
        drop(looper);

        sleep(ms(5000)).await;
        assert!(sound.played().is_empty());
    }
}
