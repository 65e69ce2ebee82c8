// Copyright 2025 Fernando Borretti
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

use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::Fallible;
use crate::error::fail;
use crate::focus::monitor::FocusMonitor;
use crate::focus::monitor::Interruption;
use crate::focus::signal::FocusSignal;
use crate::types::session_record::SessionKind;
use crate::types::session_record::SessionOutcome;
use crate::types::timestamp::Timestamp;

pub const PRESET_MINUTES: [u32; 5] = [5, 15, 25, 45, 60];

pub const MIN_FOCUS_MINUTES: u32 = 1;

pub const MAX_FOCUS_MINUTES: u32 = 120;

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;

/// Length of a focus session, between 1 and 120 minutes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FocusDuration(u32);

impl FocusDuration {
    pub fn minutes(minutes: u32) -> Fallible<Self> {
        if !(MIN_FOCUS_MINUTES..=MAX_FOCUS_MINUTES).contains(&minutes) {
            return fail(format!(
                "focus duration must be between {MIN_FOCUS_MINUTES} and {MAX_FOCUS_MINUTES} minutes."
            ));
        }
        Ok(Self(minutes))
    }

    pub fn as_minutes(self) -> u32 {
        self.0
    }

    pub fn as_seconds(self) -> u32 {
        self.0 * 60
    }
}

impl Default for FocusDuration {
    fn default() -> Self {
        Self(DEFAULT_FOCUS_MINUTES)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TimerState {
    /// Not started, or reset.
    #[default]
    Ready,
    Running,
    Paused,
    /// The countdown reached zero; waiting for the learner to report how
    /// many cards they got right.
    AwaitingCardCount,
    Complete,
}

impl Display for TimerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimerState::Ready => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::AwaitingCardCount => "awaiting card count",
            TimerState::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tick {
    Idle,
    Running { remaining_seconds: u32 },
    /// The countdown just reached zero.
    Finished,
}

/// A timed focus session: a countdown ticked once per second, plus the
/// monitor counting interruptions while it runs.
#[derive(Clone, Debug)]
pub struct FocusSession {
    duration: FocusDuration,
    remaining_seconds: u32,
    state: TimerState,
    paused_at: Option<Timestamp>,
    paused_seconds: i64,
    monitor: FocusMonitor,
}

impl FocusSession {
    pub fn new(duration: FocusDuration) -> Self {
        Self {
            duration,
            remaining_seconds: duration.as_seconds(),
            state: TimerState::Ready,
            paused_at: None,
            paused_seconds: 0,
            monitor: FocusMonitor::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> FocusDuration {
        self.duration
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.duration.as_seconds() - self.remaining_seconds
    }

    /// Total wall-clock time spent paused, in seconds.
    pub fn paused_seconds(&self) -> i64 {
        self.paused_seconds
    }

    pub fn interruptions(&self) -> u32 {
        self.monitor.interruptions()
    }

    /// Change the length of a session that has not started.
    pub fn set_duration(&mut self, duration: FocusDuration) -> Fallible<()> {
        if self.state != TimerState::Ready {
            return fail("cannot change the duration of a session in progress.");
        }
        self.duration = duration;
        self.remaining_seconds = duration.as_seconds();
        Ok(())
    }

    /// Start or resume the countdown.
    pub fn start(&mut self, now: Timestamp) -> Fallible<()> {
        match self.state {
            TimerState::Ready => {}
            TimerState::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.paused_seconds += now.seconds_since(paused_at).max(0);
                }
            }
            TimerState::Running => return Ok(()),
            TimerState::AwaitingCardCount | TimerState::Complete => {
                return fail("the session has already finished.");
            }
        }
        log::debug!("Focus session running, {}s left.", self.remaining_seconds);
        self.state = TimerState::Running;
        self.monitor.activate(now);
        Ok(())
    }

    pub fn pause(&mut self, now: Timestamp) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            self.paused_at = Some(now);
            self.monitor.deactivate();
        }
    }

    /// Discard the session and start over with the same duration.
    pub fn reset(&mut self) {
        log::debug!("Focus session reset.");
        *self = Self::new(self.duration);
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if self.state != TimerState::Running {
            return Tick::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Tick::Running {
                remaining_seconds: self.remaining_seconds,
            };
        }
        self.state = TimerState::AwaitingCardCount;
        self.monitor.deactivate();
        // The card-count prompt is a dialog.
        self.monitor.set_suspended(true);
        log::info!(
            "Focus session finished with {} interruptions.",
            self.interruptions()
        );
        Tick::Finished
    }

    /// Feed an attention signal to the session's monitor.
    pub fn observe(&mut self, signal: &FocusSignal) -> Option<Interruption> {
        self.monitor.observe(signal)
    }

    /// Call before showing a confirmation dialog, and again after it
    /// closes. Signals are not counted while a dialog is open.
    pub fn set_dialog_open(&mut self, open: bool) {
        self.monitor.set_suspended(open);
    }

    /// Close the session with the number of cards the learner got right.
    pub fn finish(&mut self, correct_cards: u32) -> Fallible<SessionOutcome> {
        if self.state != TimerState::AwaitingCardCount {
            return fail(format!("cannot finish a session that is {}.", self.state));
        }
        self.state = TimerState::Complete;
        self.monitor.set_suspended(false);
        Ok(SessionOutcome {
            kind: SessionKind::Focus,
            duration_minutes: self.elapsed_seconds() / 60,
            cards_studied: correct_cards,
            correct_cards,
            focus_interrupted: self.interruptions() > 0,
        })
    }
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new(FocusDuration::default())
    }
}
