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

use serde::Serialize;

use crate::focus::signal::FocusSignal;
use crate::focus::signal::SignalKind;
use crate::types::timestamp::Timestamp;

/// Why a focus session was interrupted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interruption {
    Blur,
    Hidden,
    Idle,
}

/// Counts interruptions of a focus session.
///
/// Each signal type is a two-state machine (focused/blurred,
/// visible/hidden, active/idle). Entering the disengaged state counts one
/// interruption, but only while the session is active and not suspended.
/// A repeated disengaged signal without a recovery in between does not
/// count again.
#[derive(Clone, Debug, Default)]
pub struct FocusMonitor {
    active: bool,
    /// Set while a confirmation dialog is open. Opening a dialog blurs the
    /// window, which is not the user leaving.
    suspended: bool,
    interruptions: u32,
    blurred: bool,
    hidden: bool,
    idle: bool,
    last_activity: Option<Timestamp>,
}

impl FocusMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or resume counting. Disengagement seen while inactive is
    /// forgotten; the host re-reports any that is still in effect.
    pub fn activate(&mut self, now: Timestamp) {
        self.active = true;
        self.blurred = false;
        self.hidden = false;
        self.idle = false;
        self.last_activity = Some(now);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn interruptions(&self) -> u32 {
        self.interruptions
    }

    pub fn last_activity(&self) -> Option<Timestamp> {
        self.last_activity
    }

    /// Forget everything, including the interruption count.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed a signal. Returns the interruption it caused, if it was counted.
    pub fn observe(&mut self, signal: &FocusSignal) -> Option<Interruption> {
        let entered = match signal.kind {
            SignalKind::Blur => enter(&mut self.blurred).then_some(Interruption::Blur),
            SignalKind::Hidden => enter(&mut self.hidden).then_some(Interruption::Hidden),
            SignalKind::Idle => enter(&mut self.idle).then_some(Interruption::Idle),
            SignalKind::Focus => {
                self.blurred = false;
                None
            }
            SignalKind::Visible => {
                self.hidden = false;
                None
            }
            SignalKind::Active => {
                self.idle = false;
                self.last_activity = Some(signal.at);
                None
            }
        };
        let interruption = entered?;
        if !self.active || self.suspended {
            log::debug!("Ignoring {} signal.", signal.kind);
            return None;
        }
        self.interruptions += 1;
        log::info!(
            "Focus interrupted ({}), {} so far.",
            signal.kind,
            self.interruptions
        );
        Some(interruption)
    }
}

/// Move a flag into the set state. True if it was not set before.
fn enter(flag: &mut bool) -> bool {
    let entered = !*flag;
    *flag = true;
    entered
}
