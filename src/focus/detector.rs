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

use std::time::Duration;

use crate::focus::signal::FocusSignal;
use crate::focus::signal::Listener;
use crate::focus::signal::SignalBus;
use crate::focus::signal::SignalKind;
use crate::focus::signal::SignalSource;
use crate::focus::signal::Subscription;
use crate::types::timestamp::Timestamp;

pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(10);

/// The attention signals the host environment is able to report.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Capabilities {
    pub window_focus: bool,
    pub visibility: bool,
    pub idle: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            window_focus: true,
            visibility: true,
            idle: true,
        }
    }

    pub fn none() -> Self {
        Self {
            window_focus: false,
            visibility: false,
            idle: false,
        }
    }
}

/// Turns raw host events into focus signals.
///
/// The host reports window focus changes, visibility changes, and
/// qualifying input (pointer, key, scroll, touch), and calls [`tick`]
/// periodically. Signals the host cannot report are never emitted.
///
/// [`tick`]: ActivityDetector::tick
pub struct ActivityDetector {
    bus: SignalBus,
    capabilities: Capabilities,
    idle_threshold: Duration,
    last_activity: Timestamp,
    idle: bool,
    focused: bool,
    visible: bool,
}

impl ActivityDetector {
    pub fn new(capabilities: Capabilities, idle_threshold: Duration, now: Timestamp) -> Self {
        if !capabilities.idle {
            log::debug!("Idle detection unavailable.");
        }
        Self {
            bus: SignalBus::new(),
            capabilities,
            idle_threshold,
            last_activity: now,
            idle: false,
            focused: true,
            visible: true,
        }
    }

    pub fn window_focused(&mut self, now: Timestamp) {
        if self.capabilities.window_focus && !self.focused {
            self.focused = true;
            self.emit(SignalKind::Focus, now);
        }
    }

    pub fn window_blurred(&mut self, now: Timestamp) {
        if self.capabilities.window_focus && self.focused {
            self.focused = false;
            self.emit(SignalKind::Blur, now);
        }
    }

    pub fn visibility_changed(&mut self, hidden: bool, now: Timestamp) {
        if !self.capabilities.visibility || self.visible == !hidden {
            return;
        }
        self.visible = !hidden;
        let kind = if hidden {
            SignalKind::Hidden
        } else {
            SignalKind::Visible
        };
        self.emit(kind, now);
    }

    /// Qualifying user input. Leaves the idle state, if in it.
    pub fn input(&mut self, now: Timestamp) {
        self.last_activity = now;
        if self.idle {
            self.idle = false;
            self.emit(SignalKind::Active, now);
        }
    }

    /// Advance the clock. Enters the idle state once the threshold passes
    /// without input; stays there until the next input.
    pub fn tick(&mut self, now: Timestamp) {
        if !self.capabilities.idle || self.idle {
            return;
        }
        let threshold = i64::try_from(self.idle_threshold.as_millis()).unwrap_or(i64::MAX);
        if now.millis_since(self.last_activity) >= threshold {
            self.idle = true;
            self.emit(SignalKind::Idle, now);
        }
    }

    /// False while the window is blurred or hidden.
    pub fn is_currently_focused(&self) -> bool {
        self.focused && self.visible
    }

    fn emit(&mut self, kind: SignalKind, at: Timestamp) {
        self.bus.publish(FocusSignal::new(kind, at));
    }
}

impl SignalSource for ActivityDetector {
    fn subscribe(&mut self, listener: Listener) -> Subscription {
        self.bus.subscribe(listener)
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.bus.unsubscribe(subscription)
    }
}
