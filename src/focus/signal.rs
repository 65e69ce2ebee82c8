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

use serde::Serialize;

use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// The window lost focus.
    Blur,
    /// The window regained focus.
    Focus,
    /// No input for the idle threshold.
    Idle,
    /// Input after being idle.
    Active,
    /// The page became visible.
    Visible,
    /// The page was hidden.
    Hidden,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Blur => "blur",
            SignalKind::Focus => "focus",
            SignalKind::Idle => "idle",
            SignalKind::Active => "active",
            SignalKind::Visible => "visible",
            SignalKind::Hidden => "hidden",
        }
    }
}

impl Display for SignalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct FocusSignal {
    pub kind: SignalKind,
    pub at: Timestamp,
}

impl FocusSignal {
    pub fn new(kind: SignalKind, at: Timestamp) -> Self {
        Self { kind, at }
    }
}

/// Handle returned by [`SignalSource::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Subscription(u64);

pub type Listener = Box<dyn FnMut(&FocusSignal) + Send>;

/// Anything that emits focus signals to subscribers.
pub trait SignalSource {
    fn subscribe(&mut self, listener: Listener) -> Subscription;

    /// Returns false if the subscription was already gone.
    fn unsubscribe(&mut self, subscription: Subscription) -> bool;
}

/// Fan-out of focus signals to any number of listeners, in subscription
/// order.
#[derive(Default)]
pub struct SignalBus {
    next_id: u64,
    listeners: Vec<(Subscription, Listener)>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, signal: FocusSignal) {
        log::debug!("focus signal: {} at {}", signal.kind, signal.at);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&signal);
        }
    }
}

impl SignalSource for SignalBus {
    fn subscribe(&mut self, listener: Listener) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((subscription, listener));
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }
}
