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

use std::fs::read_to_string;
use std::fs::write;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::focus::timer::DEFAULT_FOCUS_MINUTES;
use crate::focus::timer::FocusDuration;
use crate::prioritize::DECK_SESSION_CAP;
use crate::prioritize::SHORT_SESSION_CAP;
use crate::scheduler::DifficultyPreference;

pub const SETTINGS_FILE: &str = "settings.toml";

/// User preferences. These survive restarts; everything else about a
/// session does not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// How quickly review intervals grow.
    pub card_difficulty: DifficultyPreference,
    /// Whether to warn when focus is interrupted.
    pub focus_alerts: bool,
    /// Whether a stretch without input counts as an interruption.
    pub idle_detection: bool,
    /// Seconds without input before the learner counts as idle.
    pub idle_threshold_secs: u64,
    /// Cards in a review session across all decks.
    pub short_session_cap: usize,
    /// Cards in a review session of a single deck.
    pub deck_session_cap: usize,
    /// Default length of a focus session, in minutes.
    pub focus_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            card_difficulty: DifficultyPreference::Medium,
            focus_alerts: true,
            idle_detection: false,
            idle_threshold_secs: 10,
            short_session_cap: SHORT_SESSION_CAP,
            deck_session_cap: DECK_SESSION_CAP,
            focus_minutes: DEFAULT_FOCUS_MINUTES,
        }
    }
}

impl Settings {
    /// Load `settings.toml` from the directory, or the defaults if there is
    /// none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(SETTINGS_FILE);
        if !path.exists() {
            log::debug!("No settings file, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, directory: &Path) -> Fallible<()> {
        self.validate()?;
        let content = toml::to_string(self)?;
        write(directory.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    pub fn focus_duration(&self) -> Fallible<FocusDuration> {
        FocusDuration::minutes(self.focus_minutes)
    }

    pub fn session_cap(&self, single_deck: bool) -> usize {
        if single_deck {
            self.deck_session_cap
        } else {
            self.short_session_cap
        }
    }

    fn validate(&self) -> Fallible<()> {
        if self.idle_threshold_secs == 0 {
            return fail("idle-threshold-secs must be positive.");
        }
        if self.short_session_cap == 0 || self.deck_session_cap == 0 {
            return fail("session caps must be positive.");
        }
        self.focus_duration()?;
        Ok(())
    }
}
