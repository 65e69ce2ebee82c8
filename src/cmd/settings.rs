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

use clap::Args;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::scheduler::DifficultyPreference;
use crate::settings::Settings;

/// Changes to the stored preferences. Unset fields are left alone.
#[derive(Args, Clone, Debug, Default)]
pub struct SettingsUpdate {
    /// How quickly review intervals grow.
    #[arg(long)]
    pub card_difficulty: Option<DifficultyPreference>,
    /// Default focus session length, in minutes.
    #[arg(long)]
    pub focus_minutes: Option<u32>,
    /// Warn when focus is interrupted.
    #[arg(long)]
    pub focus_alerts: Option<bool>,
    /// Count a stretch without key input as an interruption.
    #[arg(long)]
    pub idle_detection: Option<bool>,
    /// Seconds without input before counting as idle.
    #[arg(long)]
    pub idle_threshold_secs: Option<u64>,
    /// Cards per session across all decks.
    #[arg(long)]
    pub short_session_cap: Option<usize>,
    /// Cards per session of a single deck.
    #[arg(long)]
    pub deck_session_cap: Option<usize>,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        self.card_difficulty.is_none()
            && self.focus_minutes.is_none()
            && self.focus_alerts.is_none()
            && self.idle_detection.is_none()
            && self.idle_threshold_secs.is_none()
            && self.short_session_cap.is_none()
            && self.deck_session_cap.is_none()
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(value) = self.card_difficulty {
            settings.card_difficulty = value;
        }
        if let Some(value) = self.focus_minutes {
            settings.focus_minutes = value;
        }
        if let Some(value) = self.focus_alerts {
            settings.focus_alerts = value;
        }
        if let Some(value) = self.idle_detection {
            settings.idle_detection = value;
        }
        if let Some(value) = self.idle_threshold_secs {
            settings.idle_threshold_secs = value;
        }
        if let Some(value) = self.short_session_cap {
            settings.short_session_cap = value;
        }
        if let Some(value) = self.deck_session_cap {
            settings.deck_session_cap = value;
        }
    }
}

pub fn update_settings(directory: Option<String>, update: SettingsUpdate) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    if !update.is_empty() {
        update.apply(&mut coll.settings);
        coll.settings.save(&coll.directory)?;
        log::info!("Saved settings to {}.", coll.directory.display());
    }
    print!("{}", toml::to_string(&coll.settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_update_persists() -> Fallible<()> {
        let dir = tempdir()?;
        let directory = dir.path().display().to_string();
        let update = SettingsUpdate {
            card_difficulty: Some(DifficultyPreference::Hard),
            focus_minutes: Some(45),
            ..SettingsUpdate::default()
        };
        update_settings(Some(directory.clone()), update)?;
        let coll = Collection::new(Some(directory))?;
        assert_eq!(coll.settings.card_difficulty, DifficultyPreference::Hard);
        assert_eq!(coll.settings.focus_minutes, 45);
        assert!(coll.settings.focus_alerts);
        Ok(())
    }

    #[test]
    fn test_invalid_update_is_rejected() -> Fallible<()> {
        let dir = tempdir()?;
        let directory = dir.path().display().to_string();
        let update = SettingsUpdate {
            focus_minutes: Some(500),
            ..SettingsUpdate::default()
        };
        assert!(update_settings(Some(directory.clone()), update).is_err());
        let coll = Collection::new(Some(directory))?;
        assert_eq!(coll.settings, Settings::default());
        Ok(())
    }
}
