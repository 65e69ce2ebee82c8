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

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::progression::TIERS;
use crate::progression::TierStatus;
use crate::progression::tier_for_xp;
use crate::stats::Achievement;
use crate::stats::DayActivity;
use crate::stats::DeckSummary;
use crate::stats::WeeklyStats;
use crate::stats::achievements;
use crate::stats::daily_minutes;
use crate::stats::deck_summaries;
use crate::stats::study_streak;
use crate::stats::weekly_stats;
use crate::types::card::Card;
use crate::types::session_record::SessionRecord;
use crate::types::timestamp::Timestamp;

/// Number of sessions listed as recent activity.
const RECENT_SESSIONS: usize = 5;

/// Width of the longest bar in the daily activity chart.
const BAR_WIDTH: u64 = 20;

#[derive(ValueEnum, Clone)]
pub enum ProgressFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for ProgressFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressFormat::Text => write!(f, "text"),
            ProgressFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    status: TierStatus,
    /// Percent of the way to the next tier. Absent at the top tier.
    progress_percent: Option<f64>,
    xp_to_next: u64,
    weekly: WeeklyStats,
    streak: u32,
    daily: Vec<DayActivity>,
    achievements: Vec<Achievement>,
    decks: Vec<DeckProgress>,
    recent_sessions: Vec<SessionRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckProgress {
    #[serde(flatten)]
    summary: DeckSummary,
    mastery_percent: u32,
}

pub fn print_progress(directory: Option<String>, format: ProgressFormat) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let xp = coll.db.xp(&coll.user_id)?;
    let sessions = coll.db.sessions(&coll.user_id)?;
    let cards = coll.db.cards(None)?;
    let progress = build_progress(xp, sessions, &cards, Timestamp::now());
    match format {
        ProgressFormat::Text => print!("{}", render_text(&progress)),
        ProgressFormat::Json => {
            let json = serde_json::to_string_pretty(&progress)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn build_progress(
    xp: u64,
    mut sessions: Vec<SessionRecord>,
    cards: &[Card],
    now: Timestamp,
) -> Progress {
    let today: NaiveDate = now.local_date();
    let status = tier_for_xp(xp);
    let weekly = weekly_stats(&sessions, today);
    let streak = study_streak(&sessions, today);
    let daily = daily_minutes(&sessions, today);
    let achievements = achievements(&sessions, today);
    let decks = deck_summaries(cards, now)
        .into_iter()
        .map(|summary| DeckProgress {
            mastery_percent: summary.mastery_percent(),
            summary,
        })
        .collect();
    sessions.truncate(RECENT_SESSIONS);
    Progress {
        status,
        progress_percent: status.progress().map(|p| p * 100.0),
        xp_to_next: status.xp_to_next(),
        weekly,
        streak,
        daily,
        achievements,
        decks,
        recent_sessions: sessions,
    }
}

fn render_text(progress: &Progress) -> String {
    let status = &progress.status;
    let mut out = String::new();
    out.push_str(&format!(
        "Level {} ({}) with {} XP\n",
        status.tier.level, status.tier.name, status.xp
    ));
    match progress.progress_percent {
        Some(percent) => out.push_str(&format!(
            "{percent:.0}% of the way to level {}, {} XP to go\n",
            status.tier.level + 1,
            progress.xp_to_next
        )),
        None => out.push_str("Top level reached\n"),
    }
    out.push_str(&format!(
        "This week: {} minutes, {} cards, {} focus sessions, {} XP\n",
        progress.weekly.total_minutes,
        progress.weekly.cards_studied,
        progress.weekly.focus_sessions,
        progress.weekly.total_xp
    ));
    out.push_str(&format!("Streak: {} days\n", progress.streak));
    let busiest = progress
        .daily
        .iter()
        .map(|day| day.minutes)
        .max()
        .unwrap_or(0)
        .max(1);
    for day in &progress.daily {
        let bar = "#".repeat((day.minutes * BAR_WIDTH / busiest) as usize);
        out.push_str(&format!(
            "{} {bar:<20} {} min\n",
            day.date.format("%a %m-%d"),
            day.minutes
        ));
    }
    for deck in &progress.decks {
        out.push_str(&format!(
            "{}: {}% mastered ({} of {} cards)\n",
            deck.summary.deck_name,
            deck.mastery_percent,
            deck.summary.mastered_count,
            deck.summary.card_count
        ));
    }
    for achievement in &progress.achievements {
        let mark = if achievement.earned { "*" } else { " " };
        out.push_str(&format!(
            "({mark}) {}: {}\n",
            achievement.name, achievement.description
        ));
    }
    for tier in TIERS {
        let mark = if status.xp >= tier.min_xp { "x" } else { " " };
        out.push_str(&format!(
            "[{mark}] {:>2} {} ({} XP)\n",
            tier.level, tier.name, tier.min_xp
        ));
    }
    out
}
