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

use clap::Parser;

use crate::cmd::add::add_card;
use crate::cmd::decks::list_decks;
use crate::cmd::delete::DeleteTarget;
use crate::cmd::delete::delete;
use crate::cmd::edit::edit_card;
use crate::cmd::export::export_collection;
use crate::cmd::focus::focus;
use crate::cmd::progress::ProgressFormat;
use crate::cmd::progress::print_progress;
use crate::cmd::settings::SettingsUpdate;
use crate::cmd::settings::update_settings;
use crate::cmd::study::study;
use crate::error::Fallible;
use crate::types::card_id::CardId;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Add a card to a deck.
    Add {
        /// Name of the deck.
        deck: String,
        /// The question side of the card.
        question: String,
        /// The answer side of the card.
        answer: String,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// List decks with card, due and mastery counts, or the cards of one deck.
    Decks {
        /// List the cards of this deck.
        deck: Option<String>,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Change the question or answer of a card.
    Edit {
        /// The card's ID.
        id: CardId,
        /// The new question.
        #[arg(long)]
        question: Option<String>,
        /// The new answer.
        #[arg(long)]
        answer: Option<String>,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Delete a card or a whole deck.
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Review the cards that most need it.
    Study {
        /// Only study this deck.
        #[arg(long)]
        deck: Option<String>,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Run a focus timer.
    Focus {
        /// Session length in minutes. Defaults to the stored setting.
        #[arg(long)]
        minutes: Option<u32>,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Show XP, level, and recent activity.
    Progress {
        /// Output format.
        #[arg(long, default_value_t = ProgressFormat::Text)]
        format: ProgressFormat,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Export cards and sessions as JSON.
    Export {
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Show or change preferences.
    Settings {
        #[command(flatten)]
        update: SettingsUpdate,
        /// Path to the data directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Add {
            deck,
            question,
            answer,
            directory,
        } => add_card(directory, deck, question, answer),
        Command::Decks { deck, directory } => list_decks(directory, deck),
        Command::Edit {
            id,
            question,
            answer,
            directory,
        } => edit_card(directory, id, question, answer),
        Command::Delete { target, directory } => delete(directory, target),
        Command::Study { deck, directory } => study(directory, deck),
        Command::Focus { minutes, directory } => focus(directory, minutes).await,
        Command::Progress { format, directory } => print_progress(directory, format),
        Command::Export { directory } => export_collection(directory),
        Command::Settings { update, directory } => update_settings(directory, update),
    }
}
