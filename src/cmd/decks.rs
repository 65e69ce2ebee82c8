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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::stats::deck_summaries;
use crate::types::timestamp::Timestamp;

pub fn list_decks(directory: Option<String>, deck: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    print!("{}", render_decks(&coll, deck.as_deref(), Timestamp::now())?);
    Ok(())
}

/// Without a deck, one line per deck. With one, that deck's cards.
fn render_decks(coll: &Collection, deck: Option<&str>, now: Timestamp) -> Fallible<String> {
    let cards = coll.db.cards(deck)?;
    let mut out = String::new();
    match deck {
        None => {
            if cards.is_empty() {
                out.push_str("No decks yet. Add a card to start one.\n");
            }
            for summary in deck_summaries(&cards, now) {
                out.push_str(&format!(
                    "{}: {} cards, {} due, {}% mastered\n",
                    summary.deck_name,
                    summary.card_count,
                    summary.due_count,
                    summary.mastery_percent()
                ));
            }
        }
        Some(deck) => {
            if cards.is_empty() {
                return fail(format!("no deck named {deck}."));
            }
            for card in &cards {
                let due = if card.is_due(now) { " (due)" } else { "" };
                out.push_str(&format!(
                    "{} {} => {}{due}\n",
                    card.id, card.question, card.answer
                ));
            }
        }
    }
    Ok(out)
}
