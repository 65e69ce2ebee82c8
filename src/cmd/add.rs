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
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

pub fn add_card(
    directory: Option<String>,
    deck: String,
    question: String,
    answer: String,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let card = insert_card(&coll, &deck, &question, &answer)?;
    println!("Added card {} to {}.", card.id, card.deck_name);
    Ok(())
}

fn insert_card(coll: &Collection, deck: &str, question: &str, answer: &str) -> Fallible<Card> {
    let deck = deck.trim();
    let question = question.trim();
    let answer = answer.trim();
    if deck.is_empty() || question.is_empty() || answer.is_empty() {
        return fail("deck, question, and answer must not be empty.");
    }
    coll.db.add_card(deck, question, answer, Timestamp::now())
}
