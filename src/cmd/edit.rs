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
use crate::types::card_id::CardId;

pub fn edit_card(
    directory: Option<String>,
    id: CardId,
    question: Option<String>,
    answer: Option<String>,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let card = apply_edit(&coll, id, question.as_deref(), answer.as_deref())?;
    println!("Updated card {}: {} => {}", card.id, card.question, card.answer);
    Ok(())
}

/// Change the given sides of a card. Scheduling is untouched.
fn apply_edit(
    coll: &Collection,
    id: CardId,
    question: Option<&str>,
    answer: Option<&str>,
) -> Fallible<Card> {
    if question.is_none() && answer.is_none() {
        return fail("nothing to change: pass --question or --answer.");
    }
    let card = coll.db.get_card(id)?;
    let question = question.map(str::trim).unwrap_or(&card.question);
    let answer = answer.map(str::trim).unwrap_or(&card.answer);
    if question.is_empty() || answer.is_empty() {
        return fail("question and answer must not be empty.");
    }
    coll.db.edit_card(id, question, answer)?;
    coll.db.get_card(id)
}
