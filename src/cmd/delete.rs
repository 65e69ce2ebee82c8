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

use std::io::BufRead;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use clap::Subcommand;

use crate::cmd::read_line;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::card_id::CardId;

#[derive(Subcommand, Clone, Debug)]
pub enum DeleteTarget {
    /// Delete one card.
    Card {
        /// The card's ID, as shown by `decks <DECK>`.
        id: CardId,
    },
    /// Delete a deck and all of its cards.
    Deck {
        name: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

pub fn delete(directory: Option<String>, target: DeleteTarget) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    remove(&coll, target, &mut stdin().lock(), &mut stdout())
}

fn remove(
    coll: &Collection,
    target: DeleteTarget,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    match target {
        DeleteTarget::Card { id } => {
            coll.db.delete_card(id)?;
            writeln!(output, "Deleted card {id}.")?;
        }
        DeleteTarget::Deck { name, yes } => {
            let count = coll.db.cards(Some(&name))?.len();
            if count == 0 {
                return fail(format!("no deck named {name}."));
            }
            if !yes {
                write!(output, "Delete deck {name} and its {count} cards? [y/N] ")?;
                output.flush()?;
                let answer = read_line(input)?.unwrap_or_default();
                if !answer.eq_ignore_ascii_case("y") {
                    writeln!(output, "Nothing deleted.")?;
                    return Ok(());
                }
            }
            let deleted = coll.db.delete_deck(&name)?;
            writeln!(output, "Deleted deck {name} ({deleted} cards).")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::tempdir;

    use super::*;
    use crate::types::timestamp::Timestamp;

    fn collection_with_cards() -> Fallible<(tempfile::TempDir, Collection)> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let now = Timestamp::now();
        coll.db.add_card("Chemistry", "Symbol for gold?", "Au", now)?;
        coll.db.add_card("Chemistry", "Symbol for iron?", "Fe", now)?;
        coll.db.add_card("Geography", "Capital of Peru?", "Lima", now)?;
        Ok((dir, coll))
    }

    #[test]
    fn test_delete_card() -> Fallible<()> {
        let (_dir, coll) = collection_with_cards()?;
        let id = coll.db.cards(Some("Geography"))?[0].id;
        let mut output = Vec::new();
        remove(&coll, DeleteTarget::Card { id }, &mut Cursor::new(""), &mut output)?;
        assert!(coll.db.cards(Some("Geography"))?.is_empty());
        assert_eq!(String::from_utf8_lossy(&output), format!("Deleted card {id}.\n"));
        let again = remove(&coll, DeleteTarget::Card { id }, &mut Cursor::new(""), &mut output);
        assert!(again.is_err());
        Ok(())
    }

    #[test]
    fn test_delete_deck_asks_first() -> Fallible<()> {
        let (_dir, coll) = collection_with_cards()?;
        let target = DeleteTarget::Deck {
            name: "Chemistry".to_string(),
            yes: false,
        };
        let mut output = Vec::new();
        remove(&coll, target.clone(), &mut Cursor::new("n\n"), &mut output)?;
        assert_eq!(coll.db.cards(Some("Chemistry"))?.len(), 2);
        remove(&coll, target, &mut Cursor::new("y\n"), &mut output)?;
        assert!(coll.db.cards(Some("Chemistry"))?.is_empty());
        assert_eq!(coll.db.cards(None)?.len(), 1);
        let text = String::from_utf8_lossy(&output);
        assert!(text.contains("Delete deck Chemistry and its 2 cards? [y/N]"));
        assert!(text.contains("Nothing deleted."));
        assert!(text.contains("Deleted deck Chemistry (2 cards)."));
        Ok(())
    }

    #[test]
    fn test_delete_missing_deck() -> Fallible<()> {
        let (_dir, coll) = collection_with_cards()?;
        let target = DeleteTarget::Deck {
            name: "Physics".to_string(),
            yes: true,
        };
        assert!(remove(&coll, target, &mut Cursor::new(""), &mut Vec::new()).is_err());
        assert_eq!(coll.db.cards(None)?.len(), 3);
        Ok(())
    }
}
