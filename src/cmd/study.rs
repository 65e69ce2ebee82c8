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

use crate::cmd::print_completion;
use crate::cmd::read_line;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::session::Completion;
use crate::session::SessionContext;
use crate::session::complete_session;
use crate::types::timestamp::Timestamp;

pub fn study(directory: Option<String>, deck: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let mut input = stdin().lock();
    let mut output = stdout();
    run_study(&coll, deck.as_deref(), &mut input, &mut output)?;
    Ok(())
}

enum Answer {
    Correct,
    Incorrect,
    Quit,
}

/// Review the most urgent cards. Cards not yet due fill the session up to
/// its cap, but only if at least one card is due.
///
/// Each answer is saved as it is given. The session itself is only
/// recorded, and XP only awarded, once every card in it was answered.
pub(crate) fn run_study(
    coll: &Collection,
    deck: Option<&str>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<Option<Completion>> {
    let now = Timestamp::now();
    let pool = coll.db.cards(deck)?;
    if !pool.iter().any(|card| card.is_due(now)) {
        writeln!(output, "No cards due.")?;
        return Ok(None);
    }
    let mut context = SessionContext::new(coll.settings.clone());
    context.start_review(pool, now, deck.is_some());
    review_cards(coll, &mut context, input, output)?;

    let session = match context.take_review() {
        Some(session) if session.is_finished() => session,
        _ => {
            context.reset();
            writeln!(output, "Session abandoned. No XP awarded.")?;
            return Ok(None);
        }
    };
    writeln!(
        output,
        "Session complete: {} correct, {} incorrect.",
        session.correct(),
        session.incorrect()
    )?;
    let outcome = session.outcome(Timestamp::now());
    let completion = complete_session(&coll.db, &coll.user_id, &outcome, Timestamp::now())?;
    print_completion(output, &completion)?;
    Ok(Some(completion))
}

/// Ask each card of the context's review session until it is finished or
/// the learner quits.
fn review_cards(
    coll: &Collection,
    context: &mut SessionContext,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Fallible<()> {
    let preference = context.settings().card_difficulty;
    let Some(session) = context.review_mut() else {
        return Ok(());
    };
    let total = session.cards().len();
    while let Some(card) = session.current() {
        writeln!(output, "[{}/{}] {}", session.position() + 1, total, card.deck_name)?;
        writeln!(output, "Q: {}", card.question)?;
        writeln!(output, "[press enter to reveal, q to stop]")?;
        output.flush()?;
        match read_line(input)? {
            None => break,
            Some(line) if line == "q" => break,
            Some(_) => {}
        }
        writeln!(output, "A: {}", card.answer)?;
        let correct = match read_answer(input, output)? {
            Answer::Correct => true,
            Answer::Incorrect => false,
            Answer::Quit => break,
        };
        if let Some(answered) = session.answer(correct, preference, Timestamp::now()) {
            coll.db.update_card(&answered.card)?;
            writeln!(
                output,
                "Next review in {} days.",
                answered.schedule.next_interval_days
            )?;
        }
    }
    Ok(())
}

fn read_answer(input: &mut impl BufRead, output: &mut impl Write) -> Fallible<Answer> {
    loop {
        writeln!(output, "Did you know it? [y/n]")?;
        output.flush()?;
        match read_line(input)?.as_deref() {
            None | Some("q") => return Ok(Answer::Quit),
            Some("y") => return Ok(Answer::Correct),
            Some("n") => return Ok(Answer::Incorrect),
            Some(_) => writeln!(output, "Please answer y or n.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::tempdir;

    use super::*;
    use crate::types::session_record::SessionKind;

    fn collection() -> Fallible<(tempfile::TempDir, Collection)> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        Ok((dir, coll))
    }

    #[test]
    fn test_no_cards_due() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        let mut output = Vec::new();
        let result = run_study(&coll, None, &mut Cursor::new(""), &mut output)?;
        assert!(result.is_none());
        assert!(String::from_utf8_lossy(&output).contains("No cards due."));
        Ok(())
    }

    #[test]
    fn test_session() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        let now = Timestamp::now();
        let a = coll.db.add_card("Spanish", "dog", "perro", now)?;
        let b = coll.db.add_card("Spanish", "cat", "gato", now)?;
        let mut input = Cursor::new("\ny\n\nmaybe\nn\n");
        let mut output = Vec::new();
        let completion = run_study(&coll, Some("Spanish"), &mut input, &mut output)?;
        let completion = completion.expect("session should complete");
        assert_eq!(completion.record.kind, SessionKind::Cards);
        assert_eq!(completion.record.cards_studied, 2);
        assert_eq!(completion.record.correct_cards, 1);
        assert_eq!(completion.record.xp_earned, 5);
        assert_eq!(coll.db.xp(&coll.user_id)?, 5);
        let a = coll.db.get_card(a.id)?;
        let b = coll.db.get_card(b.id)?;
        assert_eq!(a.review.correct_count, 1);
        assert_eq!(b.review.incorrect_count, 1);
        assert_eq!(b.review.difficulty.value(), 1.5);
        let text = String::from_utf8_lossy(&output);
        assert!(text.contains("Please answer y or n."));
        Ok(())
    }

    #[test]
    fn test_quitting_midway_awards_nothing() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        let now = Timestamp::now();
        for i in 0..5 {
            coll.db.add_card("Spanish", &format!("word {i}"), "palabra", now)?;
        }
        let mut output = Vec::new();
        let result = run_study(&coll, None, &mut Cursor::new("\ny\nq\n"), &mut output)?;
        assert!(result.is_none());
        assert_eq!(coll.db.xp(&coll.user_id)?, 0);
        assert!(coll.db.sessions(&coll.user_id)?.is_empty());
        // The answer given before quitting is kept.
        let answered: u32 = coll
            .db
            .cards(None)?
            .iter()
            .map(|card| card.review.correct_count)
            .sum();
        assert_eq!(answered, 1);
        assert!(String::from_utf8_lossy(&output).contains("Session abandoned."));
        Ok(())
    }

    #[test]
    fn test_quit_before_answering() -> Fallible<()> {
        let (_dir, coll) = collection()?;
        coll.db.add_card("Spanish", "dog", "perro", Timestamp::now())?;
        let mut output = Vec::new();
        let result = run_study(&coll, None, &mut Cursor::new("q\n"), &mut output)?;
        assert!(result.is_none());
        assert_eq!(coll.db.xp(&coll.user_id)?, 0);
        assert!(coll.db.sessions(&coll.user_id)?.is_empty());
        Ok(())
    }
}
