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

pub mod add;
pub mod decks;
pub mod delete;
pub mod edit;
pub mod export;
pub mod focus;
pub mod progress;
pub mod settings;
pub mod study;

use std::io::BufRead;
use std::io::Write;

use crate::error::Fallible;
use crate::session::Completion;

/// Read one trimmed line. `None` at end of input.
pub(crate) fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub(crate) fn print_completion(output: &mut impl Write, completion: &Completion) -> Fallible<()> {
    writeln!(output, "+{} XP (total {}).", completion.record.xp_earned, completion.total_xp)?;
    if let Some(tier) = completion.level_up {
        writeln!(output, "New level {}: {}!", tier.level, tier.name)?;
    }
    Ok(())
}
