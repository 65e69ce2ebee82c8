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

//! Experience points.
//!
//! XP is awarded once per completed session, and this is the only place it
//! is computed. Stores must apply the award as an atomic increment of the
//! stored total.

const XP_PER_FOCUS_MINUTE: u64 = 2;

const XP_PER_CORRECT_CARD: u64 = 5;

/// Share of the award kept when focus was interrupted, in percent.
const INTERRUPTED_SHARE_PERCENT: u64 = 70;

/// The XP earned by a completed session.
///
/// An interrupted session keeps 70% of its award, rounded down.
pub fn calculate_xp(focus_minutes: u32, correct_cards: u32, focus_interrupted: bool) -> u64 {
    let xp = u64::from(focus_minutes) * XP_PER_FOCUS_MINUTE
        + u64::from(correct_cards) * XP_PER_CORRECT_CARD;
    if focus_interrupted {
        xp * INTERRUPTED_SHARE_PERCENT / 100
    } else {
        xp
    }
}
