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

use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub level: u32,
    pub name: &'static str,
    pub min_xp: u64,
}

/// The progression table, ascending by level and by XP threshold. The
/// first tier starts at 0 XP.
pub const TIERS: [Tier; 10] = [
    Tier { level: 1, name: "Kezdő Nyúl", min_xp: 0 },
    Tier { level: 2, name: "Okos Bagoly", min_xp: 100 },
    Tier { level: 3, name: "Gyors Gepárd", min_xp: 300 },
    Tier { level: 4, name: "Erős Medve", min_xp: 600 },
    Tier { level: 5, name: "Villám Nyúl", min_xp: 1000 },
    Tier { level: 6, name: "Bölcs Elefánt", min_xp: 1500 },
    Tier { level: 7, name: "Büszke Sas", min_xp: 2100 },
    Tier { level: 8, name: "Ravasz Róka", min_xp: 2800 },
    Tier { level: 9, name: "Hatalmas Oroszlán", min_xp: 3600 },
    Tier { level: 10, name: "Legendás Sárkány", min_xp: 4500 },
];

/// Where a given XP total sits in the progression.
#[derive(Clone, Copy, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStatus {
    pub xp: u64,
    pub tier: Tier,
    /// The threshold of the next tier. Absent at the top tier.
    pub next_min_xp: Option<u64>,
}

impl TierStatus {
    /// Fraction of the way from this tier to the next, in [0, 1]. `None` at
    /// the top tier.
    pub fn progress(&self) -> Option<f64> {
        let next = self.next_min_xp?;
        let span = next.saturating_sub(self.tier.min_xp);
        if span == 0 {
            return Some(1.0);
        }
        let done = self.xp.saturating_sub(self.tier.min_xp);
        Some((done as f64 / span as f64).clamp(0.0, 1.0))
    }

    /// XP still needed to reach the next tier. Zero at the top tier.
    pub fn xp_to_next(&self) -> u64 {
        self.next_min_xp
            .map(|next| next.saturating_sub(self.xp))
            .unwrap_or(0)
    }
}

/// The highest tier whose threshold is at most `xp`.
pub fn tier_for_xp(xp: u64) -> TierStatus {
    let index = TIERS
        .iter()
        .rposition(|tier| tier.min_xp <= xp)
        .unwrap_or(0);
    TierStatus {
        xp,
        tier: TIERS[index],
        next_min_xp: TIERS.get(index + 1).map(|tier| tier.min_xp),
    }
}

/// The new tier, if going from `before` to `after` XP crossed a threshold.
pub fn tier_advanced(before: u64, after: u64) -> Option<Tier> {
    let old = tier_for_xp(before).tier;
    let new = tier_for_xp(after).tier;
    if new.level > old.level { Some(new) } else { None }
}
