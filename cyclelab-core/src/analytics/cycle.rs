//! Four-year election-cycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the US presidential cycle a calendar year falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CyclePhase {
    PostElection,
    Midterm,
    PreElection,
    Election,
}

impl CyclePhase {
    pub const ALL: [CyclePhase; 4] = [
        CyclePhase::PostElection,
        CyclePhase::Midterm,
        CyclePhase::PreElection,
        CyclePhase::Election,
    ];

    /// Phase for `year`. Years divisible by four are election years.
    pub fn of_year(year: i32) -> Self {
        match year.rem_euclid(4) {
            1 => CyclePhase::PostElection,
            2 => CyclePhase::Midterm,
            3 => CyclePhase::PreElection,
            _ => CyclePhase::Election,
        }
    }

    /// 1-based position within the cycle.
    pub fn ordinal(self) -> u8 {
        match self {
            CyclePhase::PostElection => 1,
            CyclePhase::Midterm => 2,
            CyclePhase::PreElection => 3,
            CyclePhase::Election => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CyclePhase::PostElection => "Year 1: Post-Election",
            CyclePhase::Midterm => "Year 2: Midterm",
            CyclePhase::PreElection => "Year 3: Pre-Election",
            CyclePhase::Election => "Year 4: Election",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shorthand for [`CyclePhase::of_year`].
pub fn cycle(year: i32) -> CyclePhase {
    CyclePhase::of_year(year)
}
