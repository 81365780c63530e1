//! Trading day phases.

use chrono::NaiveTime;
use std::fmt;
use tracing::info;

/// Coarse position of the wall clock within a trading day. Ordered: a
/// session only ever moves forward through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayPhase {
    Morning,
    MorningTransition,
    Day,
    EveningTransition,
    Evening,
    Night,
}

impl DayPhase {
    /// Phases in which new positions may be opened.
    pub fn allows_buy(self) -> bool {
        matches!(self, DayPhase::MorningTransition | DayPhase::Day)
    }

    /// Phases in which the session talks to the broker at all.
    pub fn is_trading(self) -> bool {
        matches!(
            self,
            DayPhase::MorningTransition | DayPhase::Day | DayPhase::Evening
        )
    }
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DayPhase::Morning => "morning",
            DayPhase::MorningTransition => "morning_transition",
            DayPhase::Day => "day",
            DayPhase::EveningTransition => "evening_transition",
            DayPhase::Evening => "evening",
            DayPhase::Night => "night",
        })
    }
}

/// Start times of every phase after `Morning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimes {
    pub morning_transition: NaiveTime,
    pub day: NaiveTime,
    pub evening_transition: NaiveTime,
    pub evening: NaiveTime,
    pub night: NaiveTime,
}

impl Default for SessionTimes {
    fn default() -> Self {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Self {
            morning_transition: hm(9, 0),
            day: hm(10, 0),
            evening_transition: hm(17, 15),
            evening: hm(17, 20),
            night: hm(17, 25),
        }
    }
}

impl SessionTimes {
    fn boundaries(&self) -> [(NaiveTime, DayPhase); 5] {
        [
            (self.morning_transition, DayPhase::MorningTransition),
            (self.day, DayPhase::Day),
            (self.evening_transition, DayPhase::EveningTransition),
            (self.evening, DayPhase::Evening),
            (self.night, DayPhase::Night),
        ]
    }

    /// Boundaries strictly increase.
    pub fn is_ordered(&self) -> bool {
        self.boundaries().windows(2).all(|w| w[0].0 < w[1].0)
    }

    pub fn phase_at(&self, time: NaiveTime) -> DayPhase {
        self.boundaries()
            .iter()
            .rev()
            .find(|(start, _)| time >= *start)
            .map_or(DayPhase::Morning, |&(_, phase)| phase)
    }
}

/// The phase of one session, advanced from the wall clock.
#[derive(Debug, Clone)]
pub struct DayClock {
    times: SessionTimes,
    phase: DayPhase,
}

impl DayClock {
    pub fn new(times: SessionTimes) -> Self {
        Self {
            times,
            phase: DayPhase::Morning,
        }
    }

    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    /// Move to the phase of `now` if it lies ahead; never moves back.
    pub fn update(&mut self, now: NaiveTime) -> DayPhase {
        let next = self.times.phase_at(now);
        if next > self.phase {
            info!(from = %self.phase, to = %next, "day phase changed");
            self.phase = next;
        }
        self.phase
    }
}
