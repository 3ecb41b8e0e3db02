//! Human-readable explanation of how an occurrence differs from its original.

use std::fmt;

use chrono::NaiveTime;

use super::Occurrence;

/// One independently testable part of an occurrence's reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonClause {
    NewDate,
    StartsEarlier(NaiveTime),
    StartsLater(NaiveTime),
    EndsEarlier(NaiveTime),
    EndsLater(NaiveTime),
}

impl fmt::Display for ReasonClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonClause::NewDate => write!(f, "new date"),
            ReasonClause::StartsEarlier(t) => write!(f, "starts earlier at {}", t.format("%H:%M")),
            ReasonClause::StartsLater(t) => write!(f, "starts later at {}", t.format("%H:%M")),
            ReasonClause::EndsEarlier(t) => write!(f, "ends earlier at {}", t.format("%H:%M")),
            ReasonClause::EndsLater(t) => write!(f, "ends later at {}", t.format("%H:%M")),
        }
    }
}

impl Occurrence {
    /// Timing clauses describing how the varied times differ from the unvaried ones.
    ///
    /// Earlier/later compare the time of day only, even when the date changed too.
    pub fn reason_clauses(&self) -> Vec<ReasonClause> {
        let mut clauses = Vec::new();

        if self.varied_start_date != self.unvaried_start_date {
            clauses.push(ReasonClause::NewDate);
        }

        let (varied, unvaried) = (self.start_time(), self.unvaried_start_time);
        if varied < unvaried {
            clauses.push(ReasonClause::StartsEarlier(varied));
        } else if varied > unvaried {
            clauses.push(ReasonClause::StartsLater(varied));
        }

        // Point occurrences carry no end time on either side and get no end clause
        if self.varied_end_time.is_none() && self.unvaried_end_time.is_none() {
            return clauses;
        }

        let (varied, unvaried) = (self.end_time(), self.unvaried_end().time());
        if varied < unvaried {
            clauses.push(ReasonClause::EndsEarlier(varied));
        } else if varied > unvaried {
            clauses.push(ReasonClause::EndsLater(varied));
        }

        clauses
    }

    /// Why this occurrence differs from its original.
    ///
    /// A linked variation's reason wins, then cancellation, then the timing
    /// clauses joined with ", ". Empty when nothing applies.
    pub fn reason(&self) -> String {
        if let Some(variation) = self.varied_event() {
            return variation.reason.clone();
        }

        if self.cancelled {
            return "Cancelled".to_string();
        }

        self.reason_clauses()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::tests::{dt, fixed_event, variable_event};
    use crate::store::MemoryStore;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_unvaried_occurrence_has_empty_reason() {
        let occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));

        assert!(occ.reason_clauses().is_empty());
        assert_eq!(occ.reason(), "");
    }

    #[test]
    fn test_starts_earlier_ends_later() {
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.set_varied_start(dt("2024-01-01 08:00"));
        occ.set_varied_end(dt("2024-01-01 10:30"));

        assert_eq!(
            occ.reason_clauses(),
            vec![ReasonClause::StartsEarlier(hm(8, 0)), ReasonClause::EndsLater(hm(10, 30))]
        );
        assert_eq!(occ.reason(), "starts earlier at 08:00, ends later at 10:30");
    }

    #[test]
    fn test_starts_later_ends_earlier() {
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.set_varied_start(dt("2024-01-01 09:15"));
        occ.set_varied_end(dt("2024-01-01 09:45"));

        assert_eq!(occ.reason(), "starts later at 09:15, ends earlier at 09:45");
    }

    #[test]
    fn test_new_date_only() {
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.set_varied_start(dt("2024-01-03 09:00"));
        occ.set_varied_end(dt("2024-01-03 10:00"));

        assert_eq!(occ.reason_clauses(), vec![ReasonClause::NewDate]);
        assert_eq!(occ.reason(), "new date");
    }

    #[test]
    fn test_time_clauses_ignore_the_date() {
        // Moved to the next day at an earlier time of day: absolute start is
        // later, but the clause compares time of day only.
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.set_varied_start(dt("2024-01-02 08:00"));
        occ.set_varied_end(dt("2024-01-02 10:00"));

        assert_eq!(occ.reason(), "new date, starts earlier at 08:00");
    }

    #[test]
    fn test_moved_point_occurrence_has_no_end_clause() {
        let occ = Occurrence::builder(fixed_event())
            .unvaried_start(dt("2024-01-01 09:00"))
            .varied_start_time(hm(10, 0))
            .build()
            .unwrap();

        assert_eq!(occ.reason_clauses(), vec![ReasonClause::StartsLater(hm(10, 0))]);
        assert_eq!(occ.reason(), "starts later at 10:00");
    }

    #[test]
    fn test_end_added_to_point_occurrence_compares_with_start() {
        let mut occ = Occurrence::builder(fixed_event())
            .unvaried_start(dt("2024-01-01 09:00"))
            .build()
            .unwrap();
        occ.set_varied_end(dt("2024-01-01 11:00"));

        assert_eq!(occ.reason(), "ends later at 11:00");
    }

    #[test]
    fn test_cancelled_trumps_timing() {
        let store = MemoryStore::new();
        let mut occ = Occurrence::new(fixed_event(), dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.set_varied_start(dt("2024-01-02 08:00"));
        occ.cancel(&store).unwrap();

        assert_eq!(occ.reason(), "Cancelled");
    }

    #[test]
    fn test_variation_reason_trumps_everything() {
        let store = MemoryStore::new();
        let event = variable_event();
        let variation = event.variations[0].clone();
        let mut occ = Occurrence::new(event, dt("2024-01-01 09:00"), dt("2024-01-01 10:00"));
        occ.set_varied_start(dt("2024-01-02 08:00"));
        occ.cancel(&store).unwrap();
        occ.set_varied_event(Some(variation)).unwrap();

        assert_eq!(occ.reason(), "Guest speaker");
    }
}
