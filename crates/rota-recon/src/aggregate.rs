//! Attendance aggregation
//!
//! Turns the raw per-member/per-date response list into lookup
//! structures with deterministic conflict resolution:
//! - response map: member -> date -> answer
//! - window map: member -> date -> availability window
//! - note map: member -> note, last-write-wins by recording time
//!
//! The aggregation is a pure transform. It holds no reference to its
//! input and must be re-run whenever the response list changes.

use indexmap::IndexMap;
use rota_model::{AttendanceResponse, MemberId, ResponseKind, TargetDateId, TimeWindow};
use std::collections::HashMap;

/// Aggregated view over a collection's attendance responses
#[derive(Debug, Clone, Default)]
pub struct ResponseBook {
    /// member -> date -> current answer
    responses: IndexMap<MemberId, HashMap<TargetDateId, ResponseKind>>,
    /// member -> date -> availability window (only when a bound is present)
    windows: HashMap<MemberId, HashMap<TargetDateId, TimeWindow>>,
    /// member -> latest non-empty note across all dates
    notes: HashMap<MemberId, String>,
}

impl ResponseBook {
    /// Aggregate a response list into lookup structures
    ///
    /// Duplicate (member, date) pairs are resolved latest `responded_at`
    /// wins; an exact timestamp tie is broken by later list position so
    /// the outcome never depends on map iteration order. The note map is
    /// keyed by member alone: among the member's current responses the
    /// non-empty note with the latest `responded_at` wins, regardless of
    /// which date it answers.
    #[must_use]
    pub fn aggregate(responses: &[AttendanceResponse]) -> Self {
        // Latest response wins per (member, date).
        let mut current: IndexMap<(MemberId, TargetDateId), &AttendanceResponse> = IndexMap::new();
        for response in responses {
            let key = (response.member_id, response.target_date_id);
            match current.get(&key) {
                Some(existing) if existing.responded_at > response.responded_at => {}
                _ => {
                    current.insert(key, response);
                }
            }
        }

        let mut book = Self::default();
        for ((member_id, date_id), response) in &current {
            book.responses
                .entry(*member_id)
                .or_default()
                .insert(*date_id, response.kind);
            if let Some(window) = response.window {
                book.windows
                    .entry(*member_id)
                    .or_default()
                    .insert(*date_id, window);
            }
        }

        // Note selection runs over current responses only: a superseded
        // response never contributes its note.
        let mut note_winner: HashMap<MemberId, &AttendanceResponse> = HashMap::new();
        for ((member_id, _), response) in &current {
            let has_note = response.note.as_deref().is_some_and(|n| !n.is_empty());
            if !has_note {
                continue;
            }
            match note_winner.get(member_id) {
                Some(existing) if existing.responded_at > response.responded_at => {}
                _ => {
                    note_winner.insert(*member_id, *response);
                }
            }
        }
        for (member_id, response) in note_winner {
            if let Some(note) = &response.note {
                book.notes.insert(member_id, note.clone());
            }
        }

        book
    }

    /// Current answer for a (member, date) pair
    #[inline]
    #[must_use]
    pub fn kind_for(&self, member_id: MemberId, date_id: TargetDateId) -> Option<ResponseKind> {
        self.responses.get(&member_id)?.get(&date_id).copied()
    }

    /// Availability window for a (member, date) pair
    #[inline]
    #[must_use]
    pub fn window_for(&self, member_id: MemberId, date_id: TargetDateId) -> Option<TimeWindow> {
        self.windows.get(&member_id)?.get(&date_id).copied()
    }

    /// Latest note recorded by the member, if any
    #[inline]
    #[must_use]
    pub fn note_for(&self, member_id: MemberId) -> Option<&str> {
        self.notes.get(&member_id).map(String::as_str)
    }

    /// Number of `attending` answers across all dates for a member
    #[must_use]
    pub fn attending_count(&self, member_id: MemberId) -> usize {
        self.responses
            .get(&member_id)
            .map(|dates| dates.values().filter(|k| k.is_attending()).count())
            .unwrap_or(0)
    }

    /// Members answering `attending` for the given date, in first-seen order
    #[must_use]
    pub fn attending_members(&self, date_id: TargetDateId) -> Vec<MemberId> {
        self.responses
            .iter()
            .filter(|(_, dates)| dates.get(&date_id).is_some_and(|k| k.is_attending()))
            .map(|(member_id, _)| *member_id)
            .collect()
    }

    /// True when the member answered `attending` for the date
    #[inline]
    #[must_use]
    pub fn is_attending(&self, member_id: MemberId, date_id: TargetDateId) -> bool {
        self.kind_for(member_id, date_id)
            .is_some_and(ResponseKind::is_attending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rota_model::AttendanceResponse;

    fn at(hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn latest_response_wins_per_member_date() {
        let member = MemberId::new();
        let date = TargetDateId::new();
        let responses = vec![
            AttendanceResponse::new(member, date, ResponseKind::Attending, at(9)),
            AttendanceResponse::new(member, date, ResponseKind::Absent, at(11)),
            AttendanceResponse::new(member, date, ResponseKind::Undecided, at(10)),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.kind_for(member, date), Some(ResponseKind::Absent));
    }

    #[test]
    fn timestamp_tie_resolves_to_later_list_position() {
        let member = MemberId::new();
        let date = TargetDateId::new();
        let responses = vec![
            AttendanceResponse::new(member, date, ResponseKind::Attending, at(9)),
            AttendanceResponse::new(member, date, ResponseKind::Absent, at(9)),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.kind_for(member, date), Some(ResponseKind::Absent));
    }

    #[test]
    fn note_is_last_write_by_recording_time_not_date() {
        let member = MemberId::new();
        let early_date = TargetDateId::new();
        let late_date = TargetDateId::new();
        // The answer for the "later" date was recorded first.
        let responses = vec![
            AttendanceResponse::new(member, late_date, ResponseKind::Attending, at(8))
                .with_note("recorded first"),
            AttendanceResponse::new(member, early_date, ResponseKind::Attending, at(12))
                .with_note("recorded last"),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.note_for(member), Some("recorded last"));
    }

    #[test]
    fn empty_notes_never_win() {
        let member = MemberId::new();
        let d1 = TargetDateId::new();
        let d2 = TargetDateId::new();
        let responses = vec![
            AttendanceResponse::new(member, d1, ResponseKind::Attending, at(9)).with_note("kept"),
            AttendanceResponse::new(member, d2, ResponseKind::Absent, at(10)).with_note(""),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.note_for(member), Some("kept"));
    }

    #[test]
    fn superseded_response_does_not_contribute_note() {
        let member = MemberId::new();
        let date = TargetDateId::new();
        let responses = vec![
            AttendanceResponse::new(member, date, ResponseKind::Attending, at(9))
                .with_note("stale"),
            AttendanceResponse::new(member, date, ResponseKind::Attending, at(10)),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.note_for(member), None);
    }

    #[test]
    fn window_map_only_populated_when_present() {
        let member = MemberId::new();
        let date = TargetDateId::new();
        let window = TimeWindow::new(Some("10:00:00".parse().unwrap()), None).unwrap();
        let responses = vec![
            AttendanceResponse::new(member, date, ResponseKind::Attending, at(9))
                .with_window(window),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.window_for(member, date), Some(window));
        assert_eq!(book.window_for(MemberId::new(), date), None);
    }

    #[test]
    fn attending_lookups() {
        let m1 = MemberId::new();
        let m2 = MemberId::new();
        let d1 = TargetDateId::new();
        let d2 = TargetDateId::new();
        let responses = vec![
            AttendanceResponse::new(m1, d1, ResponseKind::Attending, at(9)),
            AttendanceResponse::new(m1, d2, ResponseKind::Attending, at(9)),
            AttendanceResponse::new(m2, d1, ResponseKind::Absent, at(9)),
        ];
        let book = ResponseBook::aggregate(&responses);
        assert_eq!(book.attending_count(m1), 2);
        assert_eq!(book.attending_count(m2), 0);
        assert_eq!(book.attending_members(d1), vec![m1]);
        assert!(book.is_attending(m1, d2));
        assert!(!book.is_attending(m2, d1));
    }
}
