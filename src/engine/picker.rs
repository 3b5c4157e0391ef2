use chrono::NaiveDate;

use crate::model::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Empty,
    StartPicked(NaiveDate),
    Complete(DateRange),
}

/// Calendar click-to-range state machine: `Empty → StartPicked → Complete`.
///
/// Days strictly before `today` are never selectable. Once a range is
/// complete, the next click begins a new selection; a click earlier than
/// the picked start restarts the selection at the earlier day.
///
/// The validated variant ([`RangePicker::with_reserved`]) additionally
/// refuses clicks on already-reserved days and will not complete a range
/// that straddles one: if any day between the picked start and the clicked
/// day is reserved, the selection restarts at the clicked day instead.
///
/// `confirm` only yields a range in `Complete` and does not reset the
/// machine; the hosting workflow decides whether the selection survives.
#[derive(Debug, Clone)]
pub struct RangePicker {
    today: NaiveDate,
    reserved: Vec<DateRange>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl RangePicker {
    /// Plain variant: reservations do not constrain the selection.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_reserved(today, Vec::new())
    }

    /// Validated variant for a single vehicle's calendar.
    pub fn with_reserved(today: NaiveDate, reserved: Vec<DateRange>) -> Self {
        Self {
            today,
            reserved,
            start: None,
            end: None,
        }
    }

    pub fn state(&self) -> PickerState {
        match (self.start, self.end) {
            (Some(s), Some(e)) => PickerState::Complete(DateRange::new(s, e)),
            (Some(s), None) => PickerState::StartPicked(s),
            _ => PickerState::Empty,
        }
    }

    pub fn is_reserved(&self, day: NaiveDate) -> bool {
        self.reserved.iter().any(|r| r.contains_day(day))
    }

    pub fn is_selectable(&self, day: NaiveDate) -> bool {
        day >= self.today && !self.is_reserved(day)
    }

    pub fn click(&mut self, day: NaiveDate) {
        if !self.is_selectable(day) {
            return;
        }
        match (self.start, self.end) {
            // First click, or a click after a complete range: new selection.
            (None, _) | (Some(_), Some(_)) => {
                self.start = Some(day);
                self.end = None;
            }
            (Some(start), None) => {
                if day < start {
                    // Restart with the earlier day as the new start.
                    self.start = Some(day);
                } else if self.straddles_reservation(start, day) {
                    self.start = Some(day);
                } else {
                    self.end = Some(day);
                }
            }
        }
    }

    /// Emit the selection; only possible once the range is complete.
    pub fn confirm(&self) -> Option<DateRange> {
        match self.state() {
            PickerState::Complete(range) => Some(range),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Day-by-day scan from `start` to `end`: any reserved day in between
    /// means the candidate range would straddle an existing reservation.
    fn straddles_reservation(&self, start: NaiveDate, end: NaiveDate) -> bool {
        DateRange::new(start, end).days().any(|d| self.is_reserved(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2024, 3, 1);

    fn picker() -> RangePicker {
        RangePicker::new(d(TODAY.0, TODAY.1, TODAY.2))
    }

    #[test]
    fn two_clicks_complete_a_range() {
        let mut p = picker();
        assert_eq!(p.state(), PickerState::Empty);
        assert_eq!(p.confirm(), None);

        p.click(d(2024, 3, 10));
        assert_eq!(p.state(), PickerState::StartPicked(d(2024, 3, 10)));
        assert_eq!(p.confirm(), None);

        p.click(d(2024, 3, 14));
        let range = DateRange::new(d(2024, 3, 10), d(2024, 3, 14));
        assert_eq!(p.state(), PickerState::Complete(range));
        assert_eq!(p.confirm(), Some(range));
    }

    #[test]
    fn same_day_twice_is_a_single_day_range() {
        let mut p = picker();
        p.click(d(2024, 3, 10));
        p.click(d(2024, 3, 10));
        assert_eq!(
            p.confirm(),
            Some(DateRange::day(d(2024, 3, 10)))
        );
    }

    #[test]
    fn earlier_click_restarts_the_selection() {
        let mut p = picker();
        p.click(d(2024, 3, 10));
        p.click(d(2024, 3, 5));
        assert_eq!(p.state(), PickerState::StartPicked(d(2024, 3, 5)));

        p.click(d(2024, 3, 8));
        assert_eq!(
            p.confirm(),
            Some(DateRange::new(d(2024, 3, 5), d(2024, 3, 8)))
        );
    }

    #[test]
    fn click_after_complete_starts_over() {
        let mut p = picker();
        p.click(d(2024, 3, 10));
        p.click(d(2024, 3, 12));
        p.click(d(2024, 3, 20));
        assert_eq!(p.state(), PickerState::StartPicked(d(2024, 3, 20)));
    }

    #[test]
    fn past_days_are_ignored() {
        let mut p = picker();
        p.click(d(2024, 2, 28));
        assert_eq!(p.state(), PickerState::Empty);

        // Today itself is selectable.
        p.click(d(2024, 3, 1));
        assert_eq!(p.state(), PickerState::StartPicked(d(2024, 3, 1)));
    }

    #[test]
    fn reserved_day_is_not_selectable_in_validated_variant() {
        let reserved = vec![DateRange::new(d(2024, 3, 11), d(2024, 3, 12))];
        let mut p = RangePicker::with_reserved(d(2024, 3, 1), reserved);
        p.click(d(2024, 3, 11));
        assert_eq!(p.state(), PickerState::Empty);
    }

    #[test]
    fn straddling_a_reservation_restarts_at_the_clicked_day() {
        let reserved = vec![DateRange::new(d(2024, 3, 11), d(2024, 3, 12))];
        let mut p = RangePicker::with_reserved(d(2024, 3, 1), reserved);

        p.click(d(2024, 3, 10));
        p.click(d(2024, 3, 14));
        // 11th/12th sit inside [10, 14] — the range must not complete.
        assert_eq!(p.state(), PickerState::StartPicked(d(2024, 3, 14)));

        p.click(d(2024, 3, 15));
        assert_eq!(
            p.confirm(),
            Some(DateRange::new(d(2024, 3, 14), d(2024, 3, 15)))
        );
    }

    #[test]
    fn plain_variant_ignores_reservations_entirely() {
        let mut p = picker();
        p.click(d(2024, 3, 10));
        p.click(d(2024, 3, 14));
        assert!(p.confirm().is_some());
    }

    #[test]
    fn confirm_does_not_reset() {
        let mut p = picker();
        p.click(d(2024, 3, 10));
        p.click(d(2024, 3, 12));
        let first = p.confirm();
        assert_eq!(first, p.confirm());

        p.clear();
        assert_eq!(p.state(), PickerState::Empty);
    }
}
