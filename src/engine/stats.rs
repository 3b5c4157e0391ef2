use chrono::{Datelike, Days, NaiveDate};

use crate::model::{DateRange, Reservation};

/// Dashboard time window, resolved against "now" at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsWindow {
    Last7Days,
    Last30Days,
    ThisMonth,
    AllTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEntry {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleUsage {
    pub vehicle_name: String,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    /// The resolved reporting period.
    pub period: DateRange,
    pub total: usize,
    /// Mean trip duration; every trip counts both endpoints and lasts at
    /// least one day.
    pub avg_duration_days: f64,
    /// Fraction of reservations that requested lodging, in `0.0..=1.0`.
    pub hotel_rate: f64,
    /// Five most frequent primary contacts, ties in first-seen order.
    pub top_users: Vec<TopEntry>,
    /// Five most frequent destinations, ties in first-seen order.
    pub top_destinations: Vec<TopEntry>,
    /// Total booked days per vehicle, every vehicle in the set, busiest
    /// first.
    pub vehicle_usage: Vec<VehicleUsage>,
}

impl Stats {
    /// Hotel rate as the dashboard renders it, e.g. `"33.3%"`.
    pub fn hotel_rate_pct(&self) -> String {
        format!("{:.1}%", self.hotel_rate * 100.0)
    }
}

/// Resolve a window into concrete period dates. `AllTime` spans the hull
/// of all reservations rather than the current date, and is undefined when
/// there are none.
pub fn resolve_window(
    window: StatsWindow,
    today: NaiveDate,
    reservations: &[Reservation],
) -> Option<DateRange> {
    let days_back = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);
    match window {
        StatsWindow::Last7Days => Some(DateRange::new(days_back(7), today)),
        StatsWindow::Last30Days => Some(DateRange::new(days_back(30), today)),
        StatsWindow::ThisMonth => {
            let first = today.with_day(1).unwrap_or(today);
            Some(DateRange::new(first, today))
        }
        StatsWindow::AllTime => reservations
            .iter()
            .map(|r| r.trip)
            .reduce(|acc, t| acc.hull(&t)),
    }
}

/// Summarize the reservations whose trip overlaps the resolved window.
/// Returns `None` when the filtered set is empty; the caller renders an
/// empty state. Pure function — rendering and export stay outside.
pub fn summarize(
    reservations: &[Reservation],
    window: StatsWindow,
    today: NaiveDate,
) -> Option<Stats> {
    let period = resolve_window(window, today, reservations)?;
    let included: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| r.trip.overlaps(&period))
        .collect();
    if included.is_empty() {
        return None;
    }

    let total = included.len();
    let total_days: i64 = included.iter().map(|r| r.trip.duration_days()).sum();
    let hotel_requests = included
        .iter()
        .filter(|r| r.hotel.as_ref().is_some_and(|h| h.required))
        .count();

    let mut top_users = count_by(included.iter().map(|r| r.details.name.as_str()));
    top_users.truncate(5);
    let mut top_destinations = count_by(included.iter().map(|r| r.details.destination.as_str()));
    top_destinations.truncate(5);

    let mut vehicle_usage: Vec<VehicleUsage> = Vec::new();
    for r in &included {
        let days = r.trip.duration_days();
        match vehicle_usage
            .iter_mut()
            .find(|u| u.vehicle_name == r.vehicle_name)
        {
            Some(u) => u.days += days,
            None => vehicle_usage.push(VehicleUsage {
                vehicle_name: r.vehicle_name.clone(),
                days,
            }),
        }
    }
    // Stable sort: equal day totals keep first-encountered order.
    vehicle_usage.sort_by(|a, b| b.days.cmp(&a.days));

    Some(Stats {
        period,
        total,
        avg_duration_days: total_days as f64 / total as f64,
        hotel_rate: hotel_requests as f64 / total as f64,
        top_users,
        top_destinations,
        vehicle_usage,
    })
}

/// Occurrence counts in first-encountered order, then stably sorted by
/// descending count so ties stay in encounter order.
fn count_by<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = Vec::new();
    for label in labels {
        match entries.iter_mut().find(|e| e.label == label) {
            Some(e) => e.count += 1,
            None => entries.push(TopEntry {
                label: label.to_string(),
                count: 1,
            }),
        }
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}
