/*
 * src/model/schedule.rs
 *
 * File for ScheduleItem and DaySchedule models
 *
 * Purpose:
 *   Strongly-typed models for the time-slotted atoms of a day, and the day
 *   container itself.
 */

use serde::{Deserialize, Serialize};

/// The category of a single schedule atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
	Activity,
	Meal,
	Hotel,
	Transfer,
}

/// A single time-slotted atom in a day's schedule.
///
/// Invariants (enforced by [`crate::postprocess`]): `end_time > start_time`;
/// times are `HH:MM` 24h strings; no two items in the same day overlap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleItem {
	pub start_time: String,
	pub end_time: String,
	#[serde(rename = "type")]
	pub item_type: ItemType,
	pub place_id: Option<String>,
	pub place_name: String,
	pub description: String,
	pub transport_mode: Option<String>,
	pub distance_km: Option<f64>,
	pub travel_time_min: Option<u32>,
	pub cost: f64,
}

impl ScheduleItem {
	pub fn start_minutes(&self) -> i64 {
		parse_hhmm(&self.start_time)
	}

	pub fn end_minutes(&self) -> i64 {
		parse_hhmm(&self.end_time)
	}
}

/// Parses an `HH:MM` string into minutes-since-midnight. Malformed input
/// parses as `0` so a single bad draft item never panics the post-processor;
/// the invariant sweep (C7 Step E) is responsible for repairing it.
pub fn parse_hhmm(s: &str) -> i64 {
	let mut parts = s.splitn(2, ':');
	let hour: i64 = parts.next().and_then(|h| h.parse().ok()).unwrap_or(0);
	let minute: i64 = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
	hour * 60 + minute
}

/// Formats minutes-since-midnight back into `HH:MM`, wrapping at 24h.
pub fn format_hhmm(total_minutes: i64) -> String {
	let wrapped = total_minutes.rem_euclid(24 * 60);
	format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// An ordered sequence of [`ScheduleItem`] for one day of the trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySchedule {
	pub day: u32,
	pub activities: Vec<ScheduleItem>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_and_formats_round_trip() {
		assert_eq!(parse_hhmm("08:30"), 510);
		assert_eq!(format_hhmm(510), "08:30");
	}

	#[test]
	fn formats_wrap_past_midnight() {
		assert_eq!(format_hhmm(24 * 60 + 15), "00:15");
	}

	#[test]
	fn malformed_time_parses_as_zero() {
		assert_eq!(parse_hhmm("garbage"), 0);
	}
}
