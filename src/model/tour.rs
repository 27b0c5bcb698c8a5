/*
 * src/model/tour.rs
 *
 * File for Tour table models and related responses
 *
 * Purpose:
 *   Strongly-typed model for the final planning output and its cost
 *   breakdown DTO.
 */

use serde::{Deserialize, Serialize};

use crate::model::schedule::DaySchedule;

/// Per-category sum of every schedule item's cost. Computed once, by the
/// post-processor (C7 Step D) — the oracle's own guess at this shape is
/// discarded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
	pub hotels: f64,
	pub activities: f64,
	pub meals: f64,
	pub transport_estimate: f64,
}

impl CostBreakdown {
	pub fn total(&self) -> f64 {
		self.hotels + self.activities + self.meals + self.transport_estimate
	}

	pub fn rounded(&self) -> Self {
		Self {
			hotels: round2(self.hotels),
			activities: round2(self.activities),
			meals: round2(self.meals),
			transport_estimate: round2(self.transport_estimate),
		}
	}
}

fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

/// The final planning output: one tour, per `destination_city_id`, spanning
/// `duration_days` days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
	pub tour_id: String,
	pub user_id: String,
	pub start_city: String,
	pub destination_city: String,
	pub duration_days: u32,
	pub guest_count: u32,
	pub budget: f64,
	pub total_estimated_cost: f64,
	pub within_budget: bool,
	pub cost_breakdown: CostBreakdown,
	pub schedule: Vec<DaySchedule>,
	/// Present only when the schedule came from a fallback/error draft; never
	/// emitted alongside a successful oracle-backed plan.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
