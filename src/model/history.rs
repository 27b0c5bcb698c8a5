/*
 * src/model/history.rs
 *
 * File for HistoricalTourOption models
 *
 * Purpose:
 *   Strongly-typed model for a past tour option as returned by the Catalog
 *   Gateway, generalized from the original implementation's `UserTourInfo`
 *   dict into a typed struct.
 */

use serde::{Deserialize, Serialize};

/// A previously booked or saved tour option, used by the Similarity Engine
/// (C4) as a comparison point for the current request and, once selected as
/// a seed, as the starting point for Candidate Selection (C5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalTourOption {
	pub user_id: String,
	pub destination_city_id: i32,
	pub start_city_id: Option<i32>,
	pub guest_count: u32,
	pub duration_days: u32,
	pub target_budget: f64,
	pub hotel_ids: Vec<String>,
	pub activity_ids: Vec<String>,
	pub restaurant_ids: Vec<String>,
	pub transport_ids: Vec<String>,
	/// Rating in `[0, 10]` used by the existing-user/cold-start ranking blend.
	pub rating: f64,
}
