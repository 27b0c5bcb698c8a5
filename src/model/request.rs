/*
 * src/model/request.rs
 *
 * File for TourRequest wire models
 *
 * Purpose:
 *   Strongly-typed model for the plan request accepted at the engine boundary,
 *   and the resolved/imputed form consumed by downstream components.
 */

use serde::{Deserialize, Serialize};

use crate::model::preferences::Preferences;

/// Raw liked/disliked identifier sets as received on the wire, one pair per
/// place category plus transport modes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPreferences {
	#[serde(default)]
	pub liked_hotels: Vec<String>,
	#[serde(default)]
	pub disliked_hotels: Vec<String>,
	#[serde(default)]
	pub liked_restaurants: Vec<String>,
	#[serde(default)]
	pub disliked_restaurants: Vec<String>,
	#[serde(default)]
	pub liked_activities: Vec<String>,
	#[serde(default)]
	pub disliked_activities: Vec<String>,
	#[serde(default)]
	pub liked_transport_modes: Vec<String>,
	#[serde(default)]
	pub disliked_transport_modes: Vec<String>,
}

/// Plan request accepted at the engine boundary. Every field besides
/// `destination_city_id` may be absent; the Similarity Engine (C4) imputes
/// missing numeric/categorical/id-set fields before Candidate Selection (C5)
/// ever runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourRequest {
	pub user_id: Option<String>,
	pub start_city_id: Option<i32>,
	pub destination_city_id: i32,
	pub guest_count: Option<u32>,
	pub duration_days: Option<u32>,
	pub target_budget: Option<f64>,
	#[serde(default)]
	pub hotel_ids: Vec<String>,
	#[serde(default)]
	pub activity_ids: Vec<String>,
	#[serde(default)]
	pub restaurant_ids: Vec<String>,
	#[serde(default)]
	pub transport_ids: Vec<String>,
	#[serde(default)]
	pub user_preferences: RawPreferences,
}

/// The fully resolved planning context: every numeric/categorical field has
/// been imputed (if it was missing) and preferences have been normalized into
/// canonical mode tags with a disjoint liked/disliked split.
///
/// Downstream components (C5 onward) only ever see a `ResolvedRequest`, never
/// a raw [`TourRequest`] — this is what keeps the existing-user/cold-start
/// branch selection in C8 from leaking into every other component.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
	pub user_id: Option<String>,
	pub start_city_id: Option<i32>,
	pub destination_city_id: i32,
	pub guest_count: u32,
	pub duration_days: u32,
	pub target_budget: f64,
	pub hotel_ids: Vec<String>,
	pub activity_ids: Vec<String>,
	pub restaurant_ids: Vec<String>,
	pub transport_ids: Vec<String>,
	pub preferences: Preferences,
}
