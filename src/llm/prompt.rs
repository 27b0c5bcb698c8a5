/*
 * src/llm/prompt.rs
 *
 * File for oracle prompt construction
 *
 * Purpose:
 *   Builds the structured prompt handed to the LLM oracle: trip input,
 *   the three candidate pools, preferences, a numbered rule set, and a
 *   literal JSON skeleton the oracle is asked to fill in.
 */

use crate::candidates::CandidatePools;
use crate::model::{Place, Preferences, ResolvedRequest};

fn pool_json(pool: &[Place]) -> String {
	serde_json::to_string_pretty(pool).unwrap_or_else(|_| "[]".to_string())
}

fn ids_json(ids: &std::collections::HashSet<String>) -> String {
	let sorted: Vec<&String> = {
		let mut v: Vec<&String> = ids.iter().collect();
		v.sort();
		v
	};
	serde_json::to_string(&sorted).unwrap_or_else(|_| "[]".to_string())
}

/// Builds the oracle prompt for one planning call. Follows the shape of
/// this domain's original itinerary prompt (trip block, available-data
/// block, preferences block, numbered rules, example skeleton, trailing
/// validation checklist) but scoped strictly to the `ScheduleItem` shape
/// this engine emits.
pub fn build_prompt(request: &ResolvedRequest, pools: &CandidatePools, preferences: &Preferences) -> String {
	let daily_budget = request.target_budget / request.duration_days.max(1) as f64;

	format!(
		r#"You are an AI travel planner. Create a detailed day-by-day itinerary from the input below. Produce ONLY valid JSON, no prose, no comments.

TRIP INPUT:
- Destination city id: {destination_city_id}
- Duration: {duration_days} days
- Guests: {guest_count}
- Total budget: ${target_budget:.2} USD for all guests
- Daily budget: ${daily_budget:.2} USD per day

AVAILABLE DATA:
Hotels ({n_hotels} available):
{hotels_json}

Restaurants ({n_restaurants} available):
{restaurants_json}

Activities ({n_activities} available):
{activities_json}

PREFERENCES:
Liked (prioritize these):
- Hotels: {liked_hotels}
- Restaurants: {liked_restaurants}
- Activities: {liked_activities}
- Transport modes: {liked_transport}

Disliked (never use these):
- Hotels: {disliked_hotels}
- Restaurants: {disliked_restaurants}
- Activities: {disliked_activities}
- Transport modes: {disliked_transport}

PLANNING RULES:
1) Stay within the total budget; do not plan past ${target_budget:.2} USD across all days.
2) Never use a disliked transport mode for any transfer.
3) If any liked transport modes are given, use only those modes for every transfer.
4) Insert exactly one "transfer" item between every pair of consecutive non-transfer items.
5) Leave distance_km and travel_time_min null on every transfer; they are computed afterward from real coordinates.
6) Times are 24-hour HH:MM; no two items in a day may overlap.
7) Breakfast, lunch, and dinner fall in their canonical windows (morning/midday/evening).
8) Emit JSON only, matching the schema below exactly.

REQUIRED OUTPUT FORMAT:
{{
  "destination": "<string>",
  "guests": {guest_count},
  "duration_days": {duration_days},
  "within_budget": true,
  "total_cost": <number>,
  "cost_breakdown": {{ "hotels": <number>, "activities": <number>, "meals": <number>, "transport_estimate": <number> }},
  "days": [
    {{
      "day": 1,
      "activities": [
        {{
          "start_time": "09:00",
          "end_time": "10:30",
          "type": "activity" | "meal" | "hotel" | "transfer",
          "place_id": "<id or null>",
          "place_name": "<string>",
          "description": "<string>",
          "transport_mode": "<mode or null>",
          "distance_km": null,
          "travel_time_min": null,
          "cost": <number>
        }}
      ]
    }}
  ]
}}

Validation checklist:
- JSON only, valid and complete, one object per the schema above.
- Respect dislikes by excluding them entirely; prefer likes when feasible.
- No time overlaps; exactly one transfer between consecutive non-transfer items.
- distance_km and travel_time_min are null on every transfer.
"#,
		destination_city_id = request.destination_city_id,
		duration_days = request.duration_days,
		guest_count = request.guest_count,
		target_budget = request.target_budget,
		daily_budget = daily_budget,
		n_hotels = pools.hotels.len(),
		hotels_json = pool_json(&pools.hotels),
		n_restaurants = pools.restaurants.len(),
		restaurants_json = pool_json(&pools.restaurants),
		n_activities = pools.activities.len(),
		activities_json = pool_json(&pools.activities),
		liked_hotels = ids_json(&preferences.hotels.liked),
		liked_restaurants = ids_json(&preferences.restaurants.liked),
		liked_activities = ids_json(&preferences.activities.liked),
		liked_transport = ids_json(&preferences.transport_modes.liked),
		disliked_hotels = ids_json(&preferences.hotels.disliked),
		disliked_restaurants = ids_json(&preferences.restaurants.disliked),
		disliked_activities = ids_json(&preferences.activities.disliked),
		disliked_transport = ids_json(&preferences.transport_modes.disliked),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{PlaceCommon, ResolvedRequest};

	fn sample_request() -> ResolvedRequest {
		ResolvedRequest {
			user_id: Some("u1".to_string()),
			start_city_id: None,
			destination_city_id: 1,
			guest_count: 2,
			duration_days: 3,
			target_budget: 600.0,
			hotel_ids: vec![],
			activity_ids: vec![],
			restaurant_ids: vec![],
			transport_ids: vec![],
			preferences: Preferences::default(),
		}
	}

	#[test]
	fn prompt_embeds_trip_input_and_schema() {
		let request = sample_request();
		let pools = CandidatePools::default();
		let text = build_prompt(&request, &pools, &request.preferences);
		assert!(text.contains("Duration: 3 days"));
		assert!(text.contains("\"type\": \"activity\""));
	}

	#[test]
	fn prompt_embeds_candidate_pool_json() {
		let request = sample_request();
		let mut pools = CandidatePools::default();
		pools.hotels.push(Place::Hotel {
			common: PlaceCommon {
				id: "h1".to_string(),
				name: "Lotus Hotel".to_string(),
				city_id: 1,
				rating: 8.5,
				lat: Some(1.0),
				lon: Some(2.0),
				description: None,
			},
			price_per_night: 50.0,
		});
		let text = build_prompt(&request, &pools, &request.preferences);
		assert!(text.contains("Lotus Hotel"));
	}
}
