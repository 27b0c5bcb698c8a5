/*
 * src/candidates.rs
 *
 * File for the Candidate Selector
 *
 * Purpose:
 *   Builds the three destination candidate pools (hotels, restaurants,
 *   activities) that feed the LLM Planner Adapter, honoring preferences and
 *   a per-category share of the daily budget envelope.
 */

use tracing::debug;

use crate::catalog::CatalogGateway;
use crate::error::CatalogError;
use crate::model::{Place, PlaceKind, Preferences, ResolvedRequest};

/// Activity slots per day in the canonical time-slot template.
const ACTIVITY_SLOTS_PER_DAY: u32 = 4;
/// Restaurant slots per day in the canonical time-slot template.
const RESTAURANT_SLOTS_PER_DAY: u32 = 2;

const ACTIVITY_BUDGET_WEIGHT: f64 = 0.4;
const RESTAURANT_BUDGET_WEIGHT: f64 = 0.3;
const HOTEL_BUDGET_WEIGHT: f64 = 0.3;

/// The three candidate pools handed to the LLM Planner Adapter.
#[derive(Debug, Clone, Default)]
pub struct CandidatePools {
	pub hotels: Vec<Place>,
	pub restaurants: Vec<Place>,
	pub activities: Vec<Place>,
}

/// Builds candidate pools for `request`'s destination. The Catalog Gateway
/// is queried with a generous limit so the greedy/fill-from-remainder
/// selection below has enough material to work with.
pub async fn select_candidates(
	gateway: &dyn CatalogGateway,
	request: &ResolvedRequest,
) -> Result<CandidatePools, CatalogError> {
	const POOL_QUERY_LIMIT: usize = 200;

	let unique_activities =
		(ACTIVITY_SLOTS_PER_DAY * request.duration_days) as usize;
	let unique_restaurants =
		(RESTAURANT_SLOTS_PER_DAY * request.duration_days) as usize;

	let daily_budget = request.target_budget / request.duration_days.max(1) as f64;

	let hotel_pool = gateway
		.places_by_city(request.destination_city_id, PlaceKind::Hotel, POOL_QUERY_LIMIT)
		.await?;
	let restaurant_pool = gateway
		.places_by_city(request.destination_city_id, PlaceKind::Restaurant, POOL_QUERY_LIMIT)
		.await?;
	let activity_pool = gateway
		.places_by_city(request.destination_city_id, PlaceKind::Activity, POOL_QUERY_LIMIT)
		.await?;

	let hotels = select_category(
		&hotel_pool,
		&request.preferences.hotels,
		1,
		daily_budget * HOTEL_BUDGET_WEIGHT,
	);
	let restaurants = select_category(
		&restaurant_pool,
		&request.preferences.restaurants,
		unique_restaurants.min(restaurant_pool.len()),
		daily_budget * RESTAURANT_BUDGET_WEIGHT,
	);
	let activities = select_category(
		&activity_pool,
		&request.preferences.activities,
		unique_activities.min(activity_pool.len()),
		daily_budget * ACTIVITY_BUDGET_WEIGHT,
	);

	debug!(
		target: "candidates",
		hotels = hotels.len(),
		restaurants = restaurants.len(),
		activities = activities.len(),
		"selected candidate pools"
	);

	Ok(CandidatePools { hotels, restaurants, activities })
}

/// Selects up to `quota` places from `pool`, excluding disliked ids,
/// preferring the liked subset, greedily filling under `budget_cap`, then
/// topping up by ascending price if the quota isn't met.
fn select_category(
	pool: &[Place],
	preferences: &crate::model::PreferenceSet,
	quota: usize,
	budget_cap: f64,
) -> Vec<Place> {
	let available: Vec<&Place> = pool
		.iter()
		.filter(|p| !preferences.is_disliked(p.id()))
		.collect();

	let liked_subset: Vec<&Place> = available
		.iter()
		.filter(|p| preferences.is_liked(p.id()))
		.copied()
		.collect();

	let mut ranked: Vec<&Place> = if liked_subset.is_empty() {
		available.clone()
	} else {
		liked_subset
	};
	ranked.sort_by(|a, b| b.rating().partial_cmp(&a.rating()).unwrap());

	let mut selected: Vec<Place> = Vec::new();
	let mut running_cost = 0.0;
	for place in &ranked {
		if selected.len() >= quota {
			break;
		}
		let price = place.headline_price();
		if selected.is_empty() || running_cost + price <= budget_cap {
			running_cost += price;
			selected.push((*place).clone());
		}
	}

	if selected.len() < quota {
		let mut remaining: Vec<&Place> = available
			.iter()
			.filter(|p| !selected.iter().any(|s| s.id() == p.id()))
			.copied()
			.collect();
		remaining.sort_by(|a, b| a.headline_price().partial_cmp(&b.headline_price()).unwrap());
		for place in remaining {
			if selected.len() >= quota {
				break;
			}
			selected.push(place.clone());
		}
	}

	selected
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{PlaceCommon, PreferenceSet};

	fn hotel(id: &str, price: f64, rating: f64) -> Place {
		Place::Hotel {
			common: PlaceCommon {
				id: id.to_string(),
				name: id.to_string(),
				city_id: 1,
				rating,
				lat: None,
				lon: None,
				description: None,
			},
			price_per_night: price,
		}
	}

	#[test]
	fn always_admits_at_least_one_item() {
		let pool = vec![hotel("h1", 10_000.0, 9.0)];
		let prefs = PreferenceSet::default();
		let selected = select_category(&pool, &prefs, 1, 1.0);
		assert_eq!(selected.len(), 1);
	}

	#[test]
	fn disliked_items_are_excluded() {
		let pool = vec![hotel("h1", 50.0, 9.0), hotel("h2", 50.0, 8.0)];
		let mut prefs = PreferenceSet::default();
		prefs.disliked.insert("h1".to_string());
		let selected = select_category(&pool, &prefs, 2, 1000.0);
		assert!(selected.iter().all(|p| p.id() != "h1"));
	}

	#[test]
	fn fills_remainder_by_ascending_price_when_quota_unmet_by_budget() {
		let pool = vec![hotel("h1", 10.0, 9.0), hotel("h2", 5.0, 5.0), hotel("h3", 1000.0, 1.0)];
		let prefs = PreferenceSet::default();
		let selected = select_category(&pool, &prefs, 3, 12.0);
		assert_eq!(selected.len(), 3);
	}

	#[test]
	fn liked_subset_preferred_when_nonempty() {
		let pool = vec![hotel("h1", 50.0, 5.0), hotel("h2", 50.0, 9.0)];
		let mut prefs = PreferenceSet::default();
		prefs.liked.insert("h1".to_string());
		let selected = select_category(&pool, &prefs, 1, 1000.0);
		assert_eq!(selected[0].id(), "h1");
	}
}
