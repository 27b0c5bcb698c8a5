/*
 * src/postprocess.rs
 *
 * File for the Schedule Post-Processor
 *
 * Purpose:
 *   The correctness floor of the engine. Takes a draft schedule (from the
 *   LLM Planner Adapter or a fallback) and the resolved preferences, and
 *   produces a validated, enriched schedule: transport-mode enforcement,
 *   place-name filling, real geo/time/cost enrichment, totals, and a final
 *   invariant sweep. The post-processor, never the oracle, is the source of
 *   truth for distances, times, costs, and transport-mode policy.
 */

use tracing::warn;

use crate::candidates::CandidatePools;
use crate::catalog::CatalogGateway;
use crate::error::CatalogError;
use crate::geo;
use crate::model::{
	CostBreakdown, DaySchedule, ItemType, Place, PlaceKind, Preferences, ScheduleItem,
	schedule::{format_hhmm, parse_hhmm},
};
use crate::preferences::{is_canonical_mode, looks_like_transport_id};

/// Runs every post-processing step over `days` and returns the enriched
/// schedule alongside the totals the facade assembles into the final Tour.
pub async fn post_process(
	gateway: &dyn CatalogGateway,
	mut days: Vec<DaySchedule>,
	preferences: &Preferences,
	pools: &CandidatePools,
	target_budget: f64,
) -> Result<(Vec<DaySchedule>, CostBreakdown, f64, bool), CatalogError> {
	for day in &mut days {
		normalize_structure(&mut day.activities);
		enforce_transport_modes(&mut day.activities, preferences, gateway).await?;
		fill_place_names(&mut day.activities);
		enrich_geo(&mut day.activities, gateway, pools).await?;
		shift_for_geo_overlaps(&mut day.activities);
	}

	let (breakdown, total) = accumulate_costs(&days);
	let within_budget = total <= target_budget;

	Ok((days, breakdown, total, within_budget))
}

/// Step A: enforces the liked/disliked transport-mode policy on every
/// transfer item, in order, rotating across the liked set for variety.
async fn enforce_transport_modes(
	items: &mut [ScheduleItem],
	preferences: &Preferences,
	gateway: &dyn CatalogGateway,
) -> Result<(), CatalogError> {
	let liked: Vec<&String> = preferences.transport_modes.liked.iter().collect();
	let mut liked_cursor = 0usize;

	for item in items.iter_mut() {
		if item.item_type != ItemType::Transfer {
			continue;
		}

		let current = item.transport_mode.clone().unwrap_or_default();

		let resolved = if !liked.is_empty() {
			let mode = liked[liked_cursor % liked.len()].clone();
			liked_cursor += 1;
			mode
		} else if preferences.transport_modes.is_disliked(&current) {
			if preferences.transport_modes.is_disliked("taxi") {
				"bus".to_string()
			} else {
				"taxi".to_string()
			}
		} else if looks_like_transport_id(&current) {
			match gateway.transport_mode_of(&current).await {
				Ok(mode) => mode,
				Err(CatalogError::NotFound { .. }) => "taxi".to_string(),
				Err(err) => return Err(err),
			}
		} else if current.is_empty() || !is_canonical_mode(&current) {
			"taxi".to_string()
		} else {
			current
		};

		item.transport_mode = Some(resolved);
	}
	Ok(())
}

/// Localized display label per canonical mode, used to synthesize a
/// transfer's place_name when the draft left it blank.
fn mode_display_name(mode: &str) -> &'static str {
	match mode {
		"walk" => "walking",
		"bike" => "bicycle",
		"scooter" => "motorbike",
		"taxi" => "taxi",
		"bus" => "bus",
		"metro" => "metro",
		"car" => "car",
		_ => "taxi",
	}
}

/// Step B: fills in a transfer's place_name from its (already resolved)
/// transport mode when the draft left it blank.
fn fill_place_names(items: &mut [ScheduleItem]) {
	for item in items.iter_mut() {
		if item.item_type == ItemType::Transfer && item.place_name.trim().is_empty() {
			let mode = item.transport_mode.as_deref().unwrap_or("taxi");
			item.place_name = format!("Transfer by {}", mode_display_name(mode));
		}
	}
}

fn place_kind_for(item_type: ItemType) -> Option<PlaceKind> {
	match item_type {
		ItemType::Hotel => Some(PlaceKind::Hotel),
		ItemType::Meal => Some(PlaceKind::Restaurant),
		ItemType::Activity => Some(PlaceKind::Activity),
		ItemType::Transfer => None,
	}
}

/// Looks up a place's coordinates, first in the already-fetched candidate
/// pools (avoiding a catalog round-trip for the common case), falling back
/// to the Catalog Gateway.
async fn coords_for(
	item: &ScheduleItem,
	gateway: &dyn CatalogGateway,
	pools: &CandidatePools,
) -> Result<Option<(f64, f64)>, CatalogError> {
	let Some(place_id) = item.place_id.as_deref() else {
		return Ok(None);
	};
	let Some(kind) = place_kind_for(item.item_type) else {
		return Ok(None);
	};

	let pool: &[Place] = match kind {
		PlaceKind::Hotel => &pools.hotels,
		PlaceKind::Restaurant => &pools.restaurants,
		PlaceKind::Activity => &pools.activities,
		PlaceKind::Transport => &[],
	};
	if let Some(place) = pool.iter().find(|p| p.id() == place_id) {
		return Ok(place.coords());
	}

	gateway.place_coords(kind, place_id).await
}

/// Step C: for each transfer between two non-transfer items, computes real
/// distance/time/cost from coordinates when available, else falls back to
/// a mode-based default distance.
async fn enrich_geo(
	items: &mut [ScheduleItem],
	gateway: &dyn CatalogGateway,
	pools: &CandidatePools,
) -> Result<(), CatalogError> {
	for i in 0..items.len() {
		if items[i].item_type != ItemType::Transfer {
			continue;
		}

		let prev_coords = if i > 0 { coords_for(&items[i - 1], gateway, pools).await? } else { None };
		let next_coords = if i + 1 < items.len() {
			coords_for(&items[i + 1], gateway, pools).await?
		} else {
			None
		};

		let mode = items[i].transport_mode.clone().unwrap_or_else(|| "taxi".to_string());
		let start_hour = (items[i].start_minutes() / 60).rem_euclid(24) as u32;
		let rush_hour = geo::is_rush_hour(start_hour);

		let distance = match (prev_coords, next_coords) {
			(Some((lat1, lon1)), Some((lat2, lon2))) => geo::haversine(lat1, lon1, lat2, lon2),
			_ => geo::default_distance_km(&mode),
		};

		let travel_time = geo::travel_time_min(distance, &mode, rush_hour);
		let cost = geo::transport_cost(distance, &mode);

		let item = &mut items[i];
		item.distance_km = Some(distance);
		item.travel_time_min = Some(travel_time);
		item.cost = cost;
		item.end_time = format_hhmm(item.start_minutes() + travel_time as i64);
	}
	Ok(())
}

/// Step D (cost side): maps each item's type onto a cost bucket and sums
/// per-category and grand totals. This is the only place `cost_breakdown`
/// is computed — the oracle's own guess, if any, is discarded upstream.
fn accumulate_costs(days: &[DaySchedule]) -> (CostBreakdown, f64) {
	let mut breakdown = CostBreakdown::default();
	for day in days {
		for item in &day.activities {
			match item.item_type {
				ItemType::Hotel => breakdown.hotels += item.cost,
				ItemType::Activity => breakdown.activities += item.cost,
				ItemType::Meal => breakdown.meals += item.cost,
				ItemType::Transfer => breakdown.transport_estimate += item.cost,
			}
		}
	}
	let total = breakdown.total();
	(breakdown.rounded(), (total * 100.0).round() / 100.0)
}

/// Structural half of Step E, run before transport-mode enforcement: sorts
/// by start_time, drops overlapping items (keeping the earlier of any
/// overlapping pair), collapses runs of more than one transfer into a
/// single one, and inserts a placeholder transfer (mode unset) between any
/// pair of consecutive non-transfer items that lacks one. The placeholder's
/// mode and geo fields are filled in by the steps that follow, so a
/// repaired gap is enforced and enriched exactly like an oracle-authored
/// transfer.
fn normalize_structure(items: &mut Vec<ScheduleItem>) {
	drop_overlaps(items);

	let mut repaired: Vec<ScheduleItem> = Vec::with_capacity(items.len());
	let mut iter = std::mem::take(items).into_iter().peekable();
	while let Some(item) = iter.next() {
		let is_transfer = item.item_type == ItemType::Transfer;
		repaired.push(item);

		if is_transfer {
			while let Some(next) = iter.peek() {
				if next.item_type == ItemType::Transfer {
					iter.next();
				} else {
					break;
				}
			}
			continue;
		}

		if let Some(next) = iter.peek() {
			if next.item_type != ItemType::Transfer {
				let gap_start = repaired.last().unwrap().end_time.clone();
				let gap_end = next.start_time.clone();
				repaired.push(missing_transfer(&gap_start, &gap_end));
			}
		}
	}

	*items = repaired;
}

/// Step E proper, run after geo enrichment: a transfer's real travel time can
/// stretch its end_time past the following item's start — the canonical
/// time-slot template (§4.6) has back-to-back items with no slack, so this
/// is the common case, not an edge case. Resolved by pushing every
/// subsequent item in the day later by the overrun, cascading through the
/// rest of the day, rather than by dropping a real scheduled item.
fn shift_for_geo_overlaps(items: &mut [ScheduleItem]) {
	let mut shift: i64 = 0;
	let mut prev_end: Option<i64> = None;

	for item in items.iter_mut() {
		let mut start = item.start_minutes() + shift;
		let mut end = item.end_minutes() + shift;

		if let Some(prev_end) = prev_end {
			if start < prev_end {
				let overrun = prev_end - start;
				start += overrun;
				end += overrun;
				shift += overrun;
			}
		}

		item.start_time = format_hhmm(start);
		item.end_time = format_hhmm(end);
		prev_end = Some(end);
	}
}

fn drop_overlaps(items: &mut Vec<ScheduleItem>) {
	items.sort_by_key(|item| item.start_minutes());

	let mut deduped: Vec<ScheduleItem> = Vec::with_capacity(items.len());
	for item in std::mem::take(items) {
		if let Some(last) = deduped.last() {
			if item.start_minutes() < last.end_minutes() {
				warn!(target: "postprocess", place = %item.place_name, "dropping overlapping schedule item");
				continue;
			}
		}
		deduped.push(item);
	}
	*items = deduped;
}

fn missing_transfer(start_time: &str, end_time: &str) -> ScheduleItem {
	ScheduleItem {
		start_time: start_time.to_string(),
		end_time: end_time.to_string(),
		item_type: ItemType::Transfer,
		place_id: None,
		place_name: String::new(),
		description: "Repaired gap between consecutive items".to_string(),
		transport_mode: None,
		distance_km: None,
		travel_time_min: Some(parse_hhmm(end_time).saturating_sub(parse_hhmm(start_time)).max(5) as u32),
		cost: 0.0,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::FakeCatalogGateway;

	fn transfer(mode: &str) -> ScheduleItem {
		ScheduleItem {
			start_time: "10:00".to_string(),
			end_time: "10:10".to_string(),
			item_type: ItemType::Transfer,
			place_id: None,
			place_name: String::new(),
			description: String::new(),
			transport_mode: Some(mode.to_string()),
			distance_km: None,
			travel_time_min: None,
			cost: 0.0,
		}
	}

	#[tokio::test]
	async fn liked_mode_overrides_everything() {
		let gateway = FakeCatalogGateway::new();
		let mut prefs = Preferences::default();
		prefs.transport_modes.liked.insert("bike".to_string());
		let mut items = vec![transfer("taxi")];
		enforce_transport_modes(&mut items, &prefs, &gateway).await.unwrap();
		assert_eq!(items[0].transport_mode.as_deref(), Some("bike"));
	}

	#[tokio::test]
	async fn disliked_mode_falls_back_to_taxi() {
		let gateway = FakeCatalogGateway::new();
		let mut prefs = Preferences::default();
		prefs.transport_modes.disliked.insert("bus".to_string());
		let mut items = vec![transfer("bus")];
		enforce_transport_modes(&mut items, &prefs, &gateway).await.unwrap();
		assert_eq!(items[0].transport_mode.as_deref(), Some("taxi"));
	}

	#[tokio::test]
	async fn disliked_taxi_with_no_likes_falls_back_to_bus() {
		let gateway = FakeCatalogGateway::new();
		let mut prefs = Preferences::default();
		prefs.transport_modes.disliked.insert("taxi".to_string());
		let mut items = vec![transfer("taxi")];
		enforce_transport_modes(&mut items, &prefs, &gateway).await.unwrap();
		assert_eq!(items[0].transport_mode.as_deref(), Some("bus"));
	}

	#[tokio::test]
	async fn transport_id_resolves_via_gateway() {
		let gateway = FakeCatalogGateway::new().with_transport_mode("T0042", "scooter");
		let prefs = Preferences::default();
		let mut items = vec![transfer("T0042")];
		enforce_transport_modes(&mut items, &prefs, &gateway).await.unwrap();
		assert_eq!(items[0].transport_mode.as_deref(), Some("scooter"));
	}

	#[test]
	fn normalize_drops_overlapping_items_keeping_earlier() {
		let mut items = vec![
			ScheduleItem {
				start_time: "09:00".to_string(),
				end_time: "10:00".to_string(),
				item_type: ItemType::Activity,
				place_id: None,
				place_name: "A".to_string(),
				description: String::new(),
				transport_mode: None,
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			},
			ScheduleItem {
				start_time: "09:30".to_string(),
				end_time: "11:00".to_string(),
				item_type: ItemType::Activity,
				place_id: None,
				place_name: "B".to_string(),
				description: String::new(),
				transport_mode: None,
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			},
		];
		normalize_structure(&mut items);
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].place_name, "A");
	}

	#[test]
	fn normalize_inserts_missing_transfer_between_consecutive_non_transfers() {
		let mut items = vec![
			ScheduleItem {
				start_time: "09:00".to_string(),
				end_time: "10:00".to_string(),
				item_type: ItemType::Activity,
				place_id: None,
				place_name: "A".to_string(),
				description: String::new(),
				transport_mode: None,
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			},
			ScheduleItem {
				start_time: "10:15".to_string(),
				end_time: "11:00".to_string(),
				item_type: ItemType::Activity,
				place_id: None,
				place_name: "B".to_string(),
				description: String::new(),
				transport_mode: None,
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			},
		];
		normalize_structure(&mut items);
		assert_eq!(items.len(), 3);
		assert_eq!(items[1].item_type, ItemType::Transfer);
		assert_eq!(items[1].transport_mode, None);
	}

	#[test]
	fn geo_overlap_shifts_later_items_instead_of_dropping_them() {
		// A zero-width transfer inserted between two back-to-back items
		// (the canonical template has no slack) gets stretched by geo
		// enrichment; the following real item must survive, just pushed later.
		let mut items = vec![
			ScheduleItem {
				start_time: "08:00".to_string(),
				end_time: "09:30".to_string(),
				item_type: ItemType::Activity,
				place_id: Some("a1".to_string()),
				place_name: "A".to_string(),
				description: String::new(),
				transport_mode: None,
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			},
			ScheduleItem {
				start_time: "09:30".to_string(),
				end_time: "09:30".to_string(),
				item_type: ItemType::Transfer,
				place_id: None,
				place_name: "Transfer".to_string(),
				description: String::new(),
				transport_mode: Some("walk".to_string()),
				distance_km: Some(1.0),
				travel_time_min: Some(19),
				cost: 0.0,
			},
			ScheduleItem {
				start_time: "09:30".to_string(),
				end_time: "11:00".to_string(),
				item_type: ItemType::Activity,
				place_id: Some("a2".to_string()),
				place_name: "B".to_string(),
				description: String::new(),
				transport_mode: None,
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			},
		];
		// Simulate what enrich_geo does: stretch the transfer's end_time.
		items[1].end_time = format_hhmm(items[1].start_minutes() + 19);

		shift_for_geo_overlaps(&mut items);

		assert_eq!(items.len(), 3, "no item should be dropped");
		assert_eq!(items[2].place_id.as_deref(), Some("a2"));
		assert!(items[2].start_minutes() >= items[1].end_minutes());
		assert_eq!(items[2].start_minutes() - items[1].end_minutes(), 0);
	}

	#[test]
	fn accumulate_costs_maps_types_to_buckets() {
		let days = vec![DaySchedule {
			day: 1,
			activities: vec![
				ScheduleItem {
					start_time: "08:00".to_string(),
					end_time: "09:00".to_string(),
					item_type: ItemType::Hotel,
					place_id: None,
					place_name: "Hotel".to_string(),
					description: String::new(),
					transport_mode: None,
					distance_km: None,
					travel_time_min: None,
					cost: 40.0,
				},
				ScheduleItem {
					start_time: "09:10".to_string(),
					end_time: "09:20".to_string(),
					item_type: ItemType::Transfer,
					place_id: None,
					place_name: "T".to_string(),
					description: String::new(),
					transport_mode: Some("taxi".to_string()),
					distance_km: Some(1.0),
					travel_time_min: Some(5),
					cost: 1.2,
				},
			],
		}];
		let (breakdown, total) = accumulate_costs(&days);
		assert_eq!(breakdown.hotels, 40.0);
		assert_eq!(breakdown.transport_estimate, 1.2);
		assert!((total - 41.2).abs() < 1e-9);
	}
}
