/*
 * tests/planner.rs
 *
 * Black-box integration tests for the full planning pipeline (C1-C8),
 * covering scenarios S1-S6 and the quantified invariants, against a
 * `FakeCatalogGateway` seeded with a small destination and a scripted
 * oracle double.
 */

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use langchain_rust::language_models::llm::LLM;
use langchain_rust::language_models::{GenerateResult, LLMError};
use langchain_rust::schemas::{Message, StreamData};
use serde_json::Value;
use wayfarer_planner::catalog::FakeCatalogGateway;
use wayfarer_planner::llm::LlmPlannerAdapter;
use wayfarer_planner::model::{
	City, DaySchedule, ItemType, Place, PlaceCommon, ScheduleItem, TourRequest,
};
use wayfarer_planner::planner::PlannerFacade;

/// An oracle double that always returns the same scripted text, mirroring
/// this codebase's `MockLLM` but with a configurable response.
#[derive(Clone)]
struct ScriptedLLM {
	response: String,
}

#[async_trait]
impl LLM for ScriptedLLM {
	async fn generate(&self, _messages: &[Message]) -> Result<GenerateResult, LLMError> {
		Ok(GenerateResult { generation: self.response.clone(), tokens: None })
	}

	async fn stream(
		&self,
		_messages: &[Message],
	) -> Result<Pin<Box<dyn Stream<Item = Result<StreamData, LLMError>> + Send>>, LLMError> {
		let response = StreamData::new(Value::String(self.response.clone()), None, self.response.clone());
		Ok(Box::pin(stream::once(async move { Ok(response) })))
	}
}

fn destination_catalog() -> FakeCatalogGateway {
	FakeCatalogGateway::new()
		.with_city(City { id: 1, name: "Testville".to_string(), country: "Testland".to_string() })
		.with_place(Place::Hotel {
			common: PlaceCommon {
				id: "h1".to_string(),
				name: "Lotus Hotel".to_string(),
				city_id: 1,
				rating: 8.0,
				lat: Some(10.0),
				lon: Some(106.0),
				description: None,
			},
			price_per_night: 40.0,
		})
		.with_place(Place::Restaurant {
			common: PlaceCommon {
				id: "r1".to_string(),
				name: "Pho House".to_string(),
				city_id: 1,
				rating: 8.5,
				lat: Some(10.01),
				lon: Some(106.01),
				description: None,
			},
			price_avg: 8.0,
			cuisine_type: None,
		})
		.with_place(Place::Restaurant {
			common: PlaceCommon {
				id: "r2".to_string(),
				name: "Night Market".to_string(),
				city_id: 1,
				rating: 7.5,
				lat: Some(10.02),
				lon: Some(106.02),
				description: None,
			},
			price_avg: 6.0,
			cuisine_type: None,
		})
		.with_place(Place::Activity {
			common: PlaceCommon {
				id: "a1".to_string(),
				name: "Old Quarter Walk".to_string(),
				city_id: 1,
				rating: 9.0,
				lat: Some(10.03),
				lon: Some(106.03),
				description: None,
			},
			price: 0.0,
			duration_hr: 1.5,
			activity_type: None,
		})
		.with_place(Place::Activity {
			common: PlaceCommon {
				id: "a2".to_string(),
				name: "River Cruise".to_string(),
				city_id: 1,
				rating: 8.2,
				lat: Some(10.04),
				lon: Some(106.04),
				description: None,
			},
			price: 15.0,
			duration_hr: 1.5,
			activity_type: None,
		})
		.with_place(Place::Activity {
			common: PlaceCommon {
				id: "a3".to_string(),
				name: "Museum".to_string(),
				city_id: 1,
				rating: 7.8,
				lat: Some(10.05),
				lon: Some(106.05),
				description: None,
			},
			price: 5.0,
			duration_hr: 1.0,
			activity_type: None,
		})
		.with_place(Place::Activity {
			common: PlaceCommon {
				id: "a4".to_string(),
				name: "Night Bike Tour".to_string(),
				city_id: 1,
				rating: 7.0,
				lat: Some(10.06),
				lon: Some(106.06),
				description: None,
			},
			price: 10.0,
			duration_hr: 1.5,
			activity_type: None,
		})
		.with_transport_mode("T0042", "scooter")
}

/// Builds a canned oracle draft covering the canonical time-slot template,
/// `duration_days` long, with no explicit transfer items — the post
/// processor's invariant sweep is responsible for inserting them.
fn canned_draft_json(duration_days: u32) -> String {
	fn item(start: &str, end: &str, kind: ItemType, place_id: &str, name: &str, cost: f64) -> ScheduleItem {
		ScheduleItem {
			start_time: start.to_string(),
			end_time: end.to_string(),
			item_type: kind,
			place_id: Some(place_id.to_string()),
			place_name: name.to_string(),
			description: String::new(),
			transport_mode: None,
			distance_km: None,
			travel_time_min: None,
			cost,
		}
	}

	let days: Vec<DaySchedule> = (1..=duration_days)
		.map(|day| DaySchedule {
			day,
			activities: vec![
				item("08:00", "09:30", ItemType::Activity, "a1", "Old Quarter Walk", 0.0),
				item("09:30", "11:00", ItemType::Activity, "a2", "River Cruise", 15.0),
				item("11:00", "12:00", ItemType::Hotel, "h1", "Lotus Hotel", 0.0),
				item("12:00", "14:00", ItemType::Meal, "r1", "Pho House", 8.0),
				item("14:00", "15:00", ItemType::Activity, "a3", "Museum", 5.0),
				item("15:00", "16:30", ItemType::Activity, "a4", "Night Bike Tour", 10.0),
				item("16:30", "18:00", ItemType::Hotel, "h1", "Lotus Hotel", 0.0),
				item("18:00", "20:00", ItemType::Meal, "r2", "Night Market", 6.0),
				item("20:00", "23:00", ItemType::Hotel, "h1", "Lotus Hotel", 40.0),
			],
		})
		.collect();

	serde_json::to_string(&serde_json::json!({ "days": days })).unwrap()
}

fn base_request(destination_city_id: i32, guest_count: u32, duration_days: u32, target_budget: f64) -> TourRequest {
	TourRequest {
		user_id: None,
		start_city_id: None,
		destination_city_id,
		guest_count: Some(guest_count),
		duration_days: Some(duration_days),
		target_budget: Some(target_budget),
		hotel_ids: vec![],
		activity_ids: vec![],
		restaurant_ids: vec![],
		transport_ids: vec![],
		user_preferences: Default::default(),
	}
}

fn facade_with_response(response: &str) -> PlannerFacade {
	let gateway = Arc::new(destination_catalog());
	let oracle = Arc::new(ScriptedLLM { response: response.to_string() });
	PlannerFacade::new(gateway, LlmPlannerAdapter::new(oracle))
}

/// The canonical time-slot template's place_ids, in order, from
/// `canned_draft_json` — the activities/meals/hotel stays a full day should
/// still contain after post-processing, regardless of which transfers were
/// inserted or repaired between them.
const CANONICAL_PLACE_IDS: [&str; 9] = ["a1", "a2", "h1", "r1", "a3", "a4", "h1", "r2", "h1"];

fn assert_core_invariants(tour: &wayfarer_planner::Tour) {
	for day in &tour.schedule {
		let mut prev_end: Option<i64> = None;
		let types: Vec<ItemType> = day.activities.iter().map(|item| item.item_type).collect();
		for (i, item) in day.activities.iter().enumerate() {
			let start = item.start_minutes();
			if let Some(prev_end) = prev_end {
				assert!(start >= prev_end, "items must not overlap");
			}
			if i > 0 {
				let prev_is_transfer = types[i - 1] == ItemType::Transfer;
				let this_is_transfer = item.item_type == ItemType::Transfer;
				assert!(
					prev_is_transfer != this_is_transfer,
					"a transfer must separate every pair of consecutive non-transfer items, and transfers must not be adjacent"
				);
			}
			prev_end = Some(item.end_minutes());
		}
	}
	let expected: f64 = tour
		.schedule
		.iter()
		.flat_map(|d| d.activities.iter())
		.map(|i| i.cost)
		.sum();
	assert!((expected - tour.total_estimated_cost).abs() < 0.05);
	assert_eq!(tour.within_budget, tour.total_estimated_cost <= tour.budget);
}

/// Asserts every day's non-transfer items are exactly the canonical
/// time-slot template's places, in order — i.e. post-processing enriched
/// and repaired the schedule without dropping any real scheduled item.
fn assert_canonical_items_survive(tour: &wayfarer_planner::Tour) {
	for day in &tour.schedule {
		let non_transfer_ids: Vec<&str> = day
			.activities
			.iter()
			.filter(|item| item.item_type != ItemType::Transfer)
			.filter_map(|item| item.place_id.as_deref())
			.collect();
		assert_eq!(
			non_transfer_ids,
			CANONICAL_PLACE_IDS,
			"day {} lost or reordered canonical time-slot items",
			day.day
		);
	}
}

#[tokio::test]
async fn s1_pure_cold_start_no_preferences() {
	let facade = facade_with_response(&canned_draft_json(2));
	let request = base_request(1, 2, 2, 400.0);
	let tour = facade.plan(request).await.unwrap();

	assert_eq!(tour.schedule.len(), 2);
	assert!(tour.within_budget);
	assert_core_invariants(&tour);
	assert_canonical_items_survive(&tour);
}

#[tokio::test]
async fn s2_liked_transport_mode_is_enforced() {
	let facade = facade_with_response(&canned_draft_json(2));
	let mut request = base_request(1, 2, 2, 400.0);
	request.user_preferences.liked_transport_modes = vec!["bike".to_string()];
	let tour = facade.plan(request).await.unwrap();

	assert_core_invariants(&tour);
	assert_canonical_items_survive(&tour);
	for day in &tour.schedule {
		for item in &day.activities {
			if item.item_type == ItemType::Transfer {
				assert_eq!(item.transport_mode.as_deref(), Some("bike"));
			}
		}
	}
}

#[tokio::test]
async fn s3_disliked_transport_mode_is_avoided() {
	let facade = facade_with_response(&canned_draft_json(2));
	let mut request = base_request(1, 2, 2, 400.0);
	request.user_preferences.disliked_transport_modes = vec!["taxi".to_string()];
	let tour = facade.plan(request).await.unwrap();

	assert_core_invariants(&tour);
	assert_canonical_items_survive(&tour);
	for day in &tour.schedule {
		for item in &day.activities {
			if item.item_type == ItemType::Transfer {
				assert_ne!(item.transport_mode.as_deref(), Some("taxi"));
			}
		}
	}
}

#[tokio::test]
async fn s4_id_shaped_transport_mode_resolves_via_catalog() {
	let facade = facade_with_response(&canned_draft_json(2));
	let mut request = base_request(1, 2, 2, 400.0);
	request.user_preferences.liked_transport_modes = vec!["T0042".to_string()];
	let tour = facade.plan(request).await.unwrap();

	assert_core_invariants(&tour);
	assert_canonical_items_survive(&tour);
	for day in &tour.schedule {
		for item in &day.activities {
			if item.item_type == ItemType::Transfer {
				assert_eq!(item.transport_mode.as_deref(), Some("scooter"));
			}
		}
	}
}

#[tokio::test]
async fn s5_llm_failure_falls_back_but_stays_valid() {
	let facade = facade_with_response("");
	let request = base_request(1, 2, 2, 400.0);
	let tour = facade.plan(request).await.unwrap();

	assert_eq!(tour.schedule.len(), 2);
	assert!(tour.error.is_some());
	for day in &tour.schedule {
		assert_eq!(day.activities.len(), 1);
		assert_eq!(day.activities[0].item_type, ItemType::Transfer);
	}
}

#[tokio::test]
async fn s6_budget_overflow_is_flagged() {
	let facade = facade_with_response(&canned_draft_json(3));
	let request = base_request(1, 2, 3, 50.0);
	let tour = facade.plan(request).await.unwrap();

	assert!(!tour.within_budget);
	assert!(tour.cost_breakdown.total() > 0.0);
	assert_core_invariants(&tour);
	assert_canonical_items_survive(&tour);
}

#[tokio::test]
async fn invalid_request_is_rejected() {
	let facade = facade_with_response("{}");
	let request = base_request(0, 2, 2, 400.0);
	let result = facade.plan(request).await;
	assert!(result.is_err());
}
