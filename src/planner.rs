/*
 * src/planner.rs
 *
 * File for the Planner Facade
 *
 * Purpose:
 *   Orchestrates C1-C7 into the single public entry point a caller (an HTTP
 *   handler, a CLI, a batch job — all out of scope here) invokes. The
 *   existing-user/cold-start branch choice is made once, near the top, as a
 *   `SeedStrategy`; every step after that is strategy-agnostic.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, instrument};

use crate::candidates::{self, CandidatePools};
use crate::catalog::CatalogGateway;
use crate::error::PlanError;
use crate::llm::LlmPlannerAdapter;
use crate::model::{HistoricalTourOption, ResolvedRequest, Tour, TourRequest};
use crate::postprocess;
use crate::preferences::resolve_preferences;
use crate::similarity::{self, QueryTour};

/// The number of neighbors retrieved in the cold-start branch.
const TOP_K_NEIGHBORS: usize = 5;

/// Which path produced the seed option used to imput missing request
/// fields, if any. Selected once per call; C5 through C7 never branch on it.
#[derive(Debug, Clone)]
pub enum SeedStrategy {
	/// The user has more than one historical tour for this destination;
	/// the seed is the best of their own past options.
	Existing(HistoricalTourOption),
	/// The user has zero or one historical tour; the seed is the best
	/// option among the top-K similar neighbors (or a same-destination /
	/// catalog-wide fallback option if no neighbors scored).
	ColdStart(HistoricalTourOption),
	/// No seed could be found anywhere; the raw (possibly partially
	/// imputed) request is used as-is.
	None,
}

/// Orchestrates a single planning call end to end.
pub struct PlannerFacade {
	gateway: Arc<dyn CatalogGateway>,
	llm: LlmPlannerAdapter,
}

impl PlannerFacade {
	pub fn new(gateway: Arc<dyn CatalogGateway>, llm: LlmPlannerAdapter) -> Self {
		Self { gateway, llm }
	}

	/// Plans one itinerary. The only error this can return is a fatal one —
	/// `InvalidRequest` or `Catalog` — every other failure mode is absorbed
	/// into a degraded-but-valid [`Tour`].
	#[instrument(skip(self, request), fields(destination = request.destination_city_id))]
	pub async fn plan(&self, request: TourRequest) -> Result<Tour, PlanError> {
		if request.destination_city_id <= 0 {
			return Err(PlanError::InvalidRequest(
				"destination_city_id is required".to_string(),
			));
		}

		let destination_name = self.gateway.city_name(request.destination_city_id).await?;
		let start_name = match request.start_city_id {
			Some(id) => self.gateway.city_name(id).await.unwrap_or_default(),
			None => String::new(),
		};

		let (strategy, neighbors) = self.choose_strategy(&request).await?;
		info!(target: "planner", strategy = strategy_label(&strategy), neighbors = neighbors.len(), "seed strategy chosen");

		let resolved = self.resolve_request(request, &neighbors).await?;

		let preferences = resolve_preferences(self.gateway.as_ref(), &resolved.user_preferences)
			.await
			.map_err(PlanError::Catalog)?;
		let resolved = ResolvedRequest {
			user_id: resolved.user_id,
			start_city_id: resolved.start_city_id,
			destination_city_id: resolved.destination_city_id,
			guest_count: resolved.guest_count.unwrap_or(1),
			duration_days: resolved.duration_days.unwrap_or(1),
			target_budget: resolved.target_budget.unwrap_or(0.0),
			hotel_ids: resolved.hotel_ids,
			activity_ids: resolved.activity_ids,
			restaurant_ids: resolved.restaurant_ids,
			transport_ids: resolved.transport_ids,
			preferences,
		};

		let pools = candidates::select_candidates(self.gateway.as_ref(), &resolved)
			.await
			.map_err(PlanError::Catalog)?;

		let (draft_days, oracle_error) = self.llm.plan_draft(&resolved, &pools).await;

		let (days, breakdown, total_cost, within_budget) = postprocess::post_process(
			self.gateway.as_ref(),
			draft_days,
			&resolved.preferences,
			&pools,
			resolved.target_budget,
		)
		.await
		.map_err(PlanError::Catalog)?;

		Ok(Tour {
			tour_id: next_tour_id(resolved.destination_city_id),
			user_id: resolved.user_id.unwrap_or_default(),
			start_city: start_name,
			destination_city: destination_name,
			duration_days: resolved.duration_days,
			guest_count: resolved.guest_count,
			budget: resolved.target_budget,
			total_estimated_cost: total_cost,
			within_budget,
			cost_breakdown: breakdown,
			schedule: days,
			error: oracle_error,
		})
	}

	/// Step 3-4: decides existing-user vs cold-start, and fetches a seed
	/// option via whichever branch applies. Also returns the neighbor pool
	/// the seed was chosen from — the user's own past options for the
	/// existing-user branch, the top-K destination neighbors for cold-start —
	/// so `resolve_request` can impute means/modes/top-ids over the whole
	/// pool rather than just the single best-blended option.
	async fn choose_strategy(
		&self,
		request: &TourRequest,
	) -> Result<(SeedStrategy, Vec<HistoricalTourOption>), PlanError> {
		let Some(user_id) = request.user_id.as_deref() else {
			return self.cold_start_strategy(request).await;
		};

		let tour_count = self.gateway.tour_count_for_user(user_id).await?;
		if tour_count > 1 {
			let own_options = self
				.gateway
				.tour_options_for_user(user_id, request.destination_city_id)
				.await?;
			let query = QueryTour::from_request(request);
			if let Some(best) = similarity::best_by_blend(&query, &own_options) {
				let seed = best.clone();
				return Ok((SeedStrategy::Existing(seed), own_options));
			}
		}

		self.cold_start_strategy(request).await
	}

	async fn cold_start_strategy(
		&self,
		request: &TourRequest,
	) -> Result<(SeedStrategy, Vec<HistoricalTourOption>), PlanError> {
		let destination_options = self
			.gateway
			.tour_options_for_destination(request.destination_city_id, request.user_id.as_deref())
			.await?;

		let query = QueryTour::from_request(request);
		let neighbors = similarity::top_k(&query, &destination_options, TOP_K_NEIGHBORS);
		let neighbor_options: Vec<HistoricalTourOption> = neighbors.iter().map(|(o, _)| (*o).clone()).collect();

		if let Some(best) = similarity::best_by_blend(&query, &neighbor_options) {
			let seed = best.clone();
			return Ok((SeedStrategy::ColdStart(seed), neighbor_options));
		}
		if let Some(best) = similarity::best_by_blend(&query, &destination_options) {
			let seed = best.clone();
			return Ok((SeedStrategy::ColdStart(seed), destination_options));
		}

		let all_options = self.gateway.tour_options_all().await?;
		if let Some(best) = similarity::best_by_blend(&query, &all_options) {
			let seed = best.clone();
			return Ok((SeedStrategy::ColdStart(seed), all_options));
		}

		Ok((SeedStrategy::None, Vec::new()))
	}

	/// Imputes any still-missing numeric/categorical/id-set fields on the
	/// request using the full neighbor pool `choose_strategy` retrieved
	/// (mean/mode/top-ids over all of them), per the Similarity Engine's
	/// field-imputation rule.
	async fn resolve_request(
		&self,
		request: TourRequest,
		neighbors: &[HistoricalTourOption],
	) -> Result<TourRequest, PlanError> {
		let needs_imputation = request.guest_count.is_none()
			|| request.duration_days.is_none()
			|| request.target_budget.is_none()
			|| request.start_city_id.is_none()
			|| request.hotel_ids.is_empty()
			|| request.activity_ids.is_empty()
			|| request.restaurant_ids.is_empty()
			|| request.transport_ids.is_empty();

		if !needs_imputation {
			return Ok(request);
		}

		let neighbor_refs: Vec<&HistoricalTourOption> = neighbors.iter().collect();
		let all_options = self.gateway.tour_options_all().await?;
		Ok(similarity::impute_request(&request, &neighbor_refs, &all_options))
	}
}

static TOUR_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-local unique tour identifier. Tours are never persisted by this
/// engine (out of scope), so a monotonic counter scoped to the destination
/// is sufficient to disambiguate concurrent calls within one process.
fn next_tour_id(destination_city_id: i32) -> String {
	let seq = TOUR_SEQ.fetch_add(1, Ordering::Relaxed);
	format!("tour-{destination_city_id}-{seq}")
}

fn strategy_label(strategy: &SeedStrategy) -> &'static str {
	match strategy {
		SeedStrategy::Existing(_) => "existing",
		SeedStrategy::ColdStart(_) => "cold_start",
		SeedStrategy::None => "none",
	}
}
