/*
 * src/similarity.rs
 *
 * File for the Similarity Engine
 *
 * Purpose:
 *   Pairwise user-tour similarity, top-K neighbor retrieval, field
 *   imputation for cold-start requests, and the existing-user/cold-start
 *   ranking blend used by the Planner Facade to pick a seed option.
 */

use std::collections::HashMap;

use crate::model::{HistoricalTourOption, TourRequest};

/// Small constant keeping the budget term's denominator away from zero.
const EPSILON: f64 = 1e-6;

/// Fixed fallback used when no historical data exists at all.
const DEFAULT_BUDGET_PER_GUEST_PER_DAY: f64 = 100.0;

/// A tour's comparable shape, independent of whether it came from the
/// current request (partially filled) or a historical option (fully known).
#[derive(Debug, Clone)]
pub struct QueryTour<'a> {
	pub user_id: Option<&'a str>,
	pub destination_city_id: i32,
	pub guest_count: Option<u32>,
	pub duration_days: Option<u32>,
	pub target_budget: Option<f64>,
	pub hotel_ids: &'a [String],
	pub activity_ids: &'a [String],
	pub restaurant_ids: &'a [String],
	pub transport_ids: &'a [String],
}

impl<'a> QueryTour<'a> {
	pub fn from_request(request: &'a TourRequest) -> Self {
		Self {
			user_id: request.user_id.as_deref(),
			destination_city_id: request.destination_city_id,
			guest_count: request.guest_count,
			duration_days: request.duration_days,
			target_budget: request.target_budget,
			hotel_ids: &request.hotel_ids,
			activity_ids: &request.activity_ids,
			restaurant_ids: &request.restaurant_ids,
			transport_ids: &request.transport_ids,
		}
	}

	pub fn from_history(option: &'a HistoricalTourOption) -> Self {
		Self {
			user_id: Some(option.user_id.as_str()),
			destination_city_id: option.destination_city_id,
			guest_count: Some(option.guest_count),
			duration_days: Some(option.duration_days),
			target_budget: Some(option.target_budget),
			hotel_ids: &option.hotel_ids,
			activity_ids: &option.activity_ids,
			restaurant_ids: &option.restaurant_ids,
			transport_ids: &option.transport_ids,
		}
	}

	/// Per-guest-per-day budget rate, when both inputs are known.
	fn budget_rate(&self) -> Option<f64> {
		let guests = self.guest_count?;
		let days = self.duration_days?;
		let budget = self.target_budget?;
		if guests == 0 || days == 0 {
			return None;
		}
		Some(budget / (guests as f64 * days as f64))
	}
}

/// Asymmetric Jaccard: the fraction of the *query* set `a` that also appears
/// in `b`. Intentionally not symmetrized — see the design notes on cold
/// start: a small new-user wishlist should be easily satisfied by a large
/// neighbor history.
fn jaccard(a: &[String], b: &[String]) -> f64 {
	if a.is_empty() {
		return 0.0;
	}
	let b_set: std::collections::HashSet<&String> = b.iter().collect();
	let shared = a.iter().filter(|id| b_set.contains(id)).count();
	shared as f64 / a.len() as f64
}

fn budget_term(query: &QueryTour, other: &QueryTour) -> f64 {
	match (query.budget_rate(), other.budget_rate()) {
		(Some(n_self), Some(n_other)) => {
			(n_self - n_other).abs() / (n_self + n_other + EPSILON)
		}
		_ => 0.0,
	}
}

/// Similarity score between `query` and `other`. `-infinity` unless both
/// share a destination and belong to different users.
pub fn score(query: &QueryTour, other: &QueryTour) -> f64 {
	let same_destination = query.destination_city_id == other.destination_city_id;
	let different_user = match (query.user_id, other.user_id) {
		(Some(a), Some(b)) => a != b,
		_ => true,
	};
	if !same_destination || !different_user {
		return f64::NEG_INFINITY;
	}

	budget_term(query, other)
		+ jaccard(query.hotel_ids, other.hotel_ids)
		+ jaccard(query.activity_ids, other.activity_ids)
		+ jaccard(query.restaurant_ids, other.restaurant_ids)
		+ jaccard(query.transport_ids, other.transport_ids)
}

/// Returns the `k` highest-scoring historical options for `query`, descending
/// by score. Options scoring `-infinity` are excluded.
pub fn top_k<'a>(
	query: &QueryTour,
	candidates: &'a [HistoricalTourOption],
	k: usize,
) -> Vec<(&'a HistoricalTourOption, f64)> {
	let mut scored: Vec<(&HistoricalTourOption, f64)> = candidates
		.iter()
		.map(|option| (option, score(query, &QueryTour::from_history(option))))
		.filter(|(_, s)| s.is_finite())
		.collect();
	scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
	scored.truncate(k);
	scored
}

/// The blend used to rank a user's own options, or a neighbor's options,
/// when choosing a single seed: `0.5 * budget_similarity + 0.5 * (rating/10)`.
/// `budget_similarity` is `1 - budget_term` against the query so that a
/// closer budget rate scores higher.
pub fn rank_blend(query: &QueryTour, option: &HistoricalTourOption) -> f64 {
	let other = QueryTour::from_history(option);
	let budget_similarity = 1.0 - budget_term(query, &other);
	0.5 * budget_similarity + 0.5 * (option.rating / 10.0)
}

/// Picks the option maximizing [`rank_blend`] against `query`.
pub fn best_by_blend<'a>(
	query: &QueryTour,
	options: &'a [HistoricalTourOption],
) -> Option<&'a HistoricalTourOption> {
	options
		.iter()
		.max_by(|a, b| rank_blend(query, a).partial_cmp(&rank_blend(query, b)).unwrap())
}

/// Most frequently occurring id across `neighbors`' id-lists, ties broken by
/// first occurrence order; returns up to 3 ids.
fn top_ids(lists: impl Iterator<Item = impl IntoIterator<Item = String>>) -> Vec<String> {
	let mut counts: HashMap<String, usize> = HashMap::new();
	let mut order: Vec<String> = Vec::new();
	for list in lists {
		for id in list {
			if !counts.contains_key(&id) {
				order.push(id.clone());
			}
			*counts.entry(id).or_insert(0) += 1;
		}
	}
	order.sort_by(|a, b| counts[b].cmp(&counts[a]));
	order.truncate(3);
	order
}

fn mode_of(values: impl Iterator<Item = i32>) -> Option<i32> {
	let mut counts: HashMap<i32, usize> = HashMap::new();
	let mut order: Vec<i32> = Vec::new();
	for v in values {
		if !counts.contains_key(&v) {
			order.push(v);
		}
		*counts.entry(v).or_insert(0) += 1;
	}
	order.into_iter().max_by_key(|v| counts[v])
}

fn mean(values: impl Iterator<Item = f64> + Clone) -> Option<f64> {
	let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
	(n > 0).then_some(sum / n as f64)
}

/// Ordinary least-squares fit of `target_budget ~ b0 + b1*duration_days +
/// b2*guest_count` over `options`, solved via the normal equations on the 3x3
/// Gram matrix. Returns `None` if the matrix is singular (fewer than 3
/// options, or degenerate inputs).
fn fit_budget_regression(options: &[HistoricalTourOption]) -> Option<[f64; 3]> {
	if options.len() < 3 {
		return None;
	}

	// Design matrix columns: [1, duration_days, guest_count].
	let rows: Vec<[f64; 3]> = options
		.iter()
		.map(|o| [1.0, o.duration_days as f64, o.guest_count as f64])
		.collect();
	let targets: Vec<f64> = options.iter().map(|o| o.target_budget).collect();

	let mut gram = [[0.0_f64; 3]; 3];
	let mut rhs = [0.0_f64; 3];
	for (row, target) in rows.iter().zip(targets.iter()) {
		for i in 0..3 {
			rhs[i] += row[i] * target;
			for j in 0..3 {
				gram[i][j] += row[i] * row[j];
			}
		}
	}

	solve_3x3(gram, rhs)
}

/// Solves `gram * x = rhs` via Cramer's rule; `None` if `gram` is singular.
fn solve_3x3(gram: [[f64; 3]; 3], rhs: [f64; 3]) -> Option<[f64; 3]> {
	fn det3(m: [[f64; 3]; 3]) -> f64 {
		m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
			- m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
			+ m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
	}

	let det = det3(gram);
	if det.abs() < 1e-9 {
		return None;
	}

	let mut solution = [0.0; 3];
	for col in 0..3 {
		let mut replaced = gram;
		for row in 0..3 {
			replaced[row][col] = rhs[row];
		}
		solution[col] = det3(replaced) / det;
	}
	Some(solution)
}

/// Estimates a missing `target_budget` from `(duration_days, guest_count)`
/// via least-squares regression over `all_options`, falling back to the
/// unweighted mean, and finally to a fixed per-guest-per-day default.
pub fn impute_budget(
	all_options: &[HistoricalTourOption],
	duration_days: u32,
	guest_count: u32,
) -> f64 {
	if let Some([b0, b1, b2]) = fit_budget_regression(all_options) {
		return b0 + b1 * duration_days as f64 + b2 * guest_count as f64;
	}
	if let Some(avg) = mean(all_options.iter().map(|o| o.target_budget)) {
		return avg;
	}
	DEFAULT_BUDGET_PER_GUEST_PER_DAY * guest_count as f64 * duration_days as f64
}

/// Imputes every missing numeric/categorical field on `request` using
/// `neighbors` (already narrowed to the top-K for the destination), and
/// `all_options` as the catalog-wide fallback pool for budget regression.
pub fn impute_request(
	request: &TourRequest,
	neighbors: &[&HistoricalTourOption],
	all_options: &[HistoricalTourOption],
) -> TourRequest {
	let mut imputed = request.clone();

	if imputed.guest_count.is_none() {
		imputed.guest_count = mean(neighbors.iter().map(|o| o.guest_count as f64))
			.map(|v| v.round().max(1.0) as u32)
			.or(Some(1));
	}
	if imputed.duration_days.is_none() {
		imputed.duration_days = mean(neighbors.iter().map(|o| o.duration_days as f64))
			.map(|v| v.round().max(1.0) as u32)
			.or(Some(1));
	}
	if imputed.start_city_id.is_none() {
		imputed.start_city_id = mode_of(neighbors.iter().filter_map(|o| o.start_city_id));
	}
	if imputed.hotel_ids.is_empty() {
		imputed.hotel_ids = top_ids(neighbors.iter().map(|o| o.hotel_ids.clone()));
	}
	if imputed.activity_ids.is_empty() {
		imputed.activity_ids = top_ids(neighbors.iter().map(|o| o.activity_ids.clone()));
	}
	if imputed.restaurant_ids.is_empty() {
		imputed.restaurant_ids = top_ids(neighbors.iter().map(|o| o.restaurant_ids.clone()));
	}
	if imputed.transport_ids.is_empty() {
		imputed.transport_ids = top_ids(neighbors.iter().map(|o| o.transport_ids.clone()));
	}
	if imputed.target_budget.is_none() {
		let duration = imputed.duration_days.unwrap_or(1);
		let guests = imputed.guest_count.unwrap_or(1);
		imputed.target_budget = Some(impute_budget(all_options, duration, guests));
	}

	imputed
}
