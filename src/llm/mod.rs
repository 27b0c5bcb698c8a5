/*
 * src/llm/mod.rs
 *
 * File for the LLM Planner Adapter
 *
 * Purpose:
 *   Builds the structured prompt, calls the oracle through the
 *   `langchain_rust` `LLM` trait object, and extracts/validates the JSON
 *   draft. Never talks to a vendor SDK directly — the oracle boundary is
 *   whatever `Arc<dyn LLM + Send + Sync>` the caller hands in, matching the
 *   `MockLLM`/`OpenAI` split already used elsewhere in this codebase.
 */

mod prompt;

use std::sync::Arc;
use std::time::Duration;

use langchain_rust::language_models::llm::LLM;
use tracing::{debug, warn};

use crate::candidates::CandidatePools;
use crate::error::OracleError;
use crate::model::{DaySchedule, ItemType, Preferences, ResolvedRequest, ScheduleItem};

pub use prompt::build_prompt;

/// Default oracle call timeout, per the concurrency model's recommendation.
const ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw shape the oracle is asked to emit; only `days` is trusted downstream —
/// `total_cost`/`within_budget`/`cost_breakdown` are the oracle's own guesses
/// and are discarded by the Schedule Post-Processor.
#[derive(Debug, serde::Deserialize)]
struct OracleDraft {
	#[serde(default)]
	days: Vec<DaySchedule>,
}

/// Stateless LLM Planner Adapter: given (prompt, oracle_output) its behavior
/// is deterministic. Holds a single immutable oracle handle and timeout.
pub struct LlmPlannerAdapter {
	oracle: Arc<dyn LLM + Send + Sync>,
	timeout: Duration,
}

impl LlmPlannerAdapter {
	pub fn new(oracle: Arc<dyn LLM + Send + Sync>) -> Self {
		Self { oracle, timeout: ORACLE_TIMEOUT }
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Builds the prompt, calls the oracle under a timeout, and returns a
	/// draft schedule. Any oracle failure (timeout, transport error, or a
	/// JSON-shape mismatch) is folded into a fallback draft — this never
	/// returns an error to its caller.
	pub async fn plan_draft(
		&self,
		request: &ResolvedRequest,
		pools: &CandidatePools,
	) -> (Vec<DaySchedule>, Option<String>) {
		let prompt_text = build_prompt(request, pools, &request.preferences);

		match self.call_oracle(&prompt_text).await {
			Ok(days) => (days, None),
			Err(err) => {
				warn!(target: "llm", error = %err, "oracle draft failed, using fallback schedule");
				(
					fallback_schedule(request.duration_days, &request.preferences),
					Some(err.to_string()),
				)
			}
		}
	}

	async fn call_oracle(&self, prompt_text: &str) -> Result<Vec<DaySchedule>, OracleError> {
		let raw = match tokio::time::timeout(self.timeout, self.oracle.invoke(prompt_text)).await {
			Ok(Ok(text)) => text,
			Ok(Err(err)) => return Err(OracleError::Transport(err.to_string())),
			Err(_) => return Err(OracleError::Timeout),
		};

		parse_draft(&raw)
	}
}

/// Strips Markdown code fences (if present) and parses the oracle's raw text
/// as an [`OracleDraft`].
fn parse_draft(raw: &str) -> Result<Vec<DaySchedule>, OracleError> {
	let cleaned = raw
		.trim()
		.trim_start_matches("```json")
		.trim_start_matches("```")
		.trim_end_matches("```")
		.trim();

	if cleaned.is_empty() {
		return Err(OracleError::Malformed("empty oracle response".to_string()));
	}

	let draft: OracleDraft =
		serde_json::from_str(cleaned).map_err(|err| OracleError::Malformed(err.to_string()))?;

	debug!(target: "llm", days = draft.days.len(), "parsed oracle draft");
	Ok(draft.days)
}

/// A duration-days-long skeleton with a single transfer placeholder per day,
/// used both for JSON-parse failures and for oracle transport/timeout
/// errors. The preferred transport mode is the first liked mode if any,
/// else `bus` when `taxi` is disliked, else `taxi`.
pub fn fallback_schedule(duration_days: u32, preferences: &Preferences) -> Vec<DaySchedule> {
	let mode = preferred_fallback_mode(preferences);

	(1..=duration_days)
		.map(|day| DaySchedule {
			day,
			activities: vec![ScheduleItem {
				start_time: "08:00".to_string(),
				end_time: "08:10".to_string(),
				item_type: ItemType::Transfer,
				place_id: None,
				place_name: "Transfer".to_string(),
				description: "Fallback transfer placeholder".to_string(),
				transport_mode: Some(mode.clone()),
				distance_km: None,
				travel_time_min: None,
				cost: 0.0,
			}],
		})
		.collect()
}

fn preferred_fallback_mode(preferences: &Preferences) -> String {
	if let Some(mode) = preferences.transport_modes.liked.iter().next() {
		return mode.clone();
	}
	if preferences.transport_modes.is_disliked("taxi") {
		return "bus".to_string();
	}
	"taxi".to_string()
}
