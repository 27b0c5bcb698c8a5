/*
 * src/error.rs
 *
 * File for engine error types
 *
 * Purpose:
 *   Leaf error enums for each external boundary (Catalog Gateway, LLM
 *   oracle), composed into the single facade-level error a caller sees.
 *   Every non-fatal kind is absorbed into a degraded-but-valid Tour before it
 *   would ever reach PlanError; see the disposition table in SPEC_FULL.md §7.
 */

use thiserror::Error;

/// Errors raised by a [`crate::catalog::CatalogGateway`] implementation.
///
/// Carries no `sqlx` dependency at the trait level so an in-memory fake never
/// needs to construct a fake `sqlx::Error`; the `From` conversion lives on
/// the Postgres adapter alone.
#[derive(Debug, Error)]
pub enum CatalogError {
	#[error("catalog unavailable: {0}")]
	Unavailable(String),
	#[error("{kind} {id} not found")]
	NotFound { kind: &'static str, id: String },
}

impl From<sqlx::Error> for CatalogError {
	fn from(err: sqlx::Error) -> Self {
		CatalogError::Unavailable(err.to_string())
	}
}

/// Errors raised while calling or parsing the LLM oracle.
///
/// All three variants are caught at the LLM Planner Adapter (C6) boundary
/// and converted into a fallback draft; none propagate past it.
#[derive(Debug, Error)]
pub enum OracleError {
	#[error("oracle call timed out")]
	Timeout,
	#[error("oracle transport error: {0}")]
	Transport(String),
	#[error("oracle returned a malformed response: {0}")]
	Malformed(String),
}

/// The only error surface a caller of [`crate::planner::PlannerFacade`] sees.
/// Every other failure mode (oracle errors, missing coordinates, schedule
/// invariant violations, preference conflicts) is absorbed into the returned
/// `Tour` instead of reaching here.
#[derive(Debug, Error)]
pub enum PlanError {
	#[error("invalid request: {0}")]
	InvalidRequest(String),
	#[error(transparent)]
	Catalog(#[from] CatalogError),
}
