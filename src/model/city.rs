/*
 * src/model/city.rs
 *
 * File for City table models
 *
 * Purpose:
 *   Strongly-typed model for a destination city as seen by the planning engine.
 */

use serde::{Deserialize, Serialize};

/// A destination or origin city known to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct City {
	/// Stable catalog identifier.
	pub id: i32,
	/// Display name, e.g. "Da Nang".
	pub name: String,
	/// Country name, e.g. "Vietnam".
	pub country: String,
}
