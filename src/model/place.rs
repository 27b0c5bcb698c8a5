/*
 * src/model/place.rs
 *
 * File for Place table models
 *
 * Purpose:
 *   Strongly-typed polymorphic model for catalog places (hotels, restaurants,
 *   activities, transports). Each component dispatches on the `Place` variant
 *   rather than on loosely-typed strings.
 */

use serde::{Deserialize, Serialize};

/// Coordinates of a place, when known. Absent coordinates fall back to
/// mode-based default geometry during post-processing (see [`crate::postprocess`]).
pub type Coords = (f64, f64);

/// A category of catalog entity. Mirrors the four place variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceKind {
	Hotel,
	Restaurant,
	Activity,
	Transport,
}

/// Common fields shared by every place variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceCommon {
	pub id: String,
	pub name: String,
	pub city_id: i32,
	/// Rating in `[0, 10]`.
	pub rating: f64,
	pub lat: Option<f64>,
	pub lon: Option<f64>,
	pub description: Option<String>,
}

/// A polymorphic catalog place. Each variant carries the common fields plus
/// the attributes unique to its category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Place {
	Hotel {
		#[serde(flatten)]
		common: PlaceCommon,
		price_per_night: f64,
	},
	Restaurant {
		#[serde(flatten)]
		common: PlaceCommon,
		price_avg: f64,
		cuisine_type: Option<String>,
	},
	Activity {
		#[serde(flatten)]
		common: PlaceCommon,
		price: f64,
		duration_hr: f64,
		activity_type: Option<String>,
	},
	Transport {
		#[serde(flatten)]
		common: PlaceCommon,
		avg_price_per_km: f64,
		min_price: f64,
		max_capacity: i32,
		/// Canonical or catalog-specific mode tag, e.g. "scooter" or "GrabBike".
		mode: String,
	},
}

impl Place {
	pub fn common(&self) -> &PlaceCommon {
		match self {
			Place::Hotel { common, .. }
			| Place::Restaurant { common, .. }
			| Place::Activity { common, .. }
			| Place::Transport { common, .. } => common,
		}
	}

	pub fn id(&self) -> &str {
		&self.common().id
	}

	pub fn name(&self) -> &str {
		&self.common().name
	}

	pub fn rating(&self) -> f64 {
		self.common().rating
	}

	pub fn coords(&self) -> Option<Coords> {
		let common = self.common();
		match (common.lat, common.lon) {
			(Some(lat), Some(lon)) => Some((lat, lon)),
			_ => None,
		}
	}

	pub fn kind(&self) -> PlaceKind {
		match self {
			Place::Hotel { .. } => PlaceKind::Hotel,
			Place::Restaurant { .. } => PlaceKind::Restaurant,
			Place::Activity { .. } => PlaceKind::Activity,
			Place::Transport { .. } => PlaceKind::Transport,
		}
	}

	/// The nightly/per-visit/per-km headline price used by candidate selection.
	/// Transport cost is excluded here since it is distance-dependent and
	/// computed by the geo kernel instead.
	pub fn headline_price(&self) -> f64 {
		match self {
			Place::Hotel { price_per_night, .. } => *price_per_night,
			Place::Restaurant { price_avg, .. } => *price_avg,
			Place::Activity { price, .. } => *price,
			Place::Transport { min_price, .. } => *min_price,
		}
	}
}
