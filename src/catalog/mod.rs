/*
 * src/catalog/mod.rs
 *
 * File for the Catalog Gateway
 *
 * Purpose:
 *   Read-only access to the travel catalog (cities, places, transport mode
 *   tags, historical tour options). Every other component is generic over
 *   this trait so tests can swap in an in-memory fake without touching
 *   anything else.
 */

pub mod fake;
pub mod postgres;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::model::{HistoricalTourOption, Place, PlaceKind};

pub use fake::FakeCatalogGateway;
pub use postgres::PgCatalogGateway;

/// Read-only boundary between the planning engine and wherever the catalog
/// actually lives. Implementations must be side-effect-free and idempotent.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
	/// Display name of a city, or `CatalogError::NotFound`.
	async fn city_name(&self, city_id: i32) -> Result<String, CatalogError>;

	/// Places of `kind` in `city_id`, ordered by rating descending, capped at
	/// `limit`.
	async fn places_by_city(
		&self,
		city_id: i32,
		kind: PlaceKind,
		limit: usize,
	) -> Result<Vec<Place>, CatalogError>;

	/// Coordinates of a single place by id, if the catalog has them.
	async fn place_coords(
		&self,
		kind: PlaceKind,
		place_id: &str,
	) -> Result<Option<(f64, f64)>, CatalogError>;

	/// Resolves a catalog transport identifier to its canonical/catalog mode
	/// tag, e.g. `"T0042" -> "scooter"`.
	async fn transport_mode_of(&self, transport_id: &str) -> Result<String, CatalogError>;

	/// Historical tour options recorded for `destination_city_id`, optionally
	/// excluding one user (so a user's own history isn't treated as a peer).
	async fn tour_options_for_destination(
		&self,
		destination_city_id: i32,
		exclude_user_id: Option<&str>,
	) -> Result<Vec<HistoricalTourOption>, CatalogError>;

	/// Historical tour options catalog-wide, used by the regression fallback
	/// in field imputation when a destination has no history of its own.
	async fn tour_options_all(&self) -> Result<Vec<HistoricalTourOption>, CatalogError>;

	/// Count of historical tours recorded for a user, used to choose between
	/// the existing-user and cold-start branches.
	async fn tour_count_for_user(&self, user_id: &str) -> Result<u32, CatalogError>;

	/// A user's own historical tour options for `destination_city_id`, used by
	/// the existing-user branch.
	async fn tour_options_for_user(
		&self,
		user_id: &str,
		destination_city_id: i32,
	) -> Result<Vec<HistoricalTourOption>, CatalogError>;
}
