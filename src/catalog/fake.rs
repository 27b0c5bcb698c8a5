/*
 * src/catalog/fake.rs
 *
 * File for the in-memory Catalog Gateway fake
 *
 * Purpose:
 *   `CatalogGateway` backed by plain `Vec`s, seeded by hand in tests. Not
 *   `cfg(test)`-gated so both unit and the black-box `tests/` integration
 *   suite can construct one, mirroring this codebase's `MockLLM`.
 */

use async_trait::async_trait;

use crate::catalog::CatalogGateway;
use crate::error::CatalogError;
use crate::model::{City, HistoricalTourOption, Place, PlaceKind};

/// Hand-seedable stand-in for a real catalog store.
#[derive(Debug, Clone, Default)]
pub struct FakeCatalogGateway {
	pub cities: Vec<City>,
	pub places: Vec<Place>,
	pub transport_modes: Vec<(String, String)>,
	pub tour_options: Vec<HistoricalTourOption>,
}

impl FakeCatalogGateway {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_city(mut self, city: City) -> Self {
		self.cities.push(city);
		self
	}

	pub fn with_place(mut self, place: Place) -> Self {
		self.places.push(place);
		self
	}

	/// Registers a transport identifier -> canonical mode tag mapping.
	pub fn with_transport_mode(mut self, transport_id: &str, mode: &str) -> Self {
		self.transport_modes
			.push((transport_id.to_string(), mode.to_string()));
		self
	}

	pub fn with_tour_option(mut self, option: HistoricalTourOption) -> Self {
		self.tour_options.push(option);
		self
	}
}

#[async_trait]
impl CatalogGateway for FakeCatalogGateway {
	async fn city_name(&self, city_id: i32) -> Result<String, CatalogError> {
		self.cities
			.iter()
			.find(|c| c.id == city_id)
			.map(|c| c.name.clone())
			.ok_or(CatalogError::NotFound {
				kind: "city",
				id: city_id.to_string(),
			})
	}

	async fn places_by_city(
		&self,
		city_id: i32,
		kind: PlaceKind,
		limit: usize,
	) -> Result<Vec<Place>, CatalogError> {
		let mut matches: Vec<Place> = self
			.places
			.iter()
			.filter(|p| p.common().city_id == city_id && p.kind() == kind)
			.cloned()
			.collect();
		matches.sort_by(|a, b| b.rating().partial_cmp(&a.rating()).unwrap());
		matches.truncate(limit);
		Ok(matches)
	}

	async fn place_coords(
		&self,
		kind: PlaceKind,
		place_id: &str,
	) -> Result<Option<(f64, f64)>, CatalogError> {
		Ok(self
			.places
			.iter()
			.find(|p| p.kind() == kind && p.id() == place_id)
			.and_then(|p| p.coords()))
	}

	async fn transport_mode_of(&self, transport_id: &str) -> Result<String, CatalogError> {
		self.transport_modes
			.iter()
			.find(|(id, _)| id == transport_id)
			.map(|(_, mode)| mode.clone())
			.ok_or(CatalogError::NotFound {
				kind: "transport",
				id: transport_id.to_string(),
			})
	}

	async fn tour_options_for_destination(
		&self,
		destination_city_id: i32,
		exclude_user_id: Option<&str>,
	) -> Result<Vec<HistoricalTourOption>, CatalogError> {
		Ok(self
			.tour_options
			.iter()
			.filter(|o| {
				o.destination_city_id == destination_city_id
					&& exclude_user_id.is_none_or(|uid| o.user_id != uid)
			})
			.cloned()
			.collect())
	}

	async fn tour_options_all(&self) -> Result<Vec<HistoricalTourOption>, CatalogError> {
		Ok(self.tour_options.clone())
	}

	async fn tour_count_for_user(&self, user_id: &str) -> Result<u32, CatalogError> {
		Ok(self
			.tour_options
			.iter()
			.filter(|o| o.user_id == user_id)
			.count() as u32)
	}

	async fn tour_options_for_user(
		&self,
		user_id: &str,
		destination_city_id: i32,
	) -> Result<Vec<HistoricalTourOption>, CatalogError> {
		Ok(self
			.tour_options
			.iter()
			.filter(|o| o.user_id == user_id && o.destination_city_id == destination_city_id)
			.cloned()
			.collect())
	}
}
