/*
 * src/catalog/postgres.rs
 *
 * File for the Postgres-backed Catalog Gateway
 *
 * Purpose:
 *   Concrete `CatalogGateway` wrapping a `sqlx::PgPool`, one parameterized
 *   query per operation, matching the row-mapping style already used by
 *   this codebase's `sql_models`. Every query carries the per-query timeout
 *   recommended by the concurrency model and every `sqlx::Error` collapses
 *   into `CatalogError::Unavailable`.
 */

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;
use tracing::debug;

use crate::catalog::CatalogGateway;
use crate::error::CatalogError;
use crate::model::{HistoricalTourOption, Place, PlaceCommon, PlaceKind};

/// Default per-query timeout, per the concurrency model's recommendation.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

fn table_for(kind: PlaceKind) -> &'static str {
	match kind {
		PlaceKind::Hotel => "hotels",
		PlaceKind::Restaurant => "restaurants",
		PlaceKind::Activity => "activities",
		PlaceKind::Transport => "transports",
	}
}

/// `sqlx`-backed [`CatalogGateway`]. One pool, shared across every planning
/// call; connections are checked out and returned per query.
pub struct PgCatalogGateway {
	pool: PgPool,
}

impl PgCatalogGateway {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	async fn timed<T>(
		&self,
		fut: impl std::future::Future<Output = Result<T, sqlx::Error>>,
	) -> Result<T, CatalogError> {
		match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(err)) => Err(CatalogError::from(err)),
			Err(_) => Err(CatalogError::Unavailable("catalog query timed out".into())),
		}
	}
}

#[async_trait]
impl CatalogGateway for PgCatalogGateway {
	async fn city_name(&self, city_id: i32) -> Result<String, CatalogError> {
		let row = self
			.timed(
				sqlx::query("SELECT name FROM cities WHERE id = $1")
					.bind(city_id)
					.fetch_optional(&self.pool),
			)
			.await?;

		match row {
			Some(row) => Ok(row.get::<String, _>("name")),
			None => Err(CatalogError::NotFound {
				kind: "city",
				id: city_id.to_string(),
			}),
		}
	}

	async fn places_by_city(
		&self,
		city_id: i32,
		kind: PlaceKind,
		limit: usize,
	) -> Result<Vec<Place>, CatalogError> {
		let table = table_for(kind);
		debug!(target: "catalog", table, city_id, limit, "querying places_by_city");

		let query = format!(
			"SELECT id, name, city_id, rating, lat, lon, description, extra \
			 FROM {table} WHERE city_id = $1 ORDER BY rating DESC LIMIT $2"
		);
		let rows: Vec<(String, String, i32, f64, Option<f64>, Option<f64>, Option<String>, serde_json::Value)> =
			self.timed(
				sqlx::query_as(&query)
					.bind(city_id)
					.bind(limit as i64)
					.fetch_all(&self.pool),
			)
			.await?;

		let mut places = Vec::with_capacity(rows.len());
		for (id, name, city_id, rating, lat, lon, description, extra) in rows {
			let common = PlaceCommon {
				id,
				name,
				city_id,
				rating,
				lat,
				lon,
				description,
			};
			let place = match kind {
				PlaceKind::Hotel => Place::Hotel {
					common,
					price_per_night: extra.get("price_per_night").and_then(|v| v.as_f64()).unwrap_or(0.0),
				},
				PlaceKind::Restaurant => Place::Restaurant {
					common,
					price_avg: extra.get("price_avg").and_then(|v| v.as_f64()).unwrap_or(0.0),
					cuisine_type: extra
						.get("cuisine_type")
						.and_then(|v| v.as_str())
						.map(str::to_owned),
				},
				PlaceKind::Activity => Place::Activity {
					common,
					price: extra.get("price").and_then(|v| v.as_f64()).unwrap_or(0.0),
					duration_hr: extra.get("duration_hr").and_then(|v| v.as_f64()).unwrap_or(1.0),
					activity_type: extra
						.get("activity_type")
						.and_then(|v| v.as_str())
						.map(str::to_owned),
				},
				PlaceKind::Transport => Place::Transport {
					common,
					avg_price_per_km: extra.get("avg_price_per_km").and_then(|v| v.as_f64()).unwrap_or(0.0),
					min_price: extra.get("min_price").and_then(|v| v.as_f64()).unwrap_or(0.0),
					max_capacity: extra.get("max_capacity").and_then(|v| v.as_i64()).unwrap_or(4) as i32,
					mode: extra
						.get("mode")
						.and_then(|v| v.as_str())
						.unwrap_or("taxi")
						.to_owned(),
				},
			};
			places.push(place);
		}
		Ok(places)
	}

	async fn place_coords(
		&self,
		kind: PlaceKind,
		place_id: &str,
	) -> Result<Option<(f64, f64)>, CatalogError> {
		let table = table_for(kind);
		let query = format!("SELECT lat, lon FROM {table} WHERE id = $1");
		let row: Option<(Option<f64>, Option<f64>)> = self
			.timed(sqlx::query_as(&query).bind(place_id).fetch_optional(&self.pool))
			.await?;

		Ok(row.and_then(|(lat, lon)| match (lat, lon) {
			(Some(lat), Some(lon)) => Some((lat, lon)),
			_ => None,
		}))
	}

	async fn transport_mode_of(&self, transport_id: &str) -> Result<String, CatalogError> {
		let row = self
			.timed(
				sqlx::query("SELECT mode FROM transports WHERE id = $1")
					.bind(transport_id)
					.fetch_optional(&self.pool),
			)
			.await?;

		match row {
			Some(row) => Ok(row.get::<String, _>("mode")),
			None => Err(CatalogError::NotFound {
				kind: "transport",
				id: transport_id.to_string(),
			}),
		}
	}

	async fn tour_options_for_destination(
		&self,
		destination_city_id: i32,
		exclude_user_id: Option<&str>,
	) -> Result<Vec<HistoricalTourOption>, CatalogError> {
		let rows: Vec<HistoricalTourOptionRow> = self
			.timed(
				sqlx::query_as(
					"SELECT user_id, destination_city_id, start_city_id, guest_count, \
					 duration_days, target_budget, hotel_ids, activity_ids, restaurant_ids, \
					 transport_ids, rating \
					 FROM tour_options WHERE destination_city_id = $1 \
					 AND ($2::text IS NULL OR user_id <> $2)",
				)
				.bind(destination_city_id)
				.bind(exclude_user_id)
				.fetch_all(&self.pool),
			)
			.await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}

	async fn tour_options_all(&self) -> Result<Vec<HistoricalTourOption>, CatalogError> {
		let rows: Vec<HistoricalTourOptionRow> = self
			.timed(
				sqlx::query_as(
					"SELECT user_id, destination_city_id, start_city_id, guest_count, \
					 duration_days, target_budget, hotel_ids, activity_ids, restaurant_ids, \
					 transport_ids, rating FROM tour_options",
				)
				.fetch_all(&self.pool),
			)
			.await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}

	async fn tour_count_for_user(&self, user_id: &str) -> Result<u32, CatalogError> {
		let row = self
			.timed(
				sqlx::query("SELECT COUNT(*) AS n FROM tour_options WHERE user_id = $1")
					.bind(user_id)
					.fetch_one(&self.pool),
			)
			.await?;
		let count: i64 = row.get("n");
		Ok(count as u32)
	}

	async fn tour_options_for_user(
		&self,
		user_id: &str,
		destination_city_id: i32,
	) -> Result<Vec<HistoricalTourOption>, CatalogError> {
		let rows: Vec<HistoricalTourOptionRow> = self
			.timed(
				sqlx::query_as(
					"SELECT user_id, destination_city_id, start_city_id, guest_count, \
					 duration_days, target_budget, hotel_ids, activity_ids, restaurant_ids, \
					 transport_ids, rating \
					 FROM tour_options WHERE user_id = $1 AND destination_city_id = $2",
				)
				.bind(user_id)
				.bind(destination_city_id)
				.fetch_all(&self.pool),
			)
			.await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}
}

/// Row model for the `tour_options` table.
#[derive(sqlx::FromRow)]
struct HistoricalTourOptionRow {
	user_id: String,
	destination_city_id: i32,
	start_city_id: Option<i32>,
	guest_count: i32,
	duration_days: i32,
	target_budget: f64,
	hotel_ids: Vec<String>,
	activity_ids: Vec<String>,
	restaurant_ids: Vec<String>,
	transport_ids: Vec<String>,
	rating: f64,
}

impl From<HistoricalTourOptionRow> for HistoricalTourOption {
	fn from(row: HistoricalTourOptionRow) -> Self {
		HistoricalTourOption {
			user_id: row.user_id,
			destination_city_id: row.destination_city_id,
			start_city_id: row.start_city_id,
			guest_count: row.guest_count.max(0) as u32,
			duration_days: row.duration_days.max(0) as u32,
			target_budget: row.target_budget,
			hotel_ids: row.hotel_ids,
			activity_ids: row.activity_ids,
			restaurant_ids: row.restaurant_ids,
			transport_ids: row.transport_ids,
			rating: row.rating,
		}
	}
}
