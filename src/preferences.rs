/*
 * src/preferences.rs
 *
 * File for the Preference Resolver
 *
 * Purpose:
 *   Normalizes raw wire preference lists into a resolved `Preferences`
 *   record: hotel/restaurant/activity identifiers pass through unchanged,
 *   while transport entries are mapped onto canonical mode tags.
 */

use tracing::debug;

use crate::catalog::CatalogGateway;
use crate::error::CatalogError;
use crate::model::{PreferenceSet, Preferences, RawPreferences};

const CANONICAL_MODES: [&str; 7] = ["walk", "bike", "scooter", "taxi", "bus", "metro", "car"];

/// True if `entry` is already a canonical mode tag.
pub(crate) fn is_canonical_mode(entry: &str) -> bool {
	CANONICAL_MODES.contains(&entry.to_ascii_lowercase().as_str())
}

/// True if `entry` looks like a walking variant ("walk", "walking", "foot").
fn looks_like_walking(entry: &str) -> bool {
	let lower = entry.to_ascii_lowercase();
	lower.contains("walk") || lower == "foot" || lower == "on foot"
}

/// True if `entry` has the transport-identifier shape: `T` followed by digits.
pub(crate) fn looks_like_transport_id(entry: &str) -> bool {
	entry
		.strip_prefix('T')
		.is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Resolves one raw transport mode entry to a canonical/catalog mode tag,
/// per the detection rule in the component design: canonical tags pass
/// through, walking variants map to `walk`, `T<digits>` identifiers resolve
/// via the Catalog Gateway, and anything else falls back to `taxi`.
async fn resolve_transport_entry(
	gateway: &dyn CatalogGateway,
	entry: &str,
) -> Result<String, CatalogError> {
	let lower = entry.to_ascii_lowercase();
	if is_canonical_mode(&lower) {
		return Ok(lower);
	}
	if looks_like_walking(entry) {
		return Ok("walk".to_string());
	}
	if looks_like_transport_id(entry) {
		return match gateway.transport_mode_of(entry).await {
			Ok(mode) => Ok(mode),
			Err(CatalogError::NotFound { .. }) => Ok("taxi".to_string()),
			Err(err) => Err(err),
		};
	}
	Ok("taxi".to_string())
}

async fn resolve_transport_set(
	gateway: &dyn CatalogGateway,
	liked: &[String],
	disliked: &[String],
) -> Result<PreferenceSet, CatalogError> {
	let mut resolved_liked = Vec::with_capacity(liked.len());
	for entry in liked {
		resolved_liked.push(resolve_transport_entry(gateway, entry).await?);
	}
	let mut resolved_disliked = Vec::with_capacity(disliked.len());
	for entry in disliked {
		resolved_disliked.push(resolve_transport_entry(gateway, entry).await?);
	}
	Ok(PreferenceSet::from_raw(&resolved_liked, &resolved_disliked))
}

/// Normalizes a [`RawPreferences`] wire record into a resolved
/// [`Preferences`], guaranteeing `liked ∩ disliked = ∅` per category and
/// that transport entries are canonical mode tags.
pub async fn resolve_preferences(
	gateway: &dyn CatalogGateway,
	raw: &RawPreferences,
) -> Result<Preferences, CatalogError> {
	debug!(target: "preferences", "resolving raw preference sets");

	let transport_modes =
		resolve_transport_set(gateway, &raw.liked_transport_modes, &raw.disliked_transport_modes)
			.await?;

	Ok(Preferences {
		hotels: PreferenceSet::from_raw(&raw.liked_hotels, &raw.disliked_hotels),
		restaurants: PreferenceSet::from_raw(&raw.liked_restaurants, &raw.disliked_restaurants),
		activities: PreferenceSet::from_raw(&raw.liked_activities, &raw.disliked_activities),
		transport_modes,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::FakeCatalogGateway;

	#[tokio::test]
	async fn canonical_modes_pass_through() {
		let gateway = FakeCatalogGateway::new();
		let raw = RawPreferences {
			liked_transport_modes: vec!["bike".to_string()],
			..Default::default()
		};
		let prefs = resolve_preferences(&gateway, &raw).await.unwrap();
		assert!(prefs.transport_modes.is_liked("bike"));
	}

	#[tokio::test]
	async fn walking_variants_map_to_walk() {
		let gateway = FakeCatalogGateway::new();
		let raw = RawPreferences {
			liked_transport_modes: vec!["Walking".to_string()],
			..Default::default()
		};
		let prefs = resolve_preferences(&gateway, &raw).await.unwrap();
		assert!(prefs.transport_modes.is_liked("walk"));
	}

	#[tokio::test]
	async fn transport_id_resolves_via_gateway() {
		let gateway = FakeCatalogGateway::new().with_transport_mode("T0042", "scooter");
		let raw = RawPreferences {
			liked_transport_modes: vec!["T0042".to_string()],
			..Default::default()
		};
		let prefs = resolve_preferences(&gateway, &raw).await.unwrap();
		assert!(prefs.transport_modes.is_liked("scooter"));
	}

	#[tokio::test]
	async fn unresolved_entry_falls_back_to_taxi() {
		let gateway = FakeCatalogGateway::new();
		let raw = RawPreferences {
			liked_transport_modes: vec!["GrabBike Deluxe".to_string()],
			..Default::default()
		};
		let prefs = resolve_preferences(&gateway, &raw).await.unwrap();
		assert!(prefs.transport_modes.is_liked("taxi"));
	}

	#[tokio::test]
	async fn liked_wins_conflicts() {
		let gateway = FakeCatalogGateway::new();
		let raw = RawPreferences {
			liked_hotels: vec!["h1".to_string()],
			disliked_hotels: vec!["h1".to_string()],
			..Default::default()
		};
		let prefs = resolve_preferences(&gateway, &raw).await.unwrap();
		assert!(prefs.hotels.is_liked("h1"));
		assert!(!prefs.hotels.is_disliked("h1"));
	}
}
