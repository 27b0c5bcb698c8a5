/*
 * src/geo.rs
 *
 * File for the Geo Kernel
 *
 * Purpose:
 *   Pure distance/time/cost math. No I/O, no catalog dependency — every
 *   function here is a deterministic function of its arguments, matching
 *   the constants the original recommendation engine used.
 */

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Base speed in km/h per canonical transport mode.
fn base_speed_kmh(mode: &str) -> f64 {
	match mode {
		"walk" => 4.0,
		"bike" => 12.0,
		"scooter" => 25.0,
		"taxi" => 30.0,
		"bus" => 25.0,
		"metro" => 35.0,
		"car" => 30.0,
		_ => 30.0, // unknown modes default to the taxi profile
	}
}

fn is_motorized(mode: &str) -> bool {
	matches!(mode, "scooter" | "taxi" | "car")
}

/// Local hours during which motorized travel slows to 0.8x speed.
const RUSH_HOURS: [u32; 5] = [7, 8, 17, 18, 19];

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
	let lat1_rad = lat1.to_radians();
	let lat2_rad = lat2.to_radians();
	let delta_lat = (lat2 - lat1).to_radians();
	let delta_lon = (lon2 - lon1).to_radians();

	let a = (delta_lat / 2.0).sin().powi(2)
		+ lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
	let c = 2.0 * a.sqrt().asin();

	EARTH_RADIUS_KM * c
}

/// Whether `hour` (0-23, local time) falls in the rush-hour window.
pub fn is_rush_hour(hour: u32) -> bool {
	RUSH_HOURS.contains(&hour)
}

/// Travel time in minutes for `distance_km` under `mode`, rounded up, floored
/// at 5 minutes. `rush_hour` slows motorized modes to 0.8x speed.
pub fn travel_time_min(distance_km: f64, mode: &str, rush_hour: bool) -> u32 {
	let mut speed = base_speed_kmh(mode);
	if rush_hour && is_motorized(mode) {
		speed *= 0.8;
	}

	let hours = distance_km / speed;
	let mut minutes = (hours * 60.0).ceil();

	minutes += 10.0; // base buffer
	if is_motorized(mode) {
		minutes += 5.0;
	}
	if distance_km > 20.0 {
		minutes += 10.0;
	}

	(minutes.ceil() as i64).max(5) as u32
}

/// Transport cost in USD for `distance_km` under `mode`, rounded to 1 decimal.
pub fn transport_cost(distance_km: f64, mode: &str) -> f64 {
	let raw = match mode {
		"walk" => 0.0,
		"bike" => 2.0, // flat fare regardless of distance
		"scooter" => (distance_km * 0.5).max(1.0),
		"taxi" => (distance_km * 1.2).max(1.0),
		"bus" => (distance_km * 0.3).max(1.0),
		"metro" => (distance_km * 0.4).max(1.0),
		"car" => (distance_km * 1.0).max(1.0),
		_ => (distance_km * 1.2).max(1.0), // unknown modes default to the taxi profile
	};
	(raw * 10.0).round() / 10.0
}

/// Fallback distance in km when a place's coordinates are unavailable,
/// keyed by transport mode.
pub fn default_distance_km(mode: &str) -> f64 {
	match mode {
		"walk" => 1.0,
		"bike" => 3.0,
		"scooter" | "taxi" => 5.0,
		"bus" | "metro" => 8.0,
		_ => 5.0,
	}
}
