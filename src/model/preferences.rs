/*
 * src/model/preferences.rs
 *
 * File for resolved Preferences models
 *
 * Purpose:
 *   Normalized liked/disliked identifier sets, one pair per place category
 *   plus transport modes. Produced by the Preference Resolver (C3); consumed
 *   read-only by every downstream component.
 */

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A disjoint liked/disliked pair of identifiers for one place category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferenceSet {
	pub liked: HashSet<String>,
	pub disliked: HashSet<String>,
}

impl PreferenceSet {
	/// Builds a set from raw liked/disliked lists, resolving conflicts by
	/// letting `liked` win (the duplicate is dropped from `disliked`).
	pub fn from_raw(liked: &[String], disliked: &[String]) -> Self {
		let liked: HashSet<String> = liked.iter().cloned().collect();
		let disliked: HashSet<String> = disliked
			.iter()
			.cloned()
			.filter(|id| !liked.contains(id))
			.collect();
		Self { liked, disliked }
	}

	pub fn is_liked(&self, id: &str) -> bool {
		self.liked.contains(id)
	}

	pub fn is_disliked(&self, id: &str) -> bool {
		self.disliked.contains(id)
	}
}

/// Fully resolved preferences: hotels/restaurants/activities keep catalog
/// identifiers unchanged, while `transport_modes` has already been mapped to
/// canonical mode tags by the Preference Resolver.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
	pub hotels: PreferenceSet,
	pub restaurants: PreferenceSet,
	pub activities: PreferenceSet,
	pub transport_modes: PreferenceSet,
}
