/*
 * src/model/mod.rs
 *
 * File for the core data model
 *
 * Purpose:
 *   Re-export the entity and DTO types shared by every planning component.
 */

pub mod city;
pub mod history;
pub mod place;
pub mod preferences;
pub mod request;
pub mod schedule;
pub mod tour;

pub use city::City;
pub use history::HistoricalTourOption;
pub use place::{Coords, Place, PlaceCommon, PlaceKind};
pub use preferences::{PreferenceSet, Preferences};
pub use request::{RawPreferences, ResolvedRequest, TourRequest};
pub use schedule::{DaySchedule, ItemType, ScheduleItem};
pub use tour::{CostBreakdown, Tour};
