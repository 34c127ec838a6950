#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-entity filtering.
//!
//! Every view here is a pure function of immutable record collections and
//! a [`state::FilterState`] value; nothing holds hidden state.

pub mod options;
pub mod polygons;
pub mod state;
pub mod timeline;
pub mod view;

pub use state::{Dimension, FilterState};
pub use timeline::YearRange;
pub use view::{FilteredView, derive_view};
