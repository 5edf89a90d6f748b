//! Orbital kernel for a 2D exoplanet-system viewer.
//!
//! Catalog rows become a [`System`]: one star on a movable pole and planets
//! on circular Kepler orbits, all sharing one pixels-per-AU [`Scale`]. The
//! front-end drives it with `advance`, `pan` and `rescale` and reads back
//! screen geometry through [`System::views`].

pub mod body;
pub mod catalog;
pub mod coords;
pub mod error;
pub mod orbit;
pub mod system;
pub mod units;

pub use body::{BodyKind, MassBody, PlanetRecord, StarRecord};
pub use catalog::{Catalog, HostSystem};
pub use coords::{Point, Polar, Rect, Scale};
pub use error::{CatalogError, KernelError};
pub use system::{fit_scale, BodyView, System};
