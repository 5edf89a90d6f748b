//! Catalog units to SI.
//!
//! Exoplanet catalogs quote stars in solar units, planets in Earth units and
//! periods in days. The kernel computes in kg, m and s.

use std::f64::consts::PI;

/// Gravitational constant (m³ kg⁻¹ s⁻²)
pub const G: f64 = 6.67408e-11;

/// One astronomical unit in meters
pub const AU_METERS: f64 = 149.6e9;

pub const SOLAR_MASS_KG: f64 = 1.989e30;
pub const SOLAR_RADIUS_M: f64 = 6.957e8;
pub const EARTH_MASS_KG: f64 = 5.972e24;
pub const EARTH_RADIUS_M: f64 = 6.371e6;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn stellar_mass_to_si(solar_masses: f64) -> f64 {
    solar_masses * SOLAR_MASS_KG
}

pub fn stellar_radius_to_si(solar_radii: f64) -> f64 {
    solar_radii * SOLAR_RADIUS_M
}

pub fn earth_mass_to_si(earth_masses: f64) -> f64 {
    earth_masses * EARTH_MASS_KG
}

pub fn earth_radius_to_si(earth_radii: f64) -> f64 {
    earth_radii * EARTH_RADIUS_M
}

pub fn days_to_seconds(days: f64) -> f64 {
    days * SECONDS_PER_DAY
}

pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}

pub fn meters_to_au(meters: f64) -> f64 {
    meters / AU_METERS
}

/// Volume of a sphere (m³)
pub fn sphere_volume(radius: f64) -> f64 {
    4.0 / 3.0 * PI * radius.powi(3)
}

/// Mean density (kg/m³)
pub fn density(mass: f64, volume: f64) -> f64 {
    mass / volume
}
