//! Circular-orbit mechanics around a dominant central mass.
//!
//! Only the host star's gravity is considered. All inputs are SI.

use crate::coords::Scale;
use crate::units::G;
use std::f64::consts::PI;

/// Orbital radius (m) for period `period_s` around `star_mass_kg`.
///
/// Kepler's third law: `r = (G M T² / 4π²)^(1/3)`.
pub fn orbital_radius(star_mass_kg: f64, period_s: f64) -> f64 {
    (G * star_mass_kg * period_s * period_s / (4.0 * PI * PI)).cbrt()
}

/// Orbital period (s) at radius `radius_m`; inverse of [`orbital_radius`].
pub fn orbital_period(star_mass_kg: f64, radius_m: f64) -> f64 {
    (4.0 * PI * PI * radius_m.powi(3) / (G * star_mass_kg)).sqrt()
}

/// `sqrt(G M / r)` evaluated in meters.
///
/// This is the circular orbital *speed* (m/s). The simulation treats it as
/// an angular rate after passing it through the pixel scale, see
/// [`angle_step`].
pub fn angular_velocity(star_mass_kg: f64, radius_m: f64) -> f64 {
    (G * star_mass_kg / radius_m).sqrt()
}

/// Angle increment for one step of `dt` seconds.
///
/// The meters-based rate is scaled to pixels before integrating, so the
/// apparent orbital speed follows the zoom level. This is a deliberate
/// approximation, not true angular velocity.
pub fn angle_step(omega: f64, scale: Scale, dt: f64) -> f64 {
    scale.meters_to_pixels(omega) * dt
}

/// Newtonian attraction (N) between two masses `distance_m` apart.
pub fn gravity(m1_kg: f64, m2_kg: f64, distance_m: f64) -> f64 {
    G * m1_kg * m2_kg / (distance_m * distance_m)
}
