//! One host star, its planets, and the shared pole and scale.
//!
//! The system owns the only copy of the pole. Planets never store it; they
//! are positioned against whatever the pole is when they are read, so a pan
//! is a single update.

use crate::body::{MassBody, PlanetRecord, StarRecord};
use crate::coords::{radial_distance, Point, Rect, Scale};
use crate::error::KernelError;
use crate::orbit;
use crate::units::{days_to_seconds, stellar_mass_to_si, stellar_radius_to_si, AU_METERS};
use rand::Rng;
use tracing::debug;

/// What the renderer needs for one body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyView<'a> {
    pub name: &'a str,
    pub is_star: bool,
    pub center: Point,
    pub radius_px: f64,
    pub bounds: Rect,
    /// Orbit ring `(pole, r)` for planets.
    pub orbit: Option<(Point, f64)>,
}

#[derive(Clone, Debug)]
pub struct System {
    pole: Point,
    scale: Scale,
    star: MassBody,
    planets: Vec<MassBody>,
}

impl System {
    /// Build the star on `pole`, then every planet against it, in order.
    pub fn build<R: Rng + ?Sized>(
        star: &StarRecord,
        planets: &[PlanetRecord],
        pole: Point,
        scale: Scale,
        rng: &mut R,
    ) -> Self {
        let star = MassBody::star(star, pole, scale);
        let planets: Vec<MassBody> = planets
            .iter()
            .map(|rec| MassBody::planet(rec, &star, scale, rng))
            .collect();
        debug!(
            star = star.name(),
            planets = planets.len(),
            scale = scale.px_per_au(),
            "built system"
        );
        Self { pole, scale, star, planets }
    }

    pub fn name(&self) -> &str {
        self.star.name()
    }

    pub fn pole(&self) -> Point {
        self.pole
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn star(&self) -> &MassBody {
        &self.star
    }

    pub fn planets(&self) -> &[MassBody] {
        &self.planets
    }

    /// Star first, then planets in catalog order.
    pub fn bodies(&self) -> impl Iterator<Item = &MassBody> {
        std::iter::once(&self.star).chain(self.planets.iter())
    }

    pub fn body_count(&self) -> usize {
        1 + self.planets.len()
    }

    /// Move every planet along its orbit by `dt` seconds of simulated time.
    pub fn advance(&mut self, dt: f64) {
        for planet in &mut self.planets {
            planet.advance(dt);
        }
    }

    /// Translate the pole. Planet `(r, theta)` is untouched.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.relocate(Point::new(self.pole.x + dx, self.pole.y + dy));
    }

    /// Put the star (and with it the pole) at `pole`.
    pub fn relocate(&mut self, pole: Point) {
        self.pole = pole;
        self.star.recenter(pole);
        debug!(x = pole.x, y = pole.y, "pole moved");
    }

    /// Zoom by a fraction, e.g. `0.1` for +10%. A zoom that would make the
    /// scale non-positive is refused and nothing changes.
    pub fn rescale(&mut self, delta_fraction: f64) -> Result<Scale, KernelError> {
        let new_scale = self.scale.zoomed(delta_fraction)?;
        self.set_scale(new_scale);
        Ok(new_scale)
    }

    pub fn set_scale(&mut self, new_scale: Scale) {
        self.scale = new_scale;
        self.star.resize(new_scale, self.pole);
        for planet in &mut self.planets {
            planet.resize(new_scale, self.pole);
        }
        debug!(scale = new_scale.px_per_au(), "rescaled");
    }

    /// Topmost body under a screen point: the star wins, then planets in
    /// order.
    pub fn body_at(&self, p: Point) -> Option<&MassBody> {
        self.bodies().find(|b| b.bounds(self.pole).contains(p))
    }

    /// Snapshot of every body's screen geometry, star first.
    pub fn views(&self) -> Vec<BodyView<'_>> {
        self.bodies()
            .map(|b| BodyView {
                name: b.name(),
                is_star: b.is_star(),
                center: b.center(self.pole),
                radius_px: b.screen_radius(),
                bounds: b.bounds(self.pole),
                orbit: (!b.is_star()).then_some((self.pole, b.r())),
            })
            .collect()
    }

    /// Star-on-planet attraction (N) for planet `index`, using radial
    /// distance.
    pub fn gravity_on(&self, index: usize) -> Option<f64> {
        let planet = self.planets.get(index)?;
        let d_px = radial_distance(self.star.polar(), planet.polar());
        let d_m = self.scale.pixels_to_meters(d_px);
        Some(orbit::gravity(self.star.mass(), planet.mass(), d_m))
    }
}

/// Scale at which the widest orbit (or the star itself, for a lone star)
/// spans `extent_px` pixels from the pole.
pub fn fit_scale(star: &StarRecord, planets: &[PlanetRecord], extent_px: f64) -> Result<Scale, KernelError> {
    let star_mass = stellar_mass_to_si(star.stellar_mass);
    let widest = planets
        .iter()
        .map(|p| orbit::orbital_radius(star_mass, days_to_seconds(p.orbital_period)))
        .fold(0.0_f64, f64::max);
    let span_m = if widest > 0.0 {
        widest
    } else {
        // lone star: fill a tenth of the extent
        stellar_radius_to_si(star.stellar_radius) * 10.0
    };
    Scale::new(extent_px * AU_METERS / span_m)
}
