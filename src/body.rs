//! Stars and planets.
//!
//! Both variants share physical attributes (SI), a scale and a polar state
//! relative to the system pole. A star sits on the pole and keeps its own
//! screen rect; a planet's screen position is always derived from the pole
//! and its `(r, theta)`, so it cannot drift away from its orbit.

use crate::coords::{polar_to_cartesian, Point, Polar, Rect, Scale};
use crate::orbit;
use crate::units::{
    days_to_seconds, density, earth_mass_to_si, earth_radius_to_si, meters_to_au,
    seconds_to_days, sphere_volume, stellar_mass_to_si, stellar_radius_to_si,
};
use rand::Rng;
use std::f64::consts::TAU;

/// Host star row as supplied by the catalog loader (catalog units).
#[derive(Clone, Debug, PartialEq)]
pub struct StarRecord {
    pub name: String,
    /// solar masses
    pub stellar_mass: f64,
    /// solar radii
    pub stellar_radius: f64,
    /// kelvin
    pub effective_temp: f64,
}

/// Planet row as supplied by the catalog loader (catalog units).
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetRecord {
    pub name: String,
    /// days
    pub orbital_period: f64,
    /// Earth radii
    pub radius: f64,
    /// Earth masses
    pub mass: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BodyKind {
    Star {
        effective_temp: f64,
        rect: Rect,
    },
    Planet {
        /// seconds
        period: f64,
        /// physical orbital distance from the host, meters
        orbit_radius_m: f64,
        /// `sqrt(G M / r)` at `orbit_radius_m`
        omega: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MassBody {
    name: String,
    kind: BodyKind,
    mass: f64,
    radius: f64,
    scale: Scale,
    polar: Polar,
}

impl MassBody {
    /// Star centered on `pole`.
    pub fn star(rec: &StarRecord, pole: Point, scale: Scale) -> Self {
        let radius = stellar_radius_to_si(rec.stellar_radius);
        let d = 2.0 * scale.meters_to_pixels(radius);
        Self {
            name: rec.name.clone(),
            kind: BodyKind::Star {
                effective_temp: rec.effective_temp,
                rect: Rect::centered(pole, d, d),
            },
            mass: stellar_mass_to_si(rec.stellar_mass),
            radius,
            scale,
            polar: Polar::new(0.0, 0.0),
        }
    }

    /// Planet orbiting `host`. Catalogs carry no orbital phase, so the
    /// starting angle is drawn uniformly from `[0, 2π)`.
    pub fn planet<R: Rng + ?Sized>(rec: &PlanetRecord, host: &MassBody, scale: Scale, rng: &mut R) -> Self {
        let period = days_to_seconds(rec.orbital_period);
        let orbit_radius_m = orbit::orbital_radius(host.mass, period);
        let omega = orbit::angular_velocity(host.mass, orbit_radius_m);
        let theta = rng.gen_range(0.0..TAU);
        Self {
            name: rec.name.clone(),
            kind: BodyKind::Planet { period, orbit_radius_m, omega },
            mass: earth_mass_to_si(rec.mass),
            radius: earth_radius_to_si(rec.radius),
            scale,
            polar: Polar::new(scale.meters_to_pixels(orbit_radius_m), theta),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn is_star(&self) -> bool {
        matches!(self.kind, BodyKind::Star { .. })
    }

    /// kg
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// m
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn polar(&self) -> Polar {
        self.polar
    }

    /// Orbital radius in pixels; zero for a star.
    pub fn r(&self) -> f64 {
        self.polar.r
    }

    pub fn theta(&self) -> f64 {
        self.polar.theta
    }

    pub fn effective_temp(&self) -> Option<f64> {
        match self.kind {
            BodyKind::Star { effective_temp, .. } => Some(effective_temp),
            BodyKind::Planet { .. } => None,
        }
    }

    /// Orbital period in seconds.
    pub fn period(&self) -> Option<f64> {
        match self.kind {
            BodyKind::Planet { period, .. } => Some(period),
            BodyKind::Star { .. } => None,
        }
    }

    /// Physical orbital distance in meters.
    pub fn orbit_radius_m(&self) -> Option<f64> {
        match self.kind {
            BodyKind::Planet { orbit_radius_m, .. } => Some(orbit_radius_m),
            BodyKind::Star { .. } => None,
        }
    }

    /// Body radius on screen, in pixels.
    pub fn screen_radius(&self) -> f64 {
        self.scale.meters_to_pixels(self.radius)
    }

    /// Current screen position.
    pub fn center(&self, pole: Point) -> Point {
        match &self.kind {
            BodyKind::Star { rect, .. } => rect.center(),
            BodyKind::Planet { .. } => polar_to_cartesian(pole, self.polar),
        }
    }

    /// Screen bounding box around [`MassBody::center`].
    pub fn bounds(&self, pole: Point) -> Rect {
        match &self.kind {
            BodyKind::Star { rect, .. } => *rect,
            BodyKind::Planet { .. } => {
                let d = 2.0 * self.screen_radius();
                Rect::centered(self.center(pole), d, d)
            }
        }
    }

    /// Advance the orbital angle by `dt` seconds. Stars do not move.
    pub fn advance(&mut self, dt: f64) {
        if let BodyKind::Planet { omega, .. } = self.kind {
            let step = orbit::angle_step(omega, self.scale, dt);
            self.polar.theta = (self.polar.theta + step).rem_euclid(TAU);
        }
    }

    /// Switch to `new_scale`, stretching the orbit radius by the same ratio
    /// as the body itself.
    pub fn resize(&mut self, new_scale: Scale, pole: Point) {
        let ratio = new_scale.px_per_au() / self.scale.px_per_au();
        self.scale = new_scale;
        self.polar.r *= ratio;
        let d = 2.0 * self.screen_radius();
        if let BodyKind::Star { rect, .. } = &mut self.kind {
            rect.set_size(d, d);
            // resizing keeps the corner; put the star back on the pole
            rect.set_center(pole);
        }
    }

    /// Move a star's rect onto `pole`. Planets read the pole on demand.
    pub fn recenter(&mut self, pole: Point) {
        if let BodyKind::Star { rect, .. } = &mut self.kind {
            rect.set_center(pole);
        }
    }

    /// m³
    pub fn volume(&self) -> f64 {
        sphere_volume(self.radius)
    }

    /// kg/m³
    pub fn density(&self) -> f64 {
        density(self.mass, self.volume())
    }

    /// Attributes for an inspection panel, one per line.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone()];
        match self.kind {
            BodyKind::Star { effective_temp, .. } => {
                lines.push("kind: star".to_string());
                lines.push(format!("mass: {:.4e} kg", self.mass));
                lines.push(format!("radius: {:.4e} m", self.radius));
                lines.push(format!("teff: {:.0} K", effective_temp));
            }
            BodyKind::Planet { period, orbit_radius_m, .. } => {
                lines.push("kind: planet".to_string());
                lines.push(format!("mass: {:.4e} kg", self.mass));
                lines.push(format!("radius: {:.4e} m", self.radius));
                lines.push(format!("period: {:.4} d", seconds_to_days(period)));
                lines.push(format!("orbit: {:.5} AU", meters_to_au(orbit_radius_m)));
            }
        }
        lines.push(format!("density: {:.0} kg/m3", self.density()));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::AU_METERS;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn trappist() -> StarRecord {
        StarRecord {
            name: "TRAPPIST-1".into(),
            stellar_mass: 0.08,
            stellar_radius: 0.12,
            effective_temp: 2559.0,
        }
    }

    fn trappist_b() -> PlanetRecord {
        PlanetRecord {
            name: "TRAPPIST-1 b".into(),
            orbital_period: 1.51087081,
            radius: 1.086,
            mass: 0.85,
        }
    }

    fn scale(v: f64) -> Scale {
        Scale::new(v).unwrap()
    }

    #[test]
    fn star_sits_on_pole() {
        let pole = Point::new(640.0, 360.0);
        let star = MassBody::star(&trappist(), pole, scale(25_000.0));
        assert!(star.is_star());
        assert_eq!(star.r(), 0.0);
        assert_eq!(star.center(pole), pole);
        assert_relative_eq!(star.mass(), 1.5912e29, max_relative = 1e-12);
        assert_relative_eq!(star.radius(), 0.12 * 6.957e8, max_relative = 1e-12);
        assert_relative_eq!(star.screen_radius(), 0.12 * 6.957e8 * 25_000.0 / AU_METERS, max_relative = 1e-12);
        assert_eq!(star.effective_temp(), Some(2559.0));
        assert_eq!(star.period(), None);
    }

    #[test]
    fn planet_seeded_from_kepler() {
        let pole = Point::new(640.0, 360.0);
        let s = scale(25_000.0);
        let star = MassBody::star(&trappist(), pole, s);
        let mut rng = StdRng::seed_from_u64(7);
        let p = MassBody::planet(&trappist_b(), &star, s, &mut rng);

        let t = 1.51087081 * 86_400.0;
        assert_relative_eq!(p.period().unwrap(), t, max_relative = 1e-12);
        let r_m = orbit::orbital_radius(star.mass(), t);
        assert_relative_eq!(p.orbit_radius_m().unwrap(), r_m);
        assert_relative_eq!(p.r(), s.meters_to_pixels(r_m));
        assert!((0.0..TAU).contains(&p.theta()));
        assert_relative_eq!(p.mass(), 0.85 * 5.972e24, max_relative = 1e-12);

        let c = p.center(pole);
        assert_relative_eq!(c.x, pole.x + p.r() * p.theta().cos(), epsilon = 1e-9);
        assert_relative_eq!(c.y, pole.y + p.r() * p.theta().sin(), epsilon = 1e-9);
    }

    #[test]
    fn resize_scales_radius_and_orbit_together() {
        let pole = Point::new(100.0, 50.0);
        let s = scale(25_000.0);
        let mut star = MassBody::star(&trappist(), pole, s);
        let mut p = MassBody::planet(&trappist_b(), &star, s, &mut StdRng::seed_from_u64(1));
        let (sr0, pr0, r0) = (star.screen_radius(), p.screen_radius(), p.r());

        let s2 = scale(27_500.0);
        star.resize(s2, pole);
        p.resize(s2, pole);

        assert_relative_eq!(star.screen_radius(), sr0 * 1.1, max_relative = 1e-12);
        assert_relative_eq!(p.screen_radius(), pr0 * 1.1, max_relative = 1e-12);
        assert_relative_eq!(p.r(), r0 * 1.1, max_relative = 1e-12);
        assert_eq!(star.center(pole), pole);
        assert_eq!(star.bounds(pole).width(), 2.0 * star.screen_radius());
    }

    #[test]
    fn star_ignores_advance() {
        let pole = Point::new(0.0, 0.0);
        let mut star = MassBody::star(&trappist(), pole, scale(1000.0));
        let before = star.clone();
        star.advance(3600.0);
        assert_eq!(star, before);
    }

    #[test]
    fn describe_lists_attributes() {
        let pole = Point::new(0.0, 0.0);
        let s = scale(1000.0);
        let star = MassBody::star(&trappist(), pole, s);
        let p = MassBody::planet(&trappist_b(), &star, s, &mut StdRng::seed_from_u64(3));
        let star_lines = star.describe();
        assert_eq!(star_lines[0], "TRAPPIST-1");
        assert!(star_lines.iter().any(|l| l == "teff: 2559 K"));
        let planet_lines = p.describe();
        assert!(planet_lines.iter().any(|l| l == "period: 1.5109 d"));
        assert!(planet_lines.iter().any(|l| l.starts_with("orbit: 0.011")));
    }
}
