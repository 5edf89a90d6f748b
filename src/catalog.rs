//! Planetary-systems catalog loader.
//!
//! Reads the NASA Exoplanet Archive "Planetary Systems" CSV layout. Only the
//! columns the simulation needs are read; any others are ignored. Lines
//! starting with `#` (the archive's header notes) are skipped.

use crate::body::{PlanetRecord, StarRecord};
use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Columns without which no row can be placed.
const REQUIRED_COLUMNS: [&str; 2] = ["hostname", "pl_name"];

/// TRAPPIST-1, shipped with the binary so it runs without a download.
pub const BUNDLED_CSV: &str = include_str!("../data/trappist-1.csv");

#[derive(Debug, Deserialize)]
struct Row {
    hostname: String,
    pl_name: String,
    #[serde(default)]
    default_flag: Option<u8>,
    pl_orbper: Option<f64>,
    pl_rade: Option<f64>,
    pl_masse: Option<f64>,
    st_teff: Option<f64>,
    st_rad: Option<f64>,
    st_mass: Option<f64>,
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

impl Row {
    /// The archive's preferred parameter set. Files without the column
    /// treat every row as preferred.
    fn is_default(&self) -> bool {
        self.default_flag != Some(0)
    }

    fn star(&self) -> Option<StarRecord> {
        Some(StarRecord {
            name: self.hostname.clone(),
            stellar_mass: positive(self.st_mass)?,
            stellar_radius: positive(self.st_rad)?,
            effective_temp: positive(self.st_teff)?,
        })
    }

    fn planet(&self) -> Option<PlanetRecord> {
        Some(PlanetRecord {
            name: self.pl_name.clone(),
            orbital_period: positive(self.pl_orbper)?,
            radius: positive(self.pl_rade)?,
            mass: positive(self.pl_masse)?,
        })
    }
}

#[derive(Clone, Debug)]
struct HostEntry {
    name: String,
    star: Option<StarRecord>,
    /// `star` came from a preferred row and is not replaced again.
    star_is_default: bool,
    planets: Vec<PlanetRecord>,
    planet_names: HashSet<String>,
}

impl HostEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            star: None,
            star_is_default: false,
            planets: Vec::new(),
            planet_names: HashSet::new(),
        }
    }

    /// First complete star row wins until a preferred one turns up.
    fn offer_star(&mut self, row: &Row) {
        if self.star_is_default {
            return;
        }
        if self.star.is_some() && !row.is_default() {
            return;
        }
        if let Some(star) = row.star() {
            self.star = Some(star);
            self.star_is_default = row.is_default();
        }
    }
}

/// One host star and the planets to build against it.
#[derive(Clone, Debug, PartialEq)]
pub struct HostSystem {
    pub star: StarRecord,
    pub planets: Vec<PlanetRecord>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    hosts: Vec<HostEntry>,
}

impl Catalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_reader(BUNDLED_CSV.as_bytes())
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        info!("loading catalog from {:?}", path);
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let headers = reader.headers()?.clone();
        for col in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == col) {
                return Err(CatalogError::MissingColumn(col));
            }
        }

        let mut hosts: Vec<HostEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows = 0usize;
        for result in reader.deserialize::<Row>() {
            rows += 1;
            let row = match result {
                Ok(row) => row,
                Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                    warn!(error = %e, "skipping unreadable catalog row");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let idx = *index.entry(row.hostname.clone()).or_insert_with(|| {
                hosts.push(HostEntry::new(&row.hostname));
                hosts.len() - 1
            });
            let host = &mut hosts[idx];
            host.offer_star(&row);

            // the archive repeats planets once per parameter set
            if !row.is_default() || host.planet_names.contains(&row.pl_name) {
                continue;
            }
            match row.planet() {
                Some(p) => {
                    host.planet_names.insert(p.name.clone());
                    host.planets.push(p);
                }
                None => warn!(planet = %row.pl_name, "skipping row with missing or non-positive planet fields"),
            }
        }

        if rows == 0 {
            return Err(CatalogError::NoRows);
        }
        info!(rows, hosts = hosts.len(), "catalog loaded");
        Ok(Self { hosts })
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn host_names(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(|h| h.name.as_str())
    }

    /// The named host, or the first host in file order when `host` is `None`.
    pub fn system(&self, host: Option<&str>) -> Result<HostSystem, CatalogError> {
        let entry = match host {
            Some(name) => self
                .hosts
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| CatalogError::HostNotFound(name.to_string()))?,
            None => self.hosts.first().ok_or(CatalogError::NoRows)?,
        };
        let star = entry
            .star
            .clone()
            .ok_or_else(|| CatalogError::MissingStar(entry.name.clone()))?;
        Ok(HostSystem { star, planets: entry.planets.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "\
# This file was produced by the NASA Exoplanet Archive
# COLUMN pl_name: Planet Name
pl_name,hostname,default_flag,pl_orbper,pl_rade,pl_masse,st_teff,st_rad,st_mass
Kepler-1 b,Kepler-1,1,2.47,14.2,,5850,1.0,1.0
Kepler-1 c,Kepler-1,1,10.5,2.1,6.0,5850,1.0,1.0
TOI-9 b,TOI-9,1,3.0,1.0,1.0,,,
TOI-9 c,TOI-9,1,5.0,1.2,1.5,3400,0.3,0.25
TOI-9 c,TOI-9,0,5.1,1.3,1.6,3400,0.3,0.25
Lonely b,Lonely,1,4.0,1.0,1.0,,,
";

    #[test]
    fn bundled_catalog_is_trappist() {
        let cat = Catalog::bundled().unwrap();
        let sys = cat.system(None).unwrap();
        assert_eq!(sys.star.name, "TRAPPIST-1");
        assert_eq!(sys.star.stellar_mass, 0.08);
        assert_eq!(sys.star.stellar_radius, 0.12);
        assert_eq!(sys.planets.len(), 7);
        assert_eq!(sys.planets[0].name, "TRAPPIST-1 b");
        assert_eq!(sys.planets[0].orbital_period, 1.51087081);
    }

    #[test]
    fn groups_rows_by_host() {
        let cat = Catalog::from_reader(MIXED.as_bytes()).unwrap();
        let hosts: Vec<&str> = cat.host_names().collect();
        assert_eq!(hosts, ["Kepler-1", "TOI-9", "Lonely"]);

        // planet with an empty mass is dropped, the rest kept
        let k = cat.system(Some("kepler-1")).unwrap();
        assert_eq!(k.planets.len(), 1);
        assert_eq!(k.planets[0].name, "Kepler-1 c");
    }

    #[test]
    fn star_taken_from_first_complete_row() {
        let cat = Catalog::from_reader(MIXED.as_bytes()).unwrap();
        let toi = cat.system(Some("TOI-9")).unwrap();
        assert_eq!(toi.star.stellar_mass, 0.25);
        assert_eq!(toi.planets.len(), 2);
        assert_eq!(toi.planets[1].orbital_period, 5.0);
    }

    #[test]
    fn missing_host_and_star_are_errors() {
        let cat = Catalog::from_reader(MIXED.as_bytes()).unwrap();
        assert!(matches!(cat.system(Some("Nope")), Err(CatalogError::HostNotFound(_))));
        assert!(matches!(cat.system(Some("Lonely")), Err(CatalogError::MissingStar(_))));
    }

    #[test]
    fn empty_and_malformed_input() {
        let header_only = "pl_name,hostname,pl_orbper,pl_rade,pl_masse,st_teff,st_rad,st_mass\n";
        assert!(matches!(Catalog::from_reader(header_only.as_bytes()), Err(CatalogError::NoRows)));

        let missing_col = "pl_name,pl_orbper\nx,1\n";
        assert!(matches!(
            Catalog::from_reader(missing_col.as_bytes()),
            Err(CatalogError::MissingColumn("hostname"))
        ));

        let ragged = "pl_name,hostname,pl_orbper\nx,y,1\nz,y\n";
        assert!(matches!(Catalog::from_reader(ragged.as_bytes()), Err(CatalogError::Csv(_))));
    }

    #[test]
    fn unreadable_row_skipped_not_fatal() {
        let csv = "\
pl_name,hostname,pl_orbper,pl_rade,pl_masse,st_teff,st_rad,st_mass
A b,A,2.0,1.0,1.0,3000,0.2,0.15
A c,A,n/a,1.1,1.2,3000,0.2,0.15
A d,A,7.5,0.9,0.8,3000,0.2,0.15
";
        let sys = Catalog::from_reader(csv.as_bytes()).unwrap().system(Some("A")).unwrap();
        let names: Vec<&str> = sys.planets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A b", "A d"]);
    }

    #[test]
    fn star_prefers_default_parameter_set() {
        let csv = "\
pl_name,hostname,default_flag,pl_orbper,pl_rade,pl_masse,st_teff,st_rad,st_mass
X b,X,0,3.0,1.0,1.0,3100,0.30,0.28
X b,X,1,3.0,1.0,1.0,3200,0.25,0.22
X c,X,0,6.0,1.0,1.0,3300,0.40,0.35
";
        let sys = Catalog::from_reader(csv.as_bytes()).unwrap().system(None).unwrap();
        assert_eq!(sys.star.stellar_mass, 0.22);
        assert_eq!(sys.star.effective_temp, 3200.0);
        assert_eq!(sys.planets.len(), 1);

        // no preferred row at all: first complete one is used
        let only_alt = "pl_name,hostname,default_flag,pl_orbper,pl_rade,pl_masse,st_teff,st_rad,st_mass\nY b,Y,0,3.0,1.0,1.0,3100,0.30,0.28\n";
        let y = Catalog::from_reader(only_alt.as_bytes()).unwrap().system(None).unwrap();
        assert_eq!(y.star.stellar_mass, 0.28);
        assert!(y.planets.is_empty());
    }
}
