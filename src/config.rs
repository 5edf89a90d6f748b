use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "exoplanet-orrery")]
#[command(about = "Exoplanet systems on Kepler orbits, in the terminal", long_about = None)]
pub(crate) struct Args {
    /// catalog CSV in NASA Exoplanet Archive layout (bundled TRAPPIST-1 if omitted)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,

    /// host star to show when the catalog holds several
    #[arg(long)]
    pub(crate) host: Option<String>,

    /// print the catalog's host names and exit
    #[arg(long, default_value_t = false)]
    pub(crate) list_hosts: bool,

    /// initial scale in braille dots per AU (default: fit the widest orbit)
    #[arg(long)]
    pub(crate) scale: Option<f64>,

    /// simulated seconds per real second
    #[arg(long)]
    pub(crate) warp: Option<f64>,

    /// FPS cap
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// seed for the initial orbital phases
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// start paused
    #[arg(long, default_value_t = false)]
    pub(crate) paused: bool,

    /// log file (default: alongside the settings file)
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

/// Viewer preferences kept between runs. Simulation state is never saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) time_warp: f64,
    /// braille dots per pan keypress
    pub(crate) pan_step: f64,
    /// fractional zoom per keypress or wheel notch
    pub(crate) zoom_step: f64,
    pub(crate) enable_color: bool,
    pub(crate) show_orbits: bool,
    pub(crate) show_labels: bool,
    pub(crate) seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            time_warp: 10.0,
            pan_step: 8.0,
            zoom_step: 0.10,
            enable_color: true,
            show_orbits: true,
            show_labels: true,
            seed: 0xC0FFEE_u64,
        }
    }
}

impl Settings {
    /// CLI flags win over stored values for this session.
    pub(crate) fn apply_args(&mut self, args: &Args) {
        if let Some(fps) = args.fps {
            self.fps_cap = fps;
        }
        if let Some(warp) = args.warp {
            self.time_warp = warp;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        self.fps_cap = self.fps_cap.clamp(5, 240);
        if !(self.time_warp.is_finite() && self.time_warp > 0.0) {
            self.time_warp = Settings::default().time_warp;
        }
        if !(self.zoom_step > 0.0 && self.zoom_step < 1.0) {
            self.zoom_step = Settings::default().zoom_step;
        }
    }

    /// What to write back after a session: this session's settings, except
    /// that fields set from the command line keep their `stored` values.
    pub(crate) fn to_persist(&self, stored: &Settings, args: &Args) -> Settings {
        let mut out = self.clone();
        if args.fps.is_some() {
            out.fps_cap = stored.fps_cap;
        }
        if args.warp.is_some() {
            out.time_warp = stored.time_warp;
        }
        if args.seed.is_some() {
            out.seed = stored.seed;
        }
        out
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "exoplanet-orrery", "ExoplanetOrrery")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("exoplanet-orrery.log"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v;
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_override_settings() {
        let args = Args::parse_from(["exoplanet-orrery", "--warp", "250", "--fps", "1000", "--seed", "9"]);
        let mut s = Settings::default();
        s.apply_args(&args);
        assert_eq!(s.time_warp, 250.0);
        assert_eq!(s.fps_cap, 240);
        assert_eq!(s.seed, 9);
        assert!(!args.paused);
    }

    #[test]
    fn partial_settings_file_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "time_warp": 3.5 }"#).unwrap();
        assert_eq!(s.time_warp, 3.5);
        assert_eq!(s.zoom_step, 0.10);
        assert!(s.show_orbits);
    }

    #[test]
    fn command_line_overrides_are_not_saved() {
        let dir = std::env::temp_dir().join(format!("exoplanet-orrery-flags-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");

        let stored = Settings::default();
        let args = Args::parse_from(["exoplanet-orrery", "--seed", "9", "--warp", "250"]);
        let mut session = stored.clone();
        session.apply_args(&args);
        assert_eq!((session.seed, session.time_warp), (9, 250.0));
        session.show_labels = false;
        save_settings_atomic(&path, &session.to_persist(&stored, &args)).unwrap();

        let next = load_settings(&path);
        assert_eq!(next.seed, stored.seed);
        assert_eq!(next.time_warp, stored.time_warp);
        assert!(!next.show_labels);

        // without flags, in-session changes are kept
        let plain = Args::parse_from(["exoplanet-orrery"]);
        let mut session = next.clone();
        session.apply_args(&plain);
        session.time_warp = 40.0;
        assert_eq!(session.to_persist(&next, &plain).time_warp, 40.0);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn settings_survive_atomic_save() {
        let dir = std::env::temp_dir().join(format!("exoplanet-orrery-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        let mut s = Settings::default();
        s.show_labels = false;
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        assert_eq!(load_settings(&dir.join("missing.json")), Settings::default());
        fs::remove_dir_all(&dir).ok();
    }
}
