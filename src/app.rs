use crate::config::{load_settings, project_paths, save_settings_atomic, Args, Paths, Settings};
use crate::input::{collect_input_nonblocking, map_event, Action};
use crate::logging;
use crate::render::{canvas_to_cells, cell_to_dot, draw_hud, draw_labels, draw_system, Hud, Pixel, Terminal};
use anyhow::Context;
use exoplanet_orrery::{fit_scale, Catalog, HostSystem, Point, Scale, System};
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Longest real frame time fed to the simulation, seconds.
const MAX_FRAME_DT: f64 = 0.05;

pub(crate) struct App {
    settings: Settings,
    paths: Paths,
    system: System,
    term: Terminal,
    paused: bool,
    sim_seconds: f64,
    selected: usize,
    hover: Option<Point>,
    should_quit: bool,
}

impl App {
    fn init(args: &Args, settings: Settings, paths: Paths, host: HostSystem) -> anyhow::Result<Self> {
        let mut term = Terminal::begin().context("starting terminal")?;
        let system = match build_system(args, &settings, &host, map_center(&term)) {
            Ok(system) => system,
            Err(e) => {
                term.end()?;
                return Err(e);
            }
        };

        Ok(Self {
            settings,
            paths,
            system,
            term,
            paused: args.paused,
            sim_seconds: 0.0,
            selected: 0,
            hover: None,
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);
        let mut last_frame = Instant::now();

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                // keep the hover from pointing at a stale cell
                self.hover = None;
            }

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event(&ev, &self.settings) {
                    self.apply(action);
                }
                if self.should_quit {
                    break;
                }
            }

            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame).as_secs_f64().min(MAX_FRAME_DT);
            last_frame = now;
            if !self.paused {
                let dt = real_dt * self.settings.time_warp;
                self.system.advance(dt);
                self.sim_seconds += dt;
            }

            self.render_frame()?;
            spin_sleep(frame_dt, now);
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Pan(dx, dy) => self.system.pan(dx, dy),
            Action::Zoom(f) => {
                if let Err(e) = self.system.rescale(f) {
                    warn!(%e, fraction = f, "zoom refused");
                }
            }
            Action::Recenter => self.system.relocate(map_center(&self.term)),
            Action::PauseToggle => self.paused = !self.paused,
            Action::WarpScale(k) => {
                self.settings.time_warp = (self.settings.time_warp * k).clamp(0.125, 1.0e7);
            }
            Action::OrbitsToggle => self.settings.show_orbits = !self.settings.show_orbits,
            Action::LabelsToggle => self.settings.show_labels = !self.settings.show_labels,
            Action::SelectNext => {
                self.selected = (self.selected + 1) % self.system.body_count();
            }
            Action::SelectPrev => {
                let n = self.system.body_count();
                self.selected = (self.selected + n - 1) % n;
            }
            Action::Hover(col, row) => {
                self.hover = (col < self.term.map_cols()).then(|| cell_to_dot(col, row));
            }
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = crossterm::style::Color::Black;
        self.term.cur.clear(bg);
        self.term.canvas.clear(Pixel::default());

        let views = self.system.views();
        draw_system(&mut self.term.canvas, &views, &self.settings, self.selected);
        canvas_to_cells(&self.term.canvas, &mut self.term.cur, self.settings.enable_color, bg);
        if self.settings.show_labels {
            let map_cols = self.term.map_cols();
            draw_labels(&mut self.term.cur, &views, map_cols, self.selected);
        }

        let hovered = self.hover.and_then(|p| self.system.body_at(p));
        let inspected = hovered.or_else(|| self.system.bodies().nth(self.selected));
        let hud = Hud {
            system: &self.system,
            warp: self.settings.time_warp,
            paused: self.paused,
            sim_seconds: self.sim_seconds,
            inspected,
            hovering: hovered.is_some(),
        };
        draw_hud(&mut self.term.cur, &hud);

        self.term.present()?;
        Ok(())
    }
}

fn build_system(args: &Args, settings: &Settings, host: &HostSystem, pole: Point) -> anyhow::Result<System> {
    let scale = match args.scale {
        Some(px_per_au) => Scale::new(px_per_au).context("--scale")?,
        None => {
            // widest orbit reaches 90% of the way to the nearest edge
            let extent = (0.9 * pole.x.min(pole.y)).max(8.0);
            fit_scale(&host.star, &host.planets, extent)?
        }
    };
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let system = System::build(&host.star, &host.planets, pole, scale, &mut rng);
    info!(
        host = system.name(),
        planets = system.planets().len(),
        scale = scale.px_per_au(),
        seed = settings.seed,
        "system ready"
    );
    Ok(system)
}

/// Middle of the map area in braille dots.
fn map_center(term: &Terminal) -> Point {
    Point::new(term.map_cols() as f64, term.rows as f64 * 2.0)
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    let paths = project_paths()?;
    let stored = load_settings(&paths.settings_path);
    let mut settings = stored.clone();
    settings.apply_args(&args);

    let log_path = args.log_file.clone().unwrap_or_else(|| paths.log_path.clone());
    logging::init(&log_path)?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_path(path).with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::bundled().context("loading bundled catalog")?,
    };
    if args.list_hosts {
        for name in catalog.host_names() {
            println!("{name}");
        }
        return Ok(());
    }
    let host = catalog.system(args.host.as_deref())?;

    let mut app = App::init(&args, settings, paths, host)?;
    let result = app.run();

    // restore the terminal whatever happened in the loop
    app.term.end()?;
    let keep = app.settings.to_persist(&stored, &args);
    if let Err(e) = save_settings_atomic(&app.paths.settings_path, &keep) {
        warn!(error = %e, "settings not saved");
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
