use crate::config::Settings;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    Mouse { kind: MouseEventKind, col: u16, row: u16 },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Action {
    /// braille dots
    Pan(f64, f64),
    /// fractional zoom
    Zoom(f64),
    Recenter,
    PauseToggle,
    WarpScale(f64),
    OrbitsToggle,
    LabelsToggle,
    SelectNext,
    SelectPrev,
    /// terminal cell under the mouse
    Hover(u16, u16),
    Quit,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat => {
                out.push(InputEvent::Key { key: k.code, mods: k.modifiers });
            }
            Event::Mouse(m) => {
                out.push(InputEvent::Mouse { kind: m.kind, col: m.column, row: m.row });
            }
            _ => {}
        }
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: &InputEvent, settings: &Settings) -> Option<Action> {
    let step = settings.pan_step;
    let zoom = settings.zoom_step;
    match *ev {
        InputEvent::Key { key, mods } => {
            if mods.contains(KeyModifiers::CONTROL) && matches!(key, KeyCode::Char('c')) {
                return Some(Action::Quit);
            }
            match key {
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
                KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Action::Pan(0.0, -step)),
                KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Action::Pan(0.0, step)),
                KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Action::Pan(-step, 0.0)),
                KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Action::Pan(step, 0.0)),
                KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Zoom(zoom)),
                KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::Zoom(-zoom)),
                KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Recenter),
                KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Some(Action::PauseToggle),
                KeyCode::Char(']') => Some(Action::WarpScale(2.0)),
                KeyCode::Char('[') => Some(Action::WarpScale(0.5)),
                KeyCode::Char('o') | KeyCode::Char('O') => Some(Action::OrbitsToggle),
                KeyCode::Char('l') | KeyCode::Char('L') => Some(Action::LabelsToggle),
                KeyCode::Tab => Some(Action::SelectNext),
                KeyCode::BackTab => Some(Action::SelectPrev),
                _ => None,
            }
        }
        InputEvent::Mouse { kind, col, row } => match kind {
            MouseEventKind::ScrollUp => Some(Action::Zoom(zoom)),
            MouseEventKind::ScrollDown => Some(Action::Zoom(-zoom)),
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                Some(Action::Hover(col, row))
            }
            _ => None,
        },
    }
}
