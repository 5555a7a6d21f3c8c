//! Terminal status view and zoom key handling.
//!
//! The core hands over one `DisplayFrame` per tick; this module is the
//! "renderer" collaborator — a couple of status lines rather than pixels.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use owo_colors::OwoColorize;
use radar_core::{DisplayFrame, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    ZoomIn,
    ZoomOut,
}

/// Drain pending key events without blocking.
pub fn poll_key() -> Result<KeyAction> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Ok(KeyAction::Quit),
                KeyCode::Char('+') | KeyCode::Char('=') => return Ok(KeyAction::ZoomIn),
                KeyCode::Char('-') | KeyCode::Char('_') => return Ok(KeyAction::ZoomOut),
                _ => {}
            }
        }
    }
    Ok(KeyAction::None)
}

pub fn draw(frame: &DisplayFrame, range: f32) {
    let player = if frame.player_found {
        "FOUND".green().to_string()
    } else {
        "NOT FOUND".red().to_string()
    };

    let mut line = format!(
        "Entities: {:3} | Range: {:5.0} | Player: {}",
        frame.entity_count, range, player
    );
    if let Some(heading) = frame.player_heading_degrees {
        line.push_str(&format!(" | Facing: {heading:6.1}°"));
    }
    let alerted = frame.alerted_count();
    if alerted > 0 {
        line.push_str(&format!(" | {}", format!("{alerted} ALERTED").red().bold()));
    }
    println!("{line}");

    for contact in contact_lines(frame, 5) {
        println!("  {contact}");
    }
}

/// The nearest non-player markers, one formatted line each.
fn contact_lines(frame: &DisplayFrame, limit: usize) -> Vec<String> {
    let mut contacts: Vec<_> = frame
        .markers
        .iter()
        .filter(|m| m.kind != EntityKind::Player)
        .collect();
    contacts.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    contacts
        .iter()
        .take(limit)
        .map(|m| {
            let kind = match m.kind {
                EntityKind::Player => m.kind.to_string(),
                EntityKind::Enemy if m.alerted => m.kind.red().bold().to_string(),
                EntityKind::Enemy => m.kind.red().to_string(),
                EntityKind::Npc => m.kind.yellow().to_string(),
                EntityKind::Object => m.kind.dimmed().to_string(),
            };
            format!(
                "{kind:<8} dist {:6.0}  hp {:5.1}  at ({:4.0}, {:4.0})",
                m.distance, m.health, m.screen_x, m.screen_y
            )
        })
        .collect()
}
