//! Shared UI components (status bar, keybinds panel, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::{BTreeMap, BTreeSet};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode};

/// Render the bottom status bar with mode, counts, and the last drop result.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal if app.board.is_dragging() => "DRAG",
        InputMode::Normal => "NORMAL",
        InputMode::KeyboardDrag => "CARRY",
        InputMode::Modal => "MODAL",
    };
    let status = app
        .status
        .as_deref()
        .map(|s| format!("  {s}"))
        .unwrap_or_default();
    let msg = format!(
        "mode: {mode}  groups:{}  students:{}{status}",
        app.board.groups().len(),
        app.board.roster().len(),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

fn action_label(action: KeyAction) -> Option<(&'static str, &'static str)> {
    let entry = match action {
        KeyAction::Quit => ("General", "Quit"),
        KeyAction::OpenHelp => ("General", "Help"),
        KeyAction::ToggleKeybindsPane => ("General", "Toggle this panel"),
        KeyAction::Regenerate => ("General", "Generate groups"),
        KeyAction::PickUpDrop => ("Drag", "Pick up / drop"),
        KeyAction::Cancel => ("Drag", "Cancel"),
        KeyAction::FocusUp => ("Cursor", "Up"),
        KeyAction::FocusDown => ("Cursor", "Down"),
        KeyAction::FocusLeft => ("Cursor", "Left"),
        KeyAction::FocusRight => ("Cursor", "Right"),
        KeyAction::MoveItemUp => ("Move item", "Up"),
        KeyAction::MoveItemDown => ("Move item", "Down"),
        KeyAction::MoveItemLeft => ("Move item", "Left"),
        KeyAction::MoveItemRight => ("Move item", "Right"),
        KeyAction::Ignore => return None,
    };
    Some(entry)
}

/// Render the side panel listing the active keymap grouped by section.
pub fn render_keybinds_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Keybindings")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);

    let mut sections: BTreeMap<&'static str, BTreeMap<&'static str, BTreeSet<String>>> =
        BTreeMap::new();
    for ((mods, code), action) in app.keymap.all_bindings() {
        if let Some((section, label)) = action_label(action) {
            sections
                .entry(section)
                .or_default()
                .entry(label)
                .or_default()
                .insert(Keymap::format_key(mods, code));
        }
    }

    let label_w = sections
        .values()
        .flat_map(|m| m.keys())
        .map(|l| l.len())
        .max()
        .unwrap_or(0)
        .min(inner.width.saturating_sub(8) as usize);

    let mut lines: Vec<Line> = Vec::new();
    for (section, rows) in &sections {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(
            format!("{section}:"),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (label, keys) in rows {
            let joined = keys.iter().cloned().collect::<Vec<_>>().join(", ");
            lines.push(Line::from(vec![
                Span::raw(format!("  {:>width$} │ ", label, width = label_w)),
                Span::styled(joined, Style::default().add_modifier(Modifier::ITALIC)),
            ]));
        }
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(block, area);
    f.render_widget(p, inner);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let width = 40u16.min(max_w);
    let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1);
    let height = (approx_lines + 4).min(area.height.saturating_sub(6).max(5)).max(5);
    let rect = centered_rect(width, height, area);
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Info")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Yes/No prompt shown before existing groups are thrown away.
pub fn render_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, selected: usize) {
    let rect = centered_rect(50, 7, area);
    let yes = if selected == 0 { "[Yes]" } else { " Yes " };
    let no = if selected == 1 { "[No]" } else { " No  " };
    let body = format!(
        "Replace the current {} groups with a fresh shuffle?\n\n  {}    {}",
        app.board.groups().len(),
        yes,
        no
    );
    let p = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Generate groups")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 76u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::ITALIC));
    let heading = |t: &'static str| {
        Line::from(Span::styled(t, Style::default().add_modifier(Modifier::BOLD)))
    };
    let lines: Vec<Line> = vec![
        heading("Groups"),
        Line::from(vec![Span::raw("Generate random groups: "), key("g")]),
        Line::from(vec![Span::raw("Move cursor: "), key("Arrow keys / h j k l")]),
        Line::raw("Cursor on a group title selects the whole group."),
        Line::raw(""),
        heading("Moving with the keyboard"),
        Line::from(vec![
            Span::raw("Move student up/down in its group: "),
            key("Shift+Up/Down, K/J"),
        ]),
        Line::from(vec![
            Span::raw("Move student to the previous/next group: "),
            key("Shift+Left/Right, H/L"),
        ]),
        Line::raw("  (wraps around from the first group to the last)"),
        Line::from(vec![Span::raw("Move a whole group: same keys on its title")]),
        Line::raw("  (stops at the first and last position)"),
        Line::raw(""),
        heading("Drag and drop"),
        Line::from(vec![Span::raw("Mouse: "), key("press, drag, release")]),
        Line::from(vec![
            Span::raw("Keyboard: "),
            key("Space"),
            Span::raw(" pick up, arrows aim, "),
            key("Space"),
            Span::raw(" drop, "),
            key("Esc"),
            Span::raw(" cancel"),
        ]),
        Line::raw("A student hovered over another group joins it immediately."),
        Line::raw(""),
        Line::from(vec![Span::raw("Keybindings panel: "), key("Tab")]),
        Line::from(vec![Span::raw("Quit: "), key("q")]),
        Line::from(vec![Span::raw("Close help: "), key("Esc / Enter")]),
    ];

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
