//! Board rendering: groups as bordered columns in a grid, one row per student.
//!
//! Rendering also records where every group and card landed on screen so
//! mouse events can be hit-tested against the frame the user actually saw.
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::controller::DragItem;
use crate::app::{AppState, BoardLayout, GroupSlot, InputMode};

/// Narrowest a group column is allowed to get before wrapping to a new row.
const MIN_GROUP_WIDTH: u16 = 26;

/// Render all groups and refresh `app.layout`.
pub fn render_board(f: &mut Frame, area: Rect, app: &mut AppState) {
    let groups = app.board.groups();
    if groups.is_empty() {
        app.layout = BoardLayout::default();
        render_empty(f, area, app);
        return;
    }

    let hover_group = hovered_group(app);
    let cols = ((area.width / MIN_GROUP_WIDTH).max(1) as usize).min(groups.len());
    let heights: Vec<Constraint> = groups
        .chunks(cols)
        .map(|row| {
            let tallest = row.iter().map(|g| g.students.len()).max().unwrap_or(0).max(1);
            Constraint::Length(u16::try_from(tallest).unwrap_or(u16::MAX).saturating_add(2))
        })
        .collect();
    let row_rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(heights)
        .split(area);

    let mut slots = Vec::with_capacity(groups.len());
    for (ri, row) in groups.chunks(cols).enumerate() {
        let col_rects = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(row_rects[ri]);
        for ci in 0..row.len() {
            let pos = ri * cols + ci;
            slots.push(render_group(f, col_rects[ci], app, pos, hover_group.as_deref()));
        }
    }
    app.layout = BoardLayout { slots };
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState) {
    let msg = format!(
        "{} students, no groups yet.\n\nPress g to generate random groups of {}.",
        app.board.roster().len(),
        app.board.group_size()
    );
    let p = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.muted))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

/// Group currently under the pointer or keyboard cursor during a drag.
fn hovered_group(app: &AppState) -> Option<String> {
    if !app.board.is_dragging() {
        return None;
    }
    if let Some((x, y)) = app.pointer_pos {
        return app.layout.hit_test(x, y).map(|t| t.group_id().to_string());
    }
    if app.input_mode == InputMode::KeyboardDrag {
        return app.focused_target().map(|t| t.group_id().to_string());
    }
    None
}

fn render_group(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    pos: usize,
    hover_group: Option<&str>,
) -> GroupSlot {
    let group = &app.board.groups()[pos];
    let active = app.board.active_item();
    let number = app.board.original_index(&group.id).unwrap_or(pos) + 1;
    let is_cursor_group = app.selection.group == pos;
    let header_focused = is_cursor_group && app.selection.student.is_none();
    let is_drop_target = hover_group == Some(group.id.as_str());
    let is_drag_source = matches!(active, Some(DragItem::Group(id)) if *id == group.id);

    let (border_type, border_style) = if is_drop_target {
        (BorderType::Double, Style::default().fg(app.theme.drop_target))
    } else if is_drag_source {
        (BorderType::Plain, Style::default().fg(app.theme.muted))
    } else if header_focused {
        (BorderType::Thick, Style::default().fg(app.theme.highlight_fg))
    } else {
        (BorderType::Rounded, Style::default().fg(app.theme.border))
    };
    let title_style = if header_focused {
        Style::default()
            .fg(app.theme.highlight_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.title)
    };

    let block = Block::default()
        .title(format!("Group {} ({} students)", number, group.students.len()))
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if group.students.is_empty() {
        if inner.height > 0 {
            let p = Paragraph::new("  (empty)").style(Style::default().fg(app.theme.muted));
            f.render_widget(p, Rect { height: 1, ..inner });
        }
        return GroupSlot {
            group_id: group.id.clone(),
            area,
            cards: Vec::new(),
        };
    }

    let mut cards = Vec::with_capacity(group.students.len());
    for (i, student) in group.students.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        let rect = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let selected = is_cursor_group && app.selection.student == Some(i);
        let dragged = matches!(active, Some(DragItem::Student(id)) if *id == student.id);
        let style = if dragged {
            Style::default()
                .fg(app.theme.muted)
                .add_modifier(Modifier::DIM)
        } else if selected {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let prefix = if selected { "▶ " } else { "  " };
        f.render_widget(
            Paragraph::new(format!("{prefix}{}", student.name)).style(style),
            rect,
        );
        cards.push((student.id.clone(), rect));
    }

    GroupSlot {
        group_id: group.id.clone(),
        area,
        cards,
    }
}

/// Floating card that follows the pointer during a mouse drag.
pub fn render_drag_ghost(f: &mut Frame, area: Rect, app: &AppState) {
    let Some((x, y)) = app.pointer_pos else {
        return;
    };
    let label = match (app.board.active_student(), app.board.active_item()) {
        (Some(student), _) => student.name.clone(),
        (None, Some(DragItem::Group(id))) => match app.board.original_index(id) {
            Some(i) => format!("Group {}", i + 1),
            None => id.clone(),
        },
        _ => return,
    };
    let width = (label.chars().count() as u16 + 4).min(area.width);
    let height = 3u16.min(area.height);
    let rect = Rect {
        x: x.saturating_add(1).min(area.right().saturating_sub(width)),
        y: y.min(area.bottom().saturating_sub(height)),
        width,
        height,
    };
    let p = Paragraph::new(format!(" {label}"))
        .style(Style::default().fg(app.theme.ghost).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.theme.ghost)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
