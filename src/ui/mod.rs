pub mod board;
pub mod components;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    let mode = match app.input_mode {
        InputMode::KeyboardDrag => "  [carrying: arrows to aim, Enter to drop, Esc to cancel]",
        _ => "",
    };
    let p = Paragraph::new(format!(
        "students:{}  groups:{}  group size:{}{mode}  g: generate; Space: pick up; Shift+arrows: move; ?: help; q: quit",
        app.board.roster().len(),
        app.board.groups().len(),
        app.board.group_size(),
    ))
    .block(
        Block::default()
            .title("Student Group Manager")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    let board_area = if app.show_keybinds {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
            .split(root[1]);
        components::render_keybinds_panel(f, body[1], app);
        body[0]
    } else {
        root[1]
    };

    board::render_board(f, board_area, app);
    board::render_drag_ghost(f, f.area(), app);
    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    match &app.modal {
        Some(ModalState::Help { scroll }) => components::render_help_modal(f, area, app, *scroll),
        Some(ModalState::Info { message }) => components::render_info_modal(f, area, app, message),
        Some(ModalState::ConfirmRegenerate { selected }) => {
            components::render_confirm_modal(f, area, app, *selected)
        }
        None => {}
    }
}
