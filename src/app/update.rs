use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;

use crate::app::config::Cli;
use crate::app::controller::{Direction, DragItem, DropOutcome, DropTarget};
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState, PointerPress};
use crate::ui;

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    cli: &Cli,
) -> Result<()> {
    let mut app = AppState::new(cli).map_err(|e| anyhow::anyhow!(e))?;

    loop {
        terminal.draw(|f| {
            ui::render(f, &mut app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut app, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }
    }

    tracing::info!(uptime_ms = app.started_at.elapsed().as_millis() as u64, "exiting");
    Ok(())
}

/// Dispatch one key press. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    match app.input_mode {
        InputMode::Modal => {
            handle_modal_key(app, key.code);
            false
        }
        InputMode::KeyboardDrag => handle_drag_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else {
        return false;
    };
    match action {
        KeyAction::Quit => return true,
        KeyAction::OpenHelp => open_modal(app, ModalState::Help { scroll: 0 }),
        KeyAction::ToggleKeybindsPane => app.show_keybinds = !app.show_keybinds,
        KeyAction::Regenerate => {
            if app.board.groups().is_empty() {
                regenerate(app);
            } else {
                open_modal(app, ModalState::ConfirmRegenerate { selected: 1 });
            }
        }
        KeyAction::PickUpDrop => {
            if let Some(item) = app.focused_item() {
                app.status = Some(format!("Carrying {}", describe_item(app, &item)));
                app.board.drag_start(item);
                app.input_mode = InputMode::KeyboardDrag;
            } else if app.board.groups().is_empty() {
                open_modal(
                    app,
                    ModalState::Info {
                        message: "There are no groups yet. Press g to generate them.".to_string(),
                    },
                );
            }
        }
        KeyAction::Cancel => app.status = None,
        KeyAction::FocusUp => app.focus_up(),
        KeyAction::FocusDown => app.focus_down(),
        KeyAction::FocusLeft => app.focus_left(),
        KeyAction::FocusRight => app.focus_right(),
        KeyAction::MoveItemUp => move_focused(app, Direction::Up),
        KeyAction::MoveItemDown => move_focused(app, Direction::Down),
        KeyAction::MoveItemLeft => move_focused(app, Direction::Left),
        KeyAction::MoveItemRight => move_focused(app, Direction::Right),
        KeyAction::Ignore => {}
    }
    false
}

/// While carrying an item, cursor moves become hover events.
fn handle_drag_key(app: &mut AppState, key: KeyEvent) -> bool {
    let Some(action) = app.keymap.resolve(&key) else {
        return false;
    };
    match action {
        KeyAction::Quit => {
            app.board.drag_cancel();
            return true;
        }
        KeyAction::FocusUp => app.focus_up(),
        KeyAction::FocusDown => app.focus_down(),
        KeyAction::FocusLeft => app.focus_left(),
        KeyAction::FocusRight => app.focus_right(),
        KeyAction::PickUpDrop => {
            let target = app.focused_target();
            finish_drag(app, target);
            return false;
        }
        KeyAction::Cancel => {
            finish_drag(app, None);
            return false;
        }
        _ => return false,
    }
    if let Some(target) = app.focused_target() {
        app.board.drag_over(&target);
        app.clamp_selection();
    }
    false
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                close_modal(app)
            }
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                close_modal(app);
            }
        }
        Some(ModalState::ConfirmRegenerate { selected }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => close_modal(app),
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::Char('h')
            | KeyCode::Char('l') => {
                *selected = 1 - (*selected).min(1);
            }
            KeyCode::Char('y') => {
                close_modal(app);
                regenerate(app);
            }
            KeyCode::Enter => {
                let yes = *selected == 0;
                close_modal(app);
                if yes {
                    regenerate(app);
                }
            }
            _ => {}
        },
        None => app.input_mode = InputMode::Normal,
    }
}

/// Pointer drag: press records the item, movement past the threshold starts
/// the gesture, every move hovers, release drops.
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    if app.input_mode != InputMode::Normal {
        return;
    }
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(target) = app.layout.hit_test(x, y) else {
                return;
            };
            let item = match target {
                DropTarget::Student { student_id, .. } => DragItem::Student(student_id),
                DropTarget::Group(group_id) => DragItem::Group(group_id),
            };
            app.follow_item(&item);
            app.pointer = Some(PointerPress {
                origin: (x, y),
                item,
            });
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if !app.board.is_dragging() {
                let Some(press) = &app.pointer else {
                    return;
                };
                let dist = u32::from(x.abs_diff(press.origin.0))
                    + u32::from(y.abs_diff(press.origin.1));
                if dist < u32::from(app.drag_threshold) {
                    return;
                }
                let item = press.item.clone();
                app.board.drag_start(item);
            }
            app.pointer_pos = Some((x, y));
            if let Some(target) = app.layout.hit_test(x, y) {
                app.board.drag_over(&target);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.pointer = None;
            app.pointer_pos = None;
            if app.board.is_dragging() {
                let target = app.layout.hit_test(x, y);
                finish_drag(app, target);
            }
        }
        _ => {}
    }
}

fn finish_drag(app: &mut AppState, target: Option<DropTarget>) {
    let item = app.board.active_item().cloned();
    let outcome = app.board.drag_end(target.as_ref());
    app.input_mode = InputMode::Normal;
    if let Some(item) = &item {
        app.follow_item(item);
    }
    app.status = Some(describe_outcome(&outcome));
}

fn move_focused(app: &mut AppState, direction: Direction) {
    let Some(item) = app.focused_item() else {
        return;
    };
    let moved = match &item {
        DragItem::Student(id) => app.board.move_student(id, direction),
        DragItem::Group(id) => app.board.move_group(id, direction),
    };
    if moved {
        app.follow_item(&item);
    }
}

fn regenerate(app: &mut AppState) {
    app.board.regenerate(&mut app.rng);
    app.selection = Default::default();
    app.status = Some(format!(
        "Generated {} groups from {} students",
        app.board.groups().len(),
        app.board.roster().len()
    ));
}

fn describe_item(app: &AppState, item: &DragItem) -> String {
    match item {
        DragItem::Student(id) => crate::grouping::locate_student(app.board.groups(), id)
            .map(|(g, s)| app.board.groups()[g].students[s].name.clone())
            .unwrap_or_else(|| id.clone()),
        DragItem::Group(id) => match app.board.original_index(id) {
            Some(i) => format!("Group {}", i + 1),
            None => id.clone(),
        },
    }
}

fn describe_outcome(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Cancelled => "Drop cancelled".to_string(),
        DropOutcome::Unchanged => "Dropped".to_string(),
        DropOutcome::GroupsReordered { from, to } => {
            format!("Moved group from position {} to {}", from + 1, to + 1)
        }
        DropOutcome::StudentsReordered { from, to, .. } => {
            format!("Moved student from slot {} to {}", from + 1, to + 1)
        }
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}
