// Integration tests for student-groups
// These drive AppState the way the event loop does and render into a TestBackend.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use student_groups::app::config::Cli;
use student_groups::app::controller::{Controller, Direction, DragItem, DropTarget};
use student_groups::app::keymap::{KeyAction, Keymap};
use student_groups::app::update::{handle_key, handle_mouse};
use student_groups::app::{AppState, InputMode, ModalState, Selection, Theme};
use student_groups::grouping::{self, Group};
use student_groups::roster::{Roster, Student};
use student_groups::ui;

fn temp_dir(tag: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("sg_{}_{}_{}", tag, std::process::id(), nonce));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn st(n: usize) -> Student {
    Student::new(format!("s{n}"), format!("Student {n}"))
}

fn board() -> AppState {
    AppState::with_board(Controller::from_groups(
        vec![
            Group::new("g1", vec![st(1), st(2)]),
            Group::new("g2", vec![st(3), st(4)]),
            Group::new("g3", vec![st(5)]),
        ],
        2,
    ))
}

fn ids(app: &AppState, g: usize) -> Vec<&str> {
    app.board.groups()[g]
        .students
        .iter()
        .map(|s| s.id.as_str())
        .collect()
}

fn order(app: &AppState) -> Vec<&str> {
    app.board.groups().iter().map(|g| g.id.as_str()).collect()
}

fn key(app: &mut AppState, code: KeyCode, mods: KeyModifiers) -> bool {
    handle_key(app, KeyEvent::new(code, mods))
}

fn draw(term: &mut Terminal<TestBackend>, app: &mut AppState) {
    term.draw(|f| ui::render(f, app)).unwrap();
}

fn mouse(app: &mut AppState, kind: MouseEventKind, (x, y): (u16, u16)) {
    handle_mouse(
        app,
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        },
    );
}

/// Screen cell of the card showing `student_id` in the last render.
fn card_cell(app: &AppState, student_id: &str) -> (u16, u16) {
    for slot in &app.layout.slots {
        if let Some((_, r)) = slot.cards.iter().find(|(id, _)| id == student_id) {
            return (r.x + 2, r.y);
        }
    }
    panic!("no card for {student_id}");
}

/// Top border cell of the group `group_id` in the last render.
fn group_cell(app: &AppState, group_id: &str) -> (u16, u16) {
    let slot = app
        .layout
        .slots
        .iter()
        .find(|s| s.group_id == group_id)
        .expect("group slot");
    (slot.area.x + 3, slot.area.y)
}

/// Text of one screen row in the last rendered frame.
fn row_text(term: &Terminal<TestBackend>, y: u16) -> String {
    let buf = term.backend().buffer();
    let w = usize::from(buf.area.width);
    let start = usize::from(y) * w;
    buf.content()[start..start + w]
        .iter()
        .map(|c| c.symbol())
        .collect()
}

#[test]
fn test_theme_roundtrip_and_init() {
    let dir = temp_dir("theme");
    let path = dir.join("theme.conf");

    let t = Theme::load_or_init(&path);
    assert!(path.exists(), "default theme should be written");
    assert_eq!(t, Theme::mocha());

    let mut custom = Theme::mocha();
    custom.drop_target = ratatui::style::Color::Rgb(1, 2, 3);
    custom.write_file(&path).unwrap();
    let back = Theme::from_file(&path).expect("parse theme");
    assert_eq!(back, custom);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_keymap_file_overrides_defaults() {
    let dir = temp_dir("keys");
    let path = dir.join("keybinds.conf");
    std::fs::write(
        &path,
        "# custom\nRegenerate = r\nMoveItemLeft = Ctrl+Left\nBogus = x\n",
    )
    .unwrap();

    let km = Keymap::from_file(&path).expect("parse keymap");
    let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
    assert_eq!(km.resolve(&r), Some(KeyAction::Regenerate));
    let cl = KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL);
    assert_eq!(km.resolve(&cl), Some(KeyAction::MoveItemLeft));
    // untouched defaults remain
    let g = KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE);
    assert_eq!(km.resolve(&g), Some(KeyAction::Regenerate));

    // a written file reads back to the same bindings
    km.write_file(&path).unwrap();
    let again = Keymap::from_file(&path).unwrap();
    let a: HashSet<_> = km.all_bindings().into_iter().collect();
    let b: HashSet<_> = again.all_bindings().into_iter().collect();
    assert_eq!(a, b);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_app_new_generates_seeded_groups() {
    let dir = temp_dir("app");
    let cli = Cli {
        config_dir: Some(dir.clone()),
        seed: Some(42),
        generate: true,
        ..Default::default()
    };
    let app = AppState::new(&cli).expect("app state");
    let groups = app.board.groups();
    assert_eq!(groups.len(), 6);
    assert!(groups.iter().all(|g| g.students.len() == 5));

    let mut seen = grouping::student_ids(groups);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 30);

    // same seed, same shuffle
    let again = AppState::new(&cli).unwrap();
    assert_eq!(again.board.groups(), groups);
    assert!(dir.join("theme.conf").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_keybinds_come_from_chosen_config_dir_only() {
    let root = temp_dir("cfgdir");
    let home_cfg = root.join("home/.config/student-groups");
    std::fs::create_dir_all(&home_cfg).unwrap();
    std::fs::write(home_cfg.join("keybinds.conf"), "Regenerate = r\n").unwrap();
    // Only this test touches HOME; every other test passes an explicit config dir.
    unsafe {
        std::env::set_var("HOME", root.join("home"));
        std::env::remove_var("XDG_CONFIG_HOME");
    }

    let explicit = root.join("explicit");
    let cli = Cli {
        config_dir: Some(explicit.clone()),
        ..Default::default()
    };
    let app = AppState::new(&cli).unwrap();

    assert!(explicit.join("theme.conf").exists());
    assert!(explicit.join("keybinds.conf").exists());
    let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
    assert_eq!(app.keymap.resolve(&r), None);

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_app_starts_without_groups() {
    let dir = temp_dir("empty");
    let cli = Cli {
        config_dir: Some(dir.clone()),
        students: 10,
        group_size: 3,
        ..Default::default()
    };
    let mut app = AppState::new(&cli).unwrap();
    assert!(app.board.groups().is_empty());

    // no confirmation when there is nothing to lose
    key(&mut app, KeyCode::Char('g'), KeyModifiers::NONE);
    let sizes: Vec<_> = app.board.groups().iter().map(|g| g.students.len()).collect();
    assert_eq!(sizes, [3, 3, 3, 1]);
    for (i, g) in app.board.groups().iter().enumerate() {
        assert_eq!(app.board.original_index(&g.id), Some(i));
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_pick_up_without_groups_shows_info() {
    let mut app = AppState::with_board(Controller::from_groups(Vec::new(), 5));
    key(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
    assert_eq!(app.input_mode, InputMode::Modal);
    assert!(matches!(app.modal, Some(ModalState::Info { .. })));
    key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.modal.is_none());
}

#[test]
fn test_regenerate_asks_before_replacing() {
    let mut app = board();
    let before: Vec<Group> = app.board.groups().to_vec();

    key(&mut app, KeyCode::Char('g'), KeyModifiers::NONE);
    assert_eq!(
        app.modal,
        Some(ModalState::ConfirmRegenerate { selected: 1 })
    );
    // Enter on the default "No" keeps everything
    key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    assert_eq!(app.board.groups(), before.as_slice());
    assert_eq!(app.input_mode, InputMode::Normal);

    key(&mut app, KeyCode::Char('g'), KeyModifiers::NONE);
    key(&mut app, KeyCode::Char('y'), KeyModifiers::NONE);
    assert!(app.modal.is_none());
    let sizes: Vec<_> = app.board.groups().iter().map(|g| g.students.len()).collect();
    assert_eq!(sizes, [2, 2, 1]);
    assert_eq!(app.board.groups()[0].id, "group-1");
}

#[test]
fn test_shift_left_wraps_students_but_clamps_groups() {
    let mut app = board();

    app.selection = Selection {
        group: 0,
        student: Some(0),
    };
    key(&mut app, KeyCode::Left, KeyModifiers::SHIFT);
    assert_eq!(ids(&app, 0), ["s2"]);
    assert_eq!(ids(&app, 2), ["s5", "s1"]);
    assert_eq!(
        app.selection,
        Selection {
            group: 2,
            student: Some(1)
        }
    );

    app.selection = Selection {
        group: 0,
        student: None,
    };
    key(&mut app, KeyCode::Left, KeyModifiers::SHIFT);
    assert_eq!(order(&app), ["g1", "g2", "g3"]);

    key(&mut app, KeyCode::Char('L'), KeyModifiers::SHIFT);
    assert_eq!(order(&app), ["g2", "g1", "g3"]);
    assert_eq!(
        app.selection,
        Selection {
            group: 1,
            student: None
        }
    );
}

#[test]
fn test_keyboard_drag_migrates_then_places() {
    let mut app = board();
    app.selection = Selection {
        group: 0,
        student: Some(0),
    };

    key(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
    assert_eq!(app.input_mode, InputMode::KeyboardDrag);
    assert_eq!(
        app.board.active_item(),
        Some(&DragItem::Student("s1".into()))
    );

    // hovering the next group moves the student there at once
    key(&mut app, KeyCode::Right, KeyModifiers::NONE);
    assert_eq!(ids(&app, 0), ["s2"]);
    assert_eq!(ids(&app, 1), ["s3", "s4", "s1"]);

    key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(!app.board.is_dragging());
    assert_eq!(ids(&app, 1), ["s1", "s3", "s4"]);
    assert_eq!(
        app.selection,
        Selection {
            group: 1,
            student: Some(0)
        }
    );
}

#[test]
fn test_keyboard_drag_cancel_keeps_migration() {
    let mut app = board();
    app.selection = Selection {
        group: 1,
        student: Some(1),
    };
    key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
    key(&mut app, KeyCode::Left, KeyModifiers::NONE);
    key(&mut app, KeyCode::Esc, KeyModifiers::NONE);

    assert!(!app.board.is_dragging());
    assert_eq!(ids(&app, 0), ["s1", "s2", "s4"]);
    assert_eq!(ids(&app, 1), ["s3"]);
}

#[test]
fn test_quit_during_drag_clears_state() {
    let mut app = board();
    app.selection = Selection {
        group: 0,
        student: None,
    };
    key(&mut app, KeyCode::Char(' '), KeyModifiers::NONE);
    assert!(app.board.is_dragging());
    assert!(key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE));
    assert!(!app.board.is_dragging());
}

#[test]
fn test_mouse_drag_student_across_groups() {
    let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut app = board();
    draw(&mut term, &mut app);
    assert_eq!(app.layout.slots.len(), 3);

    let start = card_cell(&app, "s1");
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), start);
    assert!(!app.board.is_dragging(), "press alone is not a drag");

    let over = card_cell(&app, "s3");
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), over);
    assert!(app.board.is_dragging());
    assert_eq!(ids(&app, 1), ["s3", "s4", "s1"]);

    draw(&mut term, &mut app);
    let release = card_cell(&app, "s3");
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), release);
    assert!(!app.board.is_dragging());
    assert!(app.pointer.is_none());
    assert_eq!(ids(&app, 0), ["s2"]);
    assert_eq!(ids(&app, 1), ["s1", "s3", "s4"]);
}

#[test]
fn test_mouse_drag_group_reorders() {
    let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut app = board();
    draw(&mut term, &mut app);

    let start = group_cell(&app, "g1");
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), start);
    let target = group_cell(&app, "g3");
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), target);
    assert_eq!(order(&app), ["g1", "g2", "g3"], "hovering never reorders groups");

    draw(&mut term, &mut app);
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), target);
    assert_eq!(order(&app), ["g2", "g3", "g1"]);
}

#[test]
fn test_mouse_release_outside_board_cancels() {
    let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut app = board();
    draw(&mut term, &mut app);

    let start = card_cell(&app, "s2");
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), start);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), (start.0 + 3, start.1));
    assert!(app.board.is_dragging());
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), (1, 0));

    assert!(!app.board.is_dragging());
    assert_eq!(ids(&app, 0), ["s1", "s2"]);
}

#[test]
fn test_drag_threshold_holds_back_small_moves() {
    let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut app = board();
    app.drag_threshold = 4;
    draw(&mut term, &mut app);

    let (x, y) = card_cell(&app, "s1");
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), (x, y));
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), (x + 2, y + 1));
    assert!(!app.board.is_dragging());
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), (x + 3, y + 1));
    assert!(app.board.is_dragging());
}

#[test]
fn test_render_shows_numbers_and_ghost() {
    let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut app = board();
    app.board.move_group("g1", Direction::Right);
    draw(&mut term, &mut app);

    let screen: String = term
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect();
    // numbering follows creation order, not position
    assert!(screen.contains("Group 2 (2 students)"));
    assert!(screen.contains("Student 5"));

    let start = card_cell(&app, "s5");
    mouse(&mut app, MouseEventKind::Down(MouseButton::Left), start);
    mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), (start.0, start.1 + 6));
    draw(&mut term, &mut app);
    assert_eq!(app.pointer_pos, Some((start.0, start.1 + 6)));
    assert_eq!(app.board.active_student().map(|s| s.id.as_str()), Some("s5"));

    // the ghost box hangs from the pointer row, name on its first inner line
    let ghost_row = row_text(&term, start.1 + 7);
    let byte = ghost_row.find("Student 5").expect("ghost label drawn");
    let col = ghost_row[..byte].chars().count();
    assert!(col > usize::from(start.0), "ghost sits right of the pointer: {ghost_row:?}");
    assert!(row_text(&term, start.1 + 6).contains('╭'));

    // released outside any group: the ghost goes away
    mouse(&mut app, MouseEventKind::Up(MouseButton::Left), (start.0, start.1 + 6));
    draw(&mut term, &mut app);
    assert!(!row_text(&term, start.1 + 7).contains("Student 5"));
}

#[test]
fn test_help_modal_lists_keyboard_drag() {
    let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
    let mut app = board();
    key(&mut app, KeyCode::Char('?'), KeyModifiers::NONE);
    assert_eq!(app.modal, Some(ModalState::Help { scroll: 0 }));
    draw(&mut term, &mut app);

    let rows: Vec<String> = (0..30).map(|y| row_text(&term, y)).collect();
    assert!(rows.iter().any(|r| r.contains("Keyboard: Space pick up, arrows aim, Space drop")));

    key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
    assert!(app.modal.is_none());
}

#[test]
fn test_render_group_taller_than_terminal() {
    let mut board = Controller::new(Roster::generate(65_534), 65_534);
    board.regenerate(&mut StdRng::seed_from_u64(1));
    let mut app = AppState::with_board(board);
    let mut term = Terminal::new(TestBackend::new(80, 24)).unwrap();

    draw(&mut term, &mut app);

    let slot = &app.layout.slots[0];
    assert_eq!(app.layout.slots.len(), 1);
    // only the rows that fit on screen get cards
    assert_eq!(slot.cards.len(), usize::from(slot.area.height - 2));
}

#[test]
fn test_random_operations_preserve_membership() {
    let mut rng = StdRng::seed_from_u64(7);
    let roster: Vec<Student> = (1..=23).map(st).collect();
    let (groups, _) = grouping::partition(&roster, 4);
    let mut app = AppState::with_board(Controller::from_groups(groups, 4));

    let mut expected: Vec<String> = roster.iter().map(|s| s.id.clone()).collect();
    expected.sort();

    let dirs = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];
    for _ in 0..500 {
        let n = app.board.groups().len();
        let pick_student = format!("s{}", rng.random_range(1..=25));
        let pick_group = format!("group-{}", rng.random_range(1..=n + 1));
        let dir = dirs[rng.random_range(0..dirs.len())];
        match rng.random_range(0..6) {
            0 => {
                app.board.move_student(&pick_student, dir);
            }
            1 => {
                app.board.move_group(&pick_group, dir);
            }
            2 => {
                app.board.drag_start(DragItem::Student(pick_student));
                app.board.drag_over(&DropTarget::Group(pick_group));
            }
            3 => {
                let target = app.board.groups().get(rng.random_range(0..n)).and_then(|g| {
                    g.students.first().map(|s| DropTarget::Student {
                        group_id: g.id.clone(),
                        student_id: s.id.clone(),
                    })
                });
                app.board.drag_end(target.as_ref());
            }
            4 => {
                app.board.drag_start(DragItem::Group(pick_group));
                app.board.drag_end(Some(&DropTarget::Group(format!(
                    "group-{}",
                    rng.random_range(1..=n)
                ))));
            }
            _ => {
                app.board.drag_cancel();
            }
        }

        let mut now: Vec<String> = grouping::student_ids(app.board.groups())
            .into_iter()
            .map(String::from)
            .collect();
        now.sort();
        assert_eq!(now, expected);
        assert_eq!(app.board.groups().len(), 6);
    }
}
