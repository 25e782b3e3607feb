//! Application state types and entry glue.
//!
//! `AppState` pairs the interaction [`controller::Controller`] with the
//! terminal-side state: the selection cursor, input mode, modals, colors,
//! keymap, and the hit-test layout recorded by the last render.
//!
pub mod config;
pub mod controller;
pub mod keymap;
pub mod update;

use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::layout::{Position, Rect};
use ratatui::style::Color;
use std::path::Path;
use std::time::Instant;

use crate::error::Result;
use crate::roster::Roster;
use config::Cli;
use controller::{Controller, DragItem, DropTarget};
use keymap::Keymap;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// An item was picked up with the keyboard; cursor moves hover targets.
    KeyboardDrag,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub drop_target: Color,
    pub ghost: Color,
}

impl Theme {
    /// Plain ANSI palette for terminals without true color.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            drop_target: Color::Green,
            ghost: Color::Magenta,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            drop_target: Color::Rgb(0xa6, 0xe3, 0xa1),  // green
            ghost: Color::Rgb(0xf5, 0xc2, 0xe7),        // pink
        }
    }

    fn slots(&mut self) -> [(&'static str, &mut Color); 12] {
        [
            ("text", &mut self.text),
            ("muted", &mut self.muted),
            ("title", &mut self.title),
            ("border", &mut self.border),
            ("header_bg", &mut self.header_bg),
            ("header_fg", &mut self.header_fg),
            ("status_bg", &mut self.status_bg),
            ("status_fg", &mut self.status_fg),
            ("highlight_fg", &mut self.highlight_fg),
            ("highlight_bg", &mut self.highlight_bg),
            ("drop_target", &mut self.drop_target),
            ("ghost", &mut self.ghost),
        ]
    }

    /// Load theme from a `key = value` file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            if let Some((_, slot)) = theme.slots().into_iter().find(|(k, _)| *k == key.trim()) {
                *slot = color;
            }
        }
        Some(theme)
    }

    /// Parse "#RRGGBB", "RRGGBB" or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn color_to_str(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Reset => "reset".to_string(),
            // Named colors get a best-effort hex approximation
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Blue => "#0000FF".to_string(),
            Color::Magenta => "#FF00FF".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::White => "#FFFFFF".to_string(),
            other => format!("{other:?}"),
        }
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# student-groups theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        let mut copy = *self;
        for (key, color) in copy.slots() {
            let _ = writeln!(&mut buf, "{} = {}", key, Self::color_to_str(*color));
        }
        config::ensure_parent(path)?;
        std::fs::write(path, buf)
    }

    /// Read `path` if present, otherwise write the default theme there and use it.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default theme");
        }
        t
    }
}

/// Modal dialogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    Help { scroll: u16 },
    Info { message: String },
    /// Regenerating throws the current arrangement away; 0 = Yes, 1 = No.
    ConfirmRegenerate { selected: usize },
}

/// Keyboard cursor: a group position plus an optional student position.
/// `student == None` means the group header is focused.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub group: usize,
    pub student: Option<usize>,
}

/// Screen rectangles of one rendered group, used for mouse hit-testing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSlot {
    pub group_id: String,
    pub area: Rect,
    pub cards: Vec<(String, Rect)>,
}

/// Hit-test data recorded by the last render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardLayout {
    pub slots: Vec<GroupSlot>,
}

impl BoardLayout {
    /// What lies under the cell `(x, y)`: a student card, a group frame, or nothing.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<DropTarget> {
        let pos = Position::new(x, y);
        let slot = self.slots.iter().find(|s| s.area.contains(pos))?;
        let card = slot.cards.iter().find(|(_, r)| r.contains(pos));
        Some(match card {
            Some((student_id, _)) => DropTarget::Student {
                group_id: slot.group_id.clone(),
                student_id: student_id.clone(),
            },
            None => DropTarget::Group(slot.group_id.clone()),
        })
    }
}

/// Left button held down but not yet far enough to count as a drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointerPress {
    pub origin: (u16, u16),
    pub item: DragItem,
}

pub struct AppState {
    pub started_at: Instant,
    pub board: Controller,
    pub selection: Selection,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub show_keybinds: bool,
    pub layout: BoardLayout,
    pub pointer: Option<PointerPress>,
    /// Last pointer position while a pointer drag is active (ghost overlay).
    pub pointer_pos: Option<(u16, u16)>,
    pub drag_threshold: u16,
    pub status: Option<String>,
    pub rng: StdRng,
}

impl AppState {
    /// Build state from parsed command-line settings, loading roster, theme and keymap.
    ///
    /// # Arguments
    ///
    /// * `cli` - Parsed settings; `config_dir()` decides where `theme.conf` and
    ///   `keybinds.conf` are read from or created.
    ///
    /// # Returns
    ///
    /// An error only when `--roster` names a file that cannot be read or holds no names.
    pub fn new(cli: &Cli) -> Result<Self> {
        let roster = match &cli.roster {
            Some(path) => Roster::from_file(path)?,
            None => Roster::generate(cli.students),
        };
        tracing::info!(students = roster.len(), group_size = cli.group_size, "roster ready");

        let mut app = Self::with_board(Controller::new(roster, cli.group_size));
        app.theme = Theme::load_or_init(&cli.theme_path());
        app.keymap = Keymap::load_or_init(&cli.keybinds_path());
        app.drag_threshold = cli.drag_threshold;
        if let Some(seed) = cli.seed {
            app.rng = StdRng::seed_from_u64(seed);
        }
        if cli.generate {
            app.board.regenerate(&mut app.rng);
        }
        Ok(app)
    }

    /// State around an existing controller with default theme and keymap.
    pub fn with_board(board: Controller) -> Self {
        Self {
            started_at: Instant::now(),
            board,
            selection: Selection::default(),
            input_mode: InputMode::Normal,
            theme: Theme::mocha(),
            keymap: Keymap::default(),
            modal: None,
            show_keybinds: false,
            layout: BoardLayout::default(),
            pointer: None,
            pointer_pos: None,
            drag_threshold: 1,
            status: None,
            rng: StdRng::from_os_rng(),
        }
    }

    /// The item under the keyboard cursor, if any.
    pub fn focused_item(&self) -> Option<DragItem> {
        let group = self.board.groups().get(self.selection.group)?;
        Some(match self.selection.student {
            Some(i) => DragItem::Student(group.students.get(i)?.id.clone()),
            None => DragItem::Group(group.id.clone()),
        })
    }

    /// The keyboard cursor seen as a drop target.
    pub fn focused_target(&self) -> Option<DropTarget> {
        let group = self.board.groups().get(self.selection.group)?;
        Some(match self.selection.student.and_then(|i| group.students.get(i)) {
            Some(s) => DropTarget::Student {
                group_id: group.id.clone(),
                student_id: s.id.clone(),
            },
            None => DropTarget::Group(group.id.clone()),
        })
    }

    /// Pull the cursor back inside the current grouping.
    pub fn clamp_selection(&mut self) {
        let groups = self.board.groups();
        if groups.is_empty() {
            self.selection = Selection::default();
            return;
        }
        self.selection.group = self.selection.group.min(groups.len() - 1);
        let len = groups[self.selection.group].students.len();
        self.selection.student = match self.selection.student {
            Some(_) if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
    }

    /// Put the cursor on the student with `id`; returns false if not found.
    pub fn select_student(&mut self, id: &str) -> bool {
        match crate::grouping::locate_student(self.board.groups(), id) {
            Some((g, s)) => {
                self.selection = Selection {
                    group: g,
                    student: Some(s),
                };
                true
            }
            None => false,
        }
    }

    /// Put the cursor on the header of the group with `id`.
    pub fn select_group(&mut self, id: &str) -> bool {
        match crate::grouping::group_position(self.board.groups(), id) {
            Some(g) => {
                self.selection = Selection {
                    group: g,
                    student: None,
                };
                true
            }
            None => false,
        }
    }

    /// Keep the cursor on whatever item was picked up, wherever it went.
    pub fn follow_item(&mut self, item: &DragItem) {
        let found = match item {
            DragItem::Student(id) => self.select_student(id),
            DragItem::Group(id) => self.select_group(id),
        };
        if !found {
            self.clamp_selection();
        }
    }

    /// Move the cursor one student up; from the first student it lands on the group header.
    pub fn focus_up(&mut self) {
        self.selection.student = match self.selection.student {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }

    /// Move the cursor one student down, stopping at the last student of the group.
    pub fn focus_down(&mut self) {
        let len = self
            .board
            .groups()
            .get(self.selection.group)
            .map_or(0, |g| g.students.len());
        self.selection.student = match self.selection.student {
            None if len > 0 => Some(0),
            Some(i) if i + 1 < len => Some(i + 1),
            other => other,
        };
    }

    /// Move the cursor to the previous group, keeping the student row where possible.
    pub fn focus_left(&mut self) {
        self.selection.group = self.selection.group.saturating_sub(1);
        self.clamp_selection();
    }

    /// Move the cursor to the next group, keeping the student row where possible.
    pub fn focus_right(&mut self) {
        if self.selection.group + 1 < self.board.groups().len() {
            self.selection.group += 1;
        }
        self.clamp_selection();
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
