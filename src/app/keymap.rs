//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Several key combinations may resolve to the same action, so arrow keys and
//! vim-style letters both work out of the box. User files only override the
//! keys they name; everything else keeps its default.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::path::Path;

use crate::app::config;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Display the help modal.
    OpenHelp,
    /// Show or hide the keybindings panel.
    ToggleKeybindsPane,
    /// Shuffle the roster into fresh groups.
    Regenerate,
    /// Pick up the focused item, or drop the one being carried.
    PickUpDrop,
    /// Abort a keyboard drag or close a modal.
    Cancel,
    /// Cursor movement.
    FocusUp,
    FocusDown,
    FocusLeft,
    FocusRight,
    /// Move the focused student or group one step.
    MoveItemUp,
    MoveItemDown,
    MoveItemLeft,
    MoveItemRight,
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 15] = [
    KeyAction::Quit,
    KeyAction::OpenHelp,
    KeyAction::ToggleKeybindsPane,
    KeyAction::Regenerate,
    KeyAction::PickUpDrop,
    KeyAction::Cancel,
    KeyAction::FocusUp,
    KeyAction::FocusDown,
    KeyAction::FocusLeft,
    KeyAction::FocusRight,
    KeyAction::MoveItemUp,
    KeyAction::MoveItemDown,
    KeyAction::MoveItemLeft,
    KeyAction::MoveItemRight,
    KeyAction::Ignore,
];

#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        // Some terminals report '?' with SHIFT
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Tab), KeyAction::ToggleKeybindsPane);
        bindings.insert((M::NONE, Char('g')), KeyAction::Regenerate);
        bindings.insert((M::NONE, Char(' ')), KeyAction::PickUpDrop);
        bindings.insert((M::NONE, Enter), KeyAction::PickUpDrop);
        bindings.insert((M::NONE, Esc), KeyAction::Cancel);

        bindings.insert((M::NONE, Up), KeyAction::FocusUp);
        bindings.insert((M::NONE, Down), KeyAction::FocusDown);
        bindings.insert((M::NONE, Left), KeyAction::FocusLeft);
        bindings.insert((M::NONE, Right), KeyAction::FocusRight);
        bindings.insert((M::NONE, Char('k')), KeyAction::FocusUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::FocusDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::FocusLeft);
        bindings.insert((M::NONE, Char('l')), KeyAction::FocusRight);

        bindings.insert((M::SHIFT, Up), KeyAction::MoveItemUp);
        bindings.insert((M::SHIFT, Down), KeyAction::MoveItemDown);
        bindings.insert((M::SHIFT, Left), KeyAction::MoveItemLeft);
        bindings.insert((M::SHIFT, Right), KeyAction::MoveItemRight);
        // Uppercase letters arrive with or without SHIFT depending on the terminal
        for (c, action) in [
            ('K', KeyAction::MoveItemUp),
            ('J', KeyAction::MoveItemDown),
            ('H', KeyAction::MoveItemLeft),
            ('L', KeyAction::MoveItemRight),
        ] {
            bindings.insert((M::SHIFT, Char(c)), action);
            bindings.insert((M::NONE, Char(c)), action);
        }

        Self { bindings }
    }

    /// Read `path` if present, otherwise write the default keymap there and use it.
    ///
    /// # Arguments
    ///
    /// * `path` - `keybinds.conf` inside the resolved config directory.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default keybinds");
        }
        km
    }

    /// Parse `Action = KeySpec` lines on top of the defaults.
    ///
    /// Returns `None` if the file cannot be read. Unknown actions or keys are skipped.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            match (parse_action(lhs), parse_key(rhs)) {
                (Some(action), Some(key)) => {
                    map.bindings.insert(key, action);
                }
                _ => tracing::debug!(line, "ignoring keybind line"),
            }
        }
        Some(map)
    }

    /// Write every binding as an `Action = KeySpec` line, sorted by action.
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file; overwritten if it exists.
    ///
    /// # Returns
    ///
    /// `std::io::Result<()>` indicating success or failure.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# student-groups keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Shift+Up, Space, Enter, Esc, Tab, Up, Down, Left, Right, h, j, k, l\n");
        let names: Vec<_> = ALL_ACTIONS.iter().map(|a| format_action(*a)).collect();
        let _ = writeln!(&mut buf, "# Actions: {}\n", names.join(", "));

        let mut rows: Vec<_> = self
            .bindings
            .iter()
            .map(|((mods, code), action)| (format_action(*action), Self::format_key(*mods, *code)))
            .collect();
        rows.sort();
        rows.dedup();
        for (action, key) in rows {
            let _ = writeln!(&mut buf, "{} = {}", action, key);
        }

        config::ensure_parent(path)?;
        std::fs::write(path, buf)
    }

    /// Resolve a key event to its bound action.
    ///
    /// # Arguments
    ///
    /// * `key` - The key event; modifiers must match exactly.
    ///
    /// # Returns
    ///
    /// The bound action, or `None` when the key is unbound.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as `((modifiers, code), action)` pairs, in no particular order.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Human-readable key spec such as "Ctrl+q" or "Shift+Up"; inverse of the parser.
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            Delete => "Delete".to_string(),
            Char(' ') => "Space".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else if mods.contains(KeyModifiers::SHIFT) && !matches!(code, Char(_)) {
            format!("Shift+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let mut rest = spec.trim();
    let mut mods = KeyModifiers::NONE;
    loop {
        if let Some(after) = rest.strip_prefix("Ctrl+") {
            mods |= KeyModifiers::CONTROL;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("Shift+") {
            mods |= KeyModifiers::SHIFT;
            rest = after;
        } else {
            break;
        }
    }
    let code = match rest {
        "Enter" => Enter,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "Delete" => Delete,
        "Space" => Char(' '),
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let s = s.trim();
    ALL_ACTIONS.into_iter().find(|a| format_action(*a) == s)
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::ToggleKeybindsPane => "ToggleKeybindsPane",
        KeyAction::Regenerate => "Regenerate",
        KeyAction::PickUpDrop => "PickUpDrop",
        KeyAction::Cancel => "Cancel",
        KeyAction::FocusUp => "FocusUp",
        KeyAction::FocusDown => "FocusDown",
        KeyAction::FocusLeft => "FocusLeft",
        KeyAction::FocusRight => "FocusRight",
        KeyAction::MoveItemUp => "MoveItemUp",
        KeyAction::MoveItemDown => "MoveItemDown",
        KeyAction::MoveItemLeft => "MoveItemLeft",
        KeyAction::MoveItemRight => "MoveItemRight",
        KeyAction::Ignore => "Ignore",
    }
}
