//! Startup configuration: command line / environment and config file locations.
//!
//! Everything here is read once before the terminal is taken over. The theme
//! and keymap files live in the config directory and are created with
//! defaults on first run.

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use std::path::{Path, PathBuf};

use crate::roster::{DEFAULT_GROUP_SIZE, DEFAULT_ROSTER_SIZE};

const APP_DIR: &str = "student-groups";

#[derive(Parser, Debug, Clone)]
#[command(name = "student-groups", version, about)]
pub struct Cli {
    /// Number of generated students (ignored with --roster)
    #[arg(
        long,
        env = "STUDENT_GROUPS_STUDENTS",
        default_value_t = DEFAULT_ROSTER_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub students: usize,

    /// Students per group; the last group may be smaller
    #[arg(
        long,
        env = "STUDENT_GROUPS_GROUP_SIZE",
        default_value_t = DEFAULT_GROUP_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub group_size: usize,

    /// File with one student name per line
    #[arg(long, env = "STUDENT_GROUPS_ROSTER")]
    pub roster: Option<PathBuf>,

    /// Seed for reproducible shuffles
    #[arg(long, env = "STUDENT_GROUPS_SEED")]
    pub seed: Option<u64>,

    /// Generate groups immediately instead of starting empty
    #[arg(long)]
    pub generate: bool,

    /// Cells the pointer must travel before a press becomes a drag
    #[arg(long, env = "STUDENT_GROUPS_DRAG_THRESHOLD", default_value_t = 1)]
    pub drag_threshold: u16,

    /// Write logs here (filter with RUST_LOG)
    #[arg(long, env = "STUDENT_GROUPS_LOG")]
    pub log_file: Option<PathBuf>,

    /// Directory holding theme.conf and keybinds.conf
    #[arg(long, env = "STUDENT_GROUPS_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            students: DEFAULT_ROSTER_SIZE,
            group_size: DEFAULT_GROUP_SIZE,
            roster: None,
            seed: None,
            generate: false,
            drag_threshold: 1,
            log_file: None,
            config_dir: None,
        }
    }
}

impl Cli {
    /// Resolved config directory: explicit flag, then XDG, then `~/.config`.
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(default_config_dir)
    }

    pub fn theme_path(&self) -> PathBuf {
        self.config_dir().join("theme.conf")
    }

    pub fn keybinds_path(&self) -> PathBuf {
        self.config_dir().join("keybinds.conf")
    }
}

fn default_config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join(APP_DIR);
    }
    PathBuf::from(".")
}

/// Make sure the parent directory of `path` exists.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
