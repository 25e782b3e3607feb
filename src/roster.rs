//! Class roster: the fixed set of students that gets split into groups.
//!
//! A roster is built once at startup, either generated (`Student 1` ..
//! `Student N`) or read from a plain names file, and never changes afterwards.
//! Student ids are always `student-{n}` in roster order, so they stay stable
//! no matter how often the roster is shuffled.
//!
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::Path;

use crate::error::{Context, Result, simple_error};

/// Number of students in the generated roster.
pub const DEFAULT_ROSTER_SIZE: usize = 30;

/// Number of students per generated group.
pub const DEFAULT_GROUP_SIZE: usize = 5;

/// A single student. Immutable once created; `id` is the only lookup key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Student {
    pub id: String,
    pub name: String,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    /// Generate `count` students with deterministic ids and names.
    pub fn generate(count: usize) -> Self {
        let students = (1..=count)
            .map(|n| Student::new(format!("student-{n}"), format!("Student {n}")))
            .collect();
        Self { students }
    }

    /// Build a roster from display names, assigning ids in order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let students = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Student::new(format!("student-{}", i + 1), name))
            .collect();
        Self { students }
    }

    pub fn from_students(students: Vec<Student>) -> Self {
        Self { students }
    }

    /// Read a names file: one student per line, blank lines and `#` comments skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_ctx(|| format!("read roster {}", path.display()))?;
        let roster = Self::from_names(
            contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        );
        if roster.is_empty() {
            return Err(simple_error(format!(
                "roster {} contains no names",
                path.display()
            )));
        }
        Ok(roster)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Return a uniformly shuffled copy of the roster.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Student> {
        let mut out = self.students.clone();
        out.shuffle(rng);
        out
    }
}
