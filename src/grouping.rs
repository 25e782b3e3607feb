//! Grouping engine: pure transforms over an ordered list of groups.
//!
//! Every transform borrows the current grouping and returns a fresh one;
//! the input is never modified. Requests that reference a missing group or
//! student, or an index outside the current bounds, return an unchanged copy.
//! Callers cannot tell "nothing to do" apart from "invalid request"; the
//! reason is only visible in the debug log.
//!
//! All transforms keep the roster invariant: each student appears in exactly
//! one group, exactly once.
//!
use std::collections::HashMap;

use crate::roster::Student;

/// Creation-time position of each group, keyed by group id.
pub type OriginalIndices = HashMap<String, usize>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub students: Vec<Student>,
}

impl Group {
    pub fn new(id: impl Into<String>, students: Vec<Student>) -> Self {
        Self {
            id: id.into(),
            students,
        }
    }

    pub fn position_of(&self, student_id: &str) -> Option<usize> {
        self.students.iter().position(|s| s.id == student_id)
    }
}

/// Split students into consecutive chunks of `group_size`, in order.
///
/// Groups are named `group-1`, `group-2`, ... and the returned index maps each
/// id to its creation position. The last group is shorter when the roster
/// does not divide evenly.
pub fn partition(students: &[Student], group_size: usize) -> (Vec<Group>, OriginalIndices) {
    let size = group_size.max(1);
    let mut groups = Vec::with_capacity(students.len().div_ceil(size));
    let mut indices = OriginalIndices::new();
    for chunk in students.chunks(size) {
        let id = format!("group-{}", groups.len() + 1);
        indices.insert(id.clone(), groups.len());
        groups.push(Group::new(id, chunk.to_vec()));
    }
    (groups, indices)
}

/// Move the group at `from` so that it ends up at `to`.
pub fn reorder_groups(groups: &[Group], from: usize, to: usize) -> Vec<Group> {
    let mut out = groups.to_vec();
    if !move_within(&mut out, from, to) {
        tracing::debug!(from, to, len = groups.len(), "reorder_groups rejected");
    }
    out
}

/// Take a student out of one group and append it to the tail of another.
///
/// When source and destination are the same group the student ends up last.
pub fn move_student(
    groups: &[Group],
    source_group_id: &str,
    dest_group_id: &str,
    student_id: &str,
) -> Vec<Group> {
    let (Some(src), Some(dst)) = (
        group_position(groups, source_group_id),
        group_position(groups, dest_group_id),
    ) else {
        tracing::warn!(source_group_id, dest_group_id, "move_student: unknown group");
        return groups.to_vec();
    };
    let Some(idx) = groups[src].position_of(student_id) else {
        tracing::warn!(student_id, source_group_id, "move_student: student not in source group");
        return groups.to_vec();
    };

    let mut out = groups.to_vec();
    let student = out[src].students.remove(idx);
    out[dst].students.push(student);
    out
}

/// Move the student at `from` inside the named group so that it ends up at `to`.
pub fn reorder_students_in_group(
    groups: &[Group],
    group_id: &str,
    from: usize,
    to: usize,
) -> Vec<Group> {
    let mut out = groups.to_vec();
    let Some(g) = group_position(groups, group_id) else {
        tracing::warn!(group_id, "reorder_students_in_group: unknown group");
        return out;
    };
    if !move_within(&mut out[g].students, from, to) {
        tracing::debug!(group_id, from, to, "reorder_students_in_group rejected");
    }
    out
}

pub fn group_position(groups: &[Group], group_id: &str) -> Option<usize> {
    groups.iter().position(|g| g.id == group_id)
}

/// Find `(group position, position within group)` of a student.
pub fn locate_student(groups: &[Group], student_id: &str) -> Option<(usize, usize)> {
    groups
        .iter()
        .enumerate()
        .find_map(|(gi, g)| g.position_of(student_id).map(|si| (gi, si)))
}

/// All student ids in display order, group by group.
pub fn student_ids(groups: &[Group]) -> Vec<&str> {
    groups
        .iter()
        .flat_map(|g| g.students.iter().map(|s| s.id.as_str()))
        .collect()
}

// Returns false (and leaves `items` untouched) when an index is out of bounds.
fn move_within<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}
