//! Interaction controller: owns the grouping and turns gestures into mutations.
//!
//! A gesture runs through `Idle -> Dragging -> Idle`. `drag_start` records
//! what is being moved, `drag_over` is fed every hover and migrates a dragged
//! student into the hovered group right away, and `drag_end` applies the
//! final reorder (if any) and always returns to `Idle`. Cancelling is just
//! `drag_end(None)`; migrations already applied by `drag_over` stay.
//!
//! The discrete commands (`move_student`, `move_group`) mutate directly and
//! never touch the drag state.
//!
use rand::Rng;

use crate::grouping::{self, Group, OriginalIndices};
use crate::roster::{Roster, Student};

/// What the user picked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragItem {
    Group(String),
    Student(String),
}

impl DragItem {
    pub fn id(&self) -> &str {
        match self {
            DragItem::Group(id) | DragItem::Student(id) => id,
        }
    }
}

/// What is under the pointer (or keyboard cursor) while dragging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// A group frame or its header.
    Group(String),
    /// A student card inside a group.
    Student { group_id: String, student_id: String },
}

impl DropTarget {
    pub fn group_id(&self) -> &str {
        match self {
            DropTarget::Group(id) => id,
            DropTarget::Student { group_id, .. } => group_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveDrag {
    pub item: DragItem,
    /// Snapshot of the dragged student for the ghost overlay.
    pub overlay: Option<Student>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Result of finishing a gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released outside any target.
    Cancelled,
    /// Released on a target that did not require a reorder.
    Unchanged,
    GroupsReordered { from: usize, to: usize },
    StudentsReordered { group_id: String, from: usize, to: usize },
}

pub struct Controller {
    roster: Roster,
    group_size: usize,
    groups: Vec<Group>,
    original_indices: OriginalIndices,
    drag: DragState,
}

impl Controller {
    /// Start with the given roster and no groups.
    pub fn new(roster: Roster, group_size: usize) -> Self {
        Self {
            roster,
            group_size: group_size.max(1),
            groups: Vec::new(),
            original_indices: OriginalIndices::new(),
            drag: DragState::Idle,
        }
    }

    /// Adopt an existing grouping; the roster and original positions are taken from it.
    pub fn from_groups(groups: Vec<Group>, group_size: usize) -> Self {
        let roster = Roster::from_students(
            groups.iter().flat_map(|g| g.students.iter().cloned()).collect(),
        );
        let original_indices = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.clone(), i))
            .collect();
        Self {
            roster,
            group_size: group_size.max(1),
            groups,
            original_indices,
            drag: DragState::Idle,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Creation-time position of a group, independent of later reordering.
    pub fn original_index(&self, group_id: &str) -> Option<usize> {
        self.original_indices.get(group_id).copied()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging(_))
    }

    pub fn active_item(&self) -> Option<&DragItem> {
        match &self.drag {
            DragState::Dragging(d) => Some(&d.item),
            DragState::Idle => None,
        }
    }

    pub fn active_student(&self) -> Option<&Student> {
        match &self.drag {
            DragState::Dragging(d) => d.overlay.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Throw away the current groups, shuffle the roster and split it again.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let shuffled = self.roster.shuffled(rng);
        let (groups, indices) = grouping::partition(&shuffled, self.group_size);
        tracing::info!(
            students = shuffled.len(),
            groups = groups.len(),
            group_size = self.group_size,
            "regenerated groups"
        );
        self.groups = groups;
        self.original_indices = indices;
        self.drag = DragState::Idle;
    }

    pub fn drag_start(&mut self, item: DragItem) {
        if let DragState::Dragging(prev) = &self.drag {
            tracing::debug!(previous = prev.item.id(), "drag_start while dragging; restarting");
        }
        let overlay = match &item {
            DragItem::Student(id) => grouping::locate_student(&self.groups, id)
                .map(|(g, s)| self.groups[g].students[s].clone()),
            DragItem::Group(_) => None,
        };
        tracing::debug!(item = item.id(), "drag start");
        self.drag = DragState::Dragging(ActiveDrag { item, overlay });
    }

    /// Hover over a target. Returns true when a student migrated groups.
    pub fn drag_over(&mut self, target: &DropTarget) -> bool {
        let DragState::Dragging(ActiveDrag {
            item: DragItem::Student(student_id),
            ..
        }) = &self.drag
        else {
            return false;
        };
        let Some((gi, _)) = grouping::locate_student(&self.groups, student_id) else {
            return false;
        };
        let from = self.groups[gi].id.as_str();
        let to = target.group_id();
        if from == to || grouping::group_position(&self.groups, to).is_none() {
            return false;
        }
        tracing::debug!(student_id = student_id.as_str(), from, to, "drag over: migrating student");
        self.groups = grouping::move_student(&self.groups, from, to, student_id);
        true
    }

    /// Finish the gesture. Drag state is cleared whatever the outcome.
    pub fn drag_end(&mut self, target: Option<&DropTarget>) -> DropOutcome {
        let DragState::Dragging(active) = std::mem::take(&mut self.drag) else {
            return DropOutcome::Unchanged;
        };
        let Some(target) = target else {
            tracing::debug!(item = active.item.id(), "drag cancelled");
            return DropOutcome::Cancelled;
        };

        match active.item {
            DragItem::Group(group_id) => {
                let from = grouping::group_position(&self.groups, &group_id);
                let to = grouping::group_position(&self.groups, target.group_id());
                match (from, to) {
                    (Some(from), Some(to)) if from != to => {
                        self.groups = grouping::reorder_groups(&self.groups, from, to);
                        DropOutcome::GroupsReordered { from, to }
                    }
                    _ => DropOutcome::Unchanged,
                }
            }
            DragItem::Student(student_id) => {
                let DropTarget::Student {
                    student_id: over_id,
                    ..
                } = target
                else {
                    return DropOutcome::Unchanged;
                };
                // Positions come from the current state; drag_over may have moved it.
                let Some((gi, from)) = grouping::locate_student(&self.groups, &student_id) else {
                    return DropOutcome::Unchanged;
                };
                let group = &self.groups[gi];
                match group.position_of(over_id) {
                    Some(to) if to != from => {
                        let group_id = group.id.clone();
                        self.groups =
                            grouping::reorder_students_in_group(&self.groups, &group_id, from, to);
                        DropOutcome::StudentsReordered { group_id, from, to }
                    }
                    _ => DropOutcome::Unchanged,
                }
            }
        }
    }

    pub fn drag_cancel(&mut self) -> DropOutcome {
        self.drag_end(None)
    }

    /// Shift a student one slot up/down (clamped) or to the neighbouring group
    /// left/right (wrapping around the ends). Returns true if anything moved.
    pub fn move_student(&mut self, student_id: &str, direction: Direction) -> bool {
        let Some((gi, si)) = grouping::locate_student(&self.groups, student_id) else {
            tracing::warn!(student_id, "move_student: unknown student");
            return false;
        };
        let n = self.groups.len();
        match direction {
            Direction::Up | Direction::Down => {
                let len = self.groups[gi].students.len();
                let target = match direction {
                    Direction::Up => si.checked_sub(1),
                    _ => Some(si + 1).filter(|&t| t < len),
                };
                let Some(target) = target else {
                    return false;
                };
                let group_id = self.groups[gi].id.clone();
                self.groups =
                    grouping::reorder_students_in_group(&self.groups, &group_id, si, target);
                true
            }
            Direction::Left | Direction::Right => {
                let target = match direction {
                    Direction::Left => (gi + n - 1) % n,
                    _ => (gi + 1) % n,
                };
                if target == gi {
                    return false;
                }
                let from = self.groups[gi].id.clone();
                let to = self.groups[target].id.clone();
                tracing::debug!(student_id, %from, %to, "moving student between groups");
                self.groups = grouping::move_student(&self.groups, &from, &to, student_id);
                true
            }
        }
    }

    /// Shift a whole group one slot; left/up go towards the front. Clamped at
    /// both ends, no wraparound.
    pub fn move_group(&mut self, group_id: &str, direction: Direction) -> bool {
        let Some(idx) = grouping::group_position(&self.groups, group_id) else {
            tracing::warn!(group_id, "move_group: unknown group");
            return false;
        };
        let target = match direction {
            Direction::Left | Direction::Up => idx.checked_sub(1),
            Direction::Right | Direction::Down => Some(idx + 1).filter(|&t| t < self.groups.len()),
        };
        let Some(target) = target else {
            return false;
        };
        self.groups = grouping::reorder_groups(&self.groups, idx, target);
        true
    }
}
