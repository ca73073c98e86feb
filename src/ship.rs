//! Ship classes, placed ships, and the cell-by-cell placement session.

use crate::common::RuleError;
use crate::config::{LARGE_COUNT, MEDIUM_COUNT, SMALL_COUNT};

/// The three ship classes of the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipClass {
    Small,
    Medium,
    Large,
}

impl ShipClass {
    /// Number of cells a ship of this class occupies.
    pub const fn size(self) -> u8 {
        match self {
            ShipClass::Small => 2,
            ShipClass::Medium => 3,
            ShipClass::Large => 4,
        }
    }

    /// How many ships of this class each player must place.
    pub const fn quota(self) -> u8 {
        match self {
            ShipClass::Small => SMALL_COUNT,
            ShipClass::Medium => MEDIUM_COUNT,
            ShipClass::Large => LARGE_COUNT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShipClass::Small => "Small",
            ShipClass::Medium => "Medium",
            ShipClass::Large => "Large",
        }
    }
}

/// Axis a ship lies along, fixed by its second cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A fully placed ship with its hit counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    class: ShipClass,
    cells: Vec<(u8, u8)>,
    hits: u8,
}

impl Ship {
    pub fn new(class: ShipClass, cells: Vec<(u8, u8)>) -> Self {
        Self {
            class,
            cells,
            hits: 0,
        }
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn cells(&self) -> &[(u8, u8)] {
        &self.cells
    }

    pub fn contains(&self, row: u8, col: u8) -> bool {
        self.cells.iter().any(|&(r, c)| r == row && c == col)
    }

    /// Record a hit if the coordinate belongs to this ship. Returns whether
    /// it did.
    pub fn register_hit(&mut self, row: u8, col: u8) -> bool {
        if self.contains(row, col) {
            self.hits += 1;
            true
        } else {
            false
        }
    }

    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn is_sunk(&self) -> bool {
        self.hits >= self.class.size()
    }
}

/// Transient state while one ship is being placed cell by cell. Created when
/// a class is selected, discarded on completion or clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementSession {
    class: ShipClass,
    cells: Vec<(u8, u8)>,
    axis: Option<Axis>,
}

impl PlacementSession {
    pub fn new(class: ShipClass) -> Self {
        Self {
            class,
            cells: Vec::with_capacity(class.size() as usize),
            axis: None,
        }
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn cells(&self) -> &[(u8, u8)] {
        &self.cells
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn placed(&self) -> u8 {
        self.cells.len() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.placed() >= self.class.size()
    }

    pub fn contains(&self, row: u8, col: u8) -> bool {
        self.cells.iter().any(|&(r, c)| r == row && c == col)
    }

    /// Try to extend the session with the next cell. The first cell is
    /// accepted unconditionally, the second must be orthogonally adjacent to
    /// the first and locks the axis, later cells must extend the locked axis
    /// from the most recently placed cell. Grid occupancy and duplicate
    /// checks are the caller's job.
    pub fn try_add(&mut self, row: u8, col: u8) -> Result<(), RuleError> {
        match self.cells.len() {
            0 => {
                self.cells.push((row, col));
                Ok(())
            }
            1 => {
                let (fr, fc) = self.cells[0];
                if fr == row && fc.abs_diff(col) == 1 {
                    self.axis = Some(Axis::Horizontal);
                } else if fc == col && fr.abs_diff(row) == 1 {
                    self.axis = Some(Axis::Vertical);
                } else {
                    return Err(RuleError::NotAdjacent);
                }
                self.cells.push((row, col));
                Ok(())
            }
            _ => {
                let (lr, lc) = *self.cells.last().expect("session has cells");
                let axis = self.axis.expect("axis locked after second cell");
                let extends = match axis {
                    Axis::Horizontal => row == lr && col.abs_diff(lc) == 1,
                    Axis::Vertical => col == lc && row.abs_diff(lr) == 1,
                };
                if !extends {
                    return Err(RuleError::AxisViolation(axis));
                }
                self.cells.push((row, col));
                Ok(())
            }
        }
    }

    /// Consume the session into a placed ship once complete.
    pub fn into_ship(self) -> Ship {
        debug_assert!(self.is_complete());
        Ship::new(self.class, self.cells)
    }
}

/// Placed-ship counts per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipTally {
    small: u8,
    medium: u8,
    large: u8,
}

impl ShipTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placed(&self, class: ShipClass) -> u8 {
        match class {
            ShipClass::Small => self.small,
            ShipClass::Medium => self.medium,
            ShipClass::Large => self.large,
        }
    }

    pub fn remaining(&self, class: ShipClass) -> u8 {
        class.quota().saturating_sub(self.placed(class))
    }

    pub fn record(&mut self, class: ShipClass) {
        match class {
            ShipClass::Small => self.small += 1,
            ShipClass::Medium => self.medium += 1,
            ShipClass::Large => self.large += 1,
        }
    }

    /// Whether every class quota is met.
    pub fn complete(&self) -> bool {
        self.small >= ShipClass::Small.quota()
            && self.medium >= ShipClass::Medium.quota()
            && self.large >= ShipClass::Large.quota()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
