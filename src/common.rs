//! User-facing rule errors shared across the placement and attack paths.

use crate::ship::{Axis, ShipClass};

/// Reasons a local action is rejected. Every variant renders as the status
/// line shown to the player; remote messages never produce these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    /// Coordinate outside the 8x8 grid.
    OutOfBounds,
    /// All ships of this class are already placed.
    QuotaExhausted(ShipClass),
    /// A different ship has cells down but is not finished.
    PlacementInProgress,
    /// No ship class selected before clicking the grid.
    NoShipSelected,
    /// Target cell already holds a ship segment.
    CellOccupied,
    /// Second cell of a ship must touch the first orthogonally.
    NotAdjacent,
    /// Later cells must extend the locked axis from the last cell.
    AxisViolation(Axis),
    /// Ready toggled before the fleet is complete.
    ShipsIncomplete,
    /// Attack attempted before declaring ready.
    NotReady,
    /// Placement attempted after declaring ready.
    AlreadyReady,
    /// Attack attempted while the opponent holds the turn.
    NotYourTurn,
    /// Attack attempted on a mirror cell that already has a result.
    CellAlreadyAttacked,
}

impl core::fmt::Display for RuleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RuleError::OutOfBounds => write!(f, "Coordinate is off the board!"),
            RuleError::QuotaExhausted(class) => {
                write!(f, "All {} ships already placed!", class.name().to_lowercase())
            }
            RuleError::PlacementInProgress => write!(f, "Finish placing current ship first!"),
            RuleError::NoShipSelected => write!(f, "Select a ship type first!"),
            RuleError::CellOccupied => write!(f, "Cell already occupied!"),
            RuleError::NotAdjacent => {
                write!(f, "Ship must be horizontal or vertical (adjacent cells only)")
            }
            RuleError::AxisViolation(Axis::Horizontal) => {
                write!(f, "Continue placing horizontally!")
            }
            RuleError::AxisViolation(Axis::Vertical) => write!(f, "Continue placing vertically!"),
            RuleError::ShipsIncomplete => write!(f, "Place all ships before clicking Ready!"),
            RuleError::NotReady => write!(f, "You must be ready first!"),
            RuleError::AlreadyReady => write!(f, "You're already ready! Clear ships to edit"),
            RuleError::NotYourTurn => write!(f, "Wait for your turn!"),
            RuleError::CellAlreadyAttacked => write!(f, "Already attacked this cell!"),
        }
    }
}
