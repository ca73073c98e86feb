use crate::ship::ShipClass;

/// Side length of each player's grid.
pub const GRID_SIZE: u8 = 8;

/// Seconds a player has to fire before the turn is forfeited.
pub const TURN_SECONDS: u32 = 30;

/// Default TCP port for hosting a game.
pub const DEFAULT_PORT: u16 = 12345;

/// Fleet composition: how many ships of each class a player must place.
pub const SMALL_COUNT: u8 = 1;
pub const MEDIUM_COUNT: u8 = 2;
pub const LARGE_COUNT: u8 = 1;

/// Total hits needed to sink the whole fleet. Derived from the fleet table
/// above so the win threshold can never drift from the placement quotas.
pub const REQUIRED_HITS: u32 = ShipClass::Small.size() as u32 * SMALL_COUNT as u32
    + ShipClass::Medium.size() as u32 * MEDIUM_COUNT as u32
    + ShipClass::Large.size() as u32 * LARGE_COUNT as u32;
