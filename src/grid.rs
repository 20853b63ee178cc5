// src/grid.rs - Fixed 15x5 capture grid, cell coordinates and visit colours
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const MIN_X: i64 = 0;
pub const MAX_X: i64 = 14;
pub const MIN_Y: i64 = 0;
pub const MAX_Y: i64 = 4;

/// One grid cell. Row 0 is the top row of the operator view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(&self) -> bool {
        (MIN_X..=MAX_X).contains(&self.x) && (MIN_Y..=MAX_Y).contains(&self.y)
    }

    pub fn offset(&self, dx: i64, dy: i64) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Net displacement still needed to get from `self` to `other`.
    pub fn delta_to(&self, other: Position) -> Offset {
        Offset {
            x: other.x - self.x,
            y: other.y - self.y,
        }
    }

    /// Key used for the visited map on the wire, e.g. `"3,1"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

impl Offset {
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    /// Passed through, or settled on but not captured yet.
    Green,
    /// Capture completed.
    Red,
}

/// Cells the camera has touched. A red cell stays red.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedMap {
    cells: BTreeMap<Position, CellColor>,
}

impl VisitedMap {
    /// Fresh map with the start cell already marked.
    pub fn new() -> Self {
        let mut cells = BTreeMap::new();
        cells.insert(Position::ORIGIN, CellColor::Green);
        Self { cells }
    }

    pub fn get(&self, cell: Position) -> Option<CellColor> {
        self.cells.get(&cell).copied()
    }

    pub fn mark_passed(&mut self, cell: Position) {
        if self.get(cell) != Some(CellColor::Red) {
            self.cells.insert(cell, CellColor::Green);
        }
    }

    pub fn mark_captured(&mut self, cell: Position) {
        self.cells.insert(cell, CellColor::Red);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

impl Default for VisitedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for VisitedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.cells.iter().map(|(pos, color)| (pos.key(), color)))
    }
}
