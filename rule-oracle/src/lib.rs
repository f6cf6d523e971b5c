//! The pure placement/attack/end-of-game rules for a 10x10 Battleship board.
//!
//! Every function here is referentially transparent: it only reads and
//! writes the [`Board`] and [`Registry`] values the caller hands it, never
//! touches a clock, and never talks to the network. The session coordinator
//! is the only caller, and it owns all I/O and all timing decisions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Board edge length. Battleship is always played on a 10x10 grid.
pub const BOARD_SIZE: usize = 10;

/// Orientation of a placed ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "H")]
    Horizontal,
    #[serde(rename = "V")]
    Vertical,
}

/// The fixed fleet every player places: one ship of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipKind {
    AircraftCarrier,
    Battleship,
    Cruiser,
    Submarine,
    PatrolBoat,
}

impl ShipKind {
    /// All five kinds, in a stable order. Useful for iterating a fresh fleet.
    pub const ALL: [ShipKind; 5] = [
        ShipKind::AircraftCarrier,
        ShipKind::Battleship,
        ShipKind::Cruiser,
        ShipKind::Submarine,
        ShipKind::PatrolBoat,
    ];

    /// Number of cells this ship occupies.
    pub fn length(self) -> usize {
        match self {
            ShipKind::AircraftCarrier => 5,
            ShipKind::Battleship => 4,
            ShipKind::Cruiser => 3,
            ShipKind::Submarine => 3,
            ShipKind::PatrolBoat => 2,
        }
    }

    /// The single character used to mark this ship's cells on an owner's
    /// own board. Markers need not be unique across ships; they only need
    /// to be non-empty.
    pub fn marker(self) -> char {
        match self {
            ShipKind::AircraftCarrier => 'A',
            ShipKind::Battleship => 'B',
            ShipKind::Cruiser => 'C',
            ShipKind::Submarine => 'S',
            ShipKind::PatrolBoat => 'P',
        }
    }
}

/// The content of a single board cell, as seen by the owning slot.
///
/// `Ship` is never sent to the opposing slot; the coordinator's opponent-view
/// projection collapses it down to [`Cell::Empty`] before it leaves the
/// process for anyone but the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Ship(ShipKind),
    Miss,
    Hit,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// A 10x10 grid of cells, owned by one player slot.
#[derive(Debug, Clone)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Board {
            cells: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// Projects the board to what an opponent is allowed to see: only
    /// empty, miss and hit cells ever leave the board; un-hit ship cells
    /// are always masked as empty.
    pub fn opponent_view(&self) -> Board {
        let mut view = Board::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let masked = match self.cells[row][col] {
                    Cell::Miss => Cell::Miss,
                    Cell::Hit => Cell::Hit,
                    Cell::Empty | Cell::Ship(_) => Cell::Empty,
                };
                view.set(row, col, masked);
            }
        }
        view
    }
}

/// Where a single ship lives on the board and which of its cells have been
/// hit so far.
#[derive(Debug, Clone, Default)]
pub struct ShipRecord {
    pub cells: Vec<(usize, usize)>,
    pub hits: Vec<(usize, usize)>,
}

impl ShipRecord {
    fn is_sunk(&self) -> bool {
        self.hits.len() == self.cells.len()
    }
}

/// A player's fleet: which ships they've placed and which cells of each
/// have been hit. Keyed by [`ShipKind`] so there is at most one of each.
pub type Registry = HashMap<ShipKind, ShipRecord>;

/// Outcome of resolving an attack against a board/registry pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Coordinates outside the 10x10 grid.
    Invalid,
    /// That cell was already attacked (hit or miss).
    Already,
    /// The cell was empty; now marked as a miss.
    Miss,
    /// The cell held a ship that is not yet fully hit.
    Hit,
    /// The cell held the last unhit cell of the named ship.
    Sunk(ShipKind),
}

/// Places one ship on `board`, recording it in `registry`.
///
/// Fails (returning `false`, leaving both arguments untouched) if any target
/// cell is out of bounds or already occupied. On success every target cell
/// is marked with the ship's marker and a fresh [`ShipRecord`] is inserted.
pub fn place(
    board: &mut Board,
    registry: &mut Registry,
    kind: ShipKind,
    row: usize,
    col: usize,
    orientation: Orientation,
) -> bool {
    let length = kind.length();
    let cells: Vec<(usize, usize)> = match orientation {
        Orientation::Horizontal => {
            if col + length > BOARD_SIZE {
                return false;
            }
            (col..col + length).map(|c| (row, c)).collect()
        }
        Orientation::Vertical => {
            if row + length > BOARD_SIZE {
                return false;
            }
            (row..row + length).map(|r| (r, col)).collect()
        }
    };

    if cells
        .iter()
        .any(|&(r, c)| !matches!(board.get(r, c), Cell::Empty))
    {
        return false;
    }

    for &(r, c) in &cells {
        board.set(r, c, Cell::Ship(kind));
    }
    registry.insert(
        kind,
        ShipRecord {
            cells,
            hits: Vec::new(),
        },
    );
    true
}

/// Resolves an attack at `(row, col)` against an opponent's `board` and
/// `registry`. See [`AttackOutcome`] for the possible results, evaluated in
/// the order: out of bounds, already attacked, miss, hit, sunk.
pub fn attack(board: &mut Board, registry: &mut Registry, row: usize, col: usize) -> AttackOutcome {
    if row >= BOARD_SIZE || col >= BOARD_SIZE {
        return AttackOutcome::Invalid;
    }

    match board.get(row, col) {
        Cell::Hit | Cell::Miss => AttackOutcome::Already,
        Cell::Empty => {
            board.set(row, col, Cell::Miss);
            AttackOutcome::Miss
        }
        Cell::Ship(kind) => {
            board.set(row, col, Cell::Hit);
            let record = registry
                .get_mut(&kind)
                .expect("a board cell marked with a ship kind always has a matching registry entry");
            record.hits.push((row, col));
            if record.is_sunk() {
                AttackOutcome::Sunk(kind)
            } else {
                AttackOutcome::Hit
            }
        }
    }
}

/// True iff every ship in `registry` has been fully hit. A registry with no
/// ships in it (a player who never placed) is never over.
pub fn is_over(registry: &Registry) -> bool {
    !registry.is_empty() && registry.values().all(|record| record.is_sunk())
}
