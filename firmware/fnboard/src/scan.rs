//! Edge detection against the recorded cell state.
//!
//! A cell only produces an event when its sampled level differs from what
//! was recorded last cycle. The keycode chosen at the press edge is kept in
//! the cell until the release edge, so the release always matches what was
//! sent even if FN changed in between.

use heapless::Vec;
use keyberon::key_code::KeyCode;

use crate::flush::PendingEvents;
use crate::keymap::{binding, Cell, Keymap, CELLS, COLS, ROWS};
use crate::matrix::Snapshot;

/// Recorded state of one switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellState {
    pub pressed: bool,
    /// Keycode currently asserted on behalf of this cell.
    pub asserted: Option<KeyCode>,
}

pub type CellGrid = [[CellState; COLS]; ROWS];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Press { cell: Cell, key: Option<KeyCode> },
    Release { cell: Cell, key: Option<KeyCode> },
}

pub type Edges = Vec<Edge, CELLS>;

/// Iterate cells in scan order: columns ascending, rows from the bottom up.
pub fn scan_order() -> impl Iterator<Item = Cell> {
    (0..COLS).flat_map(|col| (0..ROWS).rev().map(move |row| Cell::new(row, col)))
}

/// Compare `snapshot` with `cells`, record the new levels and return the
/// edges. Keycodes are resolved with `fn_held`, the FN state latched at the
/// start of the cycle. Release edges queue their keycode in
/// `pending.to_release`.
pub fn apply(
    snapshot: &Snapshot,
    cells: &mut CellGrid,
    keymap: &Keymap,
    fn_held: bool,
    pending: &mut PendingEvents,
) -> Edges {
    let mut edges = Edges::new();
    for cell in scan_order() {
        let state = &mut cells[cell.row][cell.col];
        let now = snapshot[cell.row][cell.col];
        let edge = match (state.pressed, now) {
            (false, true) => {
                let key = binding(keymap, cell).resolve(fn_held);
                state.pressed = true;
                state.asserted = key;
                Edge::Press { cell, key }
            }
            (true, false) => {
                let key = state.asserted.take();
                state.pressed = false;
                if let Some(key) = key {
                    pending.queue_release(key);
                }
                Edge::Release { cell, key }
            }
            _ => continue,
        };
        // at most one edge per cell
        let _ = edges.push(edge);
    }
    edges
}

/// Every keycode that should be held right now, in scan order.
pub fn held_keys(cells: &CellGrid) -> impl Iterator<Item = KeyCode> + '_ {
    scan_order().filter_map(move |cell| cells[cell.row][cell.col].asserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{FN_CELL, KEYMAP};
    use keyberon::key_code::KeyCode::*;

    struct Scanner {
        snapshot: Snapshot,
        cells: CellGrid,
        pending: PendingEvents,
    }

    impl Scanner {
        fn new() -> Self {
            Self {
                snapshot: [[false; COLS]; ROWS],
                cells: [[CellState::default(); COLS]; ROWS],
                pending: PendingEvents::new(),
            }
        }

        fn set(&mut self, row: usize, col: usize, pressed: bool) {
            self.snapshot[row][col] = pressed;
        }

        fn run(&mut self, fn_held: bool) -> Edges {
            apply(&self.snapshot, &mut self.cells, &KEYMAP, fn_held, &mut self.pending)
        }

        fn held(&self) -> std::vec::Vec<KeyCode> {
            held_keys(&self.cells).collect()
        }
    }

    #[test]
    fn untouched_cells_never_emit() {
        let mut s = Scanner::new();
        for _ in 0..5 {
            assert!(s.run(false).is_empty());
            assert!(s.run(true).is_empty());
        }
        assert!(s.pending.to_release.is_empty());
        assert!(s.held().is_empty());
    }

    #[test]
    fn press_hold_release_emits_two_edges() {
        let mut s = Scanner::new();
        s.set(1, 0, true);
        let edges = s.run(false);
        assert_eq!(&edges[..], &[Edge::Press { cell: Cell::new(1, 0), key: Some(A) }]);
        assert_eq!(s.held(), [A]);

        for _ in 0..4 {
            assert!(s.run(false).is_empty());
            assert_eq!(s.held(), [A]);
        }

        s.set(1, 0, false);
        let edges = s.run(false);
        assert_eq!(&edges[..], &[Edge::Release { cell: Cell::new(1, 0), key: Some(A) }]);
        assert_eq!(&s.pending.to_release[..], &[A]);
        assert!(s.held().is_empty());
    }

    #[test]
    fn fn_selects_the_alternate_at_press_time() {
        let mut s = Scanner::new();
        s.set(3, 9, true);
        s.run(true);
        assert_eq!(s.held(), [PScreen]);

        // releasing FN mid-hold keeps the alternate asserted
        s.run(false);
        assert_eq!(s.held(), [PScreen]);

        s.set(3, 9, false);
        s.run(false);
        assert_eq!(&s.pending.to_release[..], &[PScreen]);

        s.set(3, 9, true);
        s.run(false);
        assert_eq!(s.held(), [BSpace]);
    }

    #[test]
    fn fn_cell_tracks_state_without_a_keycode() {
        let mut s = Scanner::new();
        s.set(FN_CELL.row, FN_CELL.col, true);
        let edges = s.run(false);
        assert_eq!(&edges[..], &[Edge::Press { cell: FN_CELL, key: None }]);
        assert!(s.cells[FN_CELL.row][FN_CELL.col].pressed);
        assert!(s.held().is_empty());

        s.set(FN_CELL.row, FN_CELL.col, false);
        let edges = s.run(true);
        assert_eq!(&edges[..], &[Edge::Release { cell: FN_CELL, key: None }]);
        assert!(s.pending.to_release.is_empty());
    }

    #[test]
    fn edges_follow_scan_order() {
        let mut s = Scanner::new();
        s.set(0, 1, true);
        s.set(5, 1, true);
        s.set(2, 0, true);
        let cells: std::vec::Vec<Cell> = s
            .run(false)
            .iter()
            .map(|e| match e {
                Edge::Press { cell, .. } | Edge::Release { cell, .. } => *cell,
            })
            .collect();
        assert_eq!(cells, [Cell::new(2, 0), Cell::new(5, 1), Cell::new(0, 1)]);
        assert_eq!(s.held(), [Z, Tab, W]);
    }
}
