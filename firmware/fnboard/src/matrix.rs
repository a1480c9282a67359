//! Key matrix sampling.
//!
//! Columns are push-pull outputs, idle high. Rows are inputs with pull-ups.
//! keyberon drives one column low at a time and reads every row on it, so a
//! low row reads as pressed. Its result is indexed `[col][row]`; the core
//! works on `[row][col]`.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::keymap::{COLS, ROWS};

/// One raw sample of the whole matrix, `[row][col]`, `true` = pressed.
pub type Snapshot = [[bool; COLS]; ROWS];

pub struct Matrix<I, O>
where
    I: InputPin,
    O: OutputPin,
{
    inner: keyberon::matrix::Matrix<I, O, ROWS, COLS>,
}

impl<I, O, E> Matrix<I, O>
where
    I: InputPin<Error = E>,
    O: OutputPin<Error = E>,
{
    /// Takes the row inputs and the column outputs; every column idles high.
    pub fn new(rows: [I; ROWS], cols: [O; COLS]) -> Result<Self, E> {
        Ok(Self {
            inner: keyberon::matrix::Matrix::new(rows, cols)?,
        })
    }

    pub fn scan(&mut self) -> Result<Snapshot, E> {
        let by_col = match self.inner.get() {
            Ok(keys) => keys,
            Err(e) => {
                // a failed read can leave its column selected
                let _ = self.inner.clear();
                return Err(e);
            }
        };
        let mut snapshot = [[false; COLS]; ROWS];
        for (col, line) in by_col.iter().enumerate() {
            for (row, pressed) in line.iter().enumerate() {
                snapshot[row][col] = *pressed;
            }
        }
        Ok(snapshot)
    }
}
