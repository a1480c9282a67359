use keyberon::key_code::KeyCode::{self, *};

/// Number of row lines (read, pulled up).
pub const ROWS: usize = 6;
/// Number of column lines (driven low one at a time).
pub const COLS: usize = 10;
/// Number of switches in the matrix.
pub const CELLS: usize = ROWS * COLS;

/// One switch of the matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The modifier cell: last row, first column.
pub const FN_CELL: Cell = Cell::new(ROWS - 1, 0);

/// What a cell sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Same keycode on both layers.
    Single(KeyCode),
    /// `(primary, alternate)`; the alternate is used while FN is held.
    Layered(KeyCode, KeyCode),
    /// The FN key itself. Never produces a keycode.
    Fn,
}

impl Binding {
    /// Keycode this binding produces for the given FN state.
    pub fn resolve(self, fn_held: bool) -> Option<KeyCode> {
        match self {
            Binding::Single(key) => Some(key),
            Binding::Layered(primary, alternate) => Some(if fn_held { alternate } else { primary }),
            Binding::Fn => None,
        }
    }
}

pub type Keymap = [[Binding; COLS]; ROWS];

const fn k(key: KeyCode) -> Binding {
    Binding::Single(key)
}

const fn f(primary: KeyCode, alternate: KeyCode) -> Binding {
    Binding::Layered(primary, alternate)
}

const FN: Binding = Binding::Fn;

#[rustfmt::skip]
pub static KEYMAP: Keymap = [
    [k(Q),      k(W),        k(E),         k(R),          k(T),          k(Y),          k(U),          k(I),          k(O),            k(P)],
    [k(A),      k(S),        k(D),         k(F),          k(G),          k(H),          k(J),          k(K),          k(L),            k(SColon)],
    [k(Z),      k(X),        k(C),         k(V),          k(B),          k(N),          k(M),          k(Comma),      k(Dot),          k(Slash)],
    [k(Escape), k(Quote),    k(Minus),     k(Equal),      k(Space),      k(Enter),      k(LBracket),   k(RBracket),   k(Bslash),       f(BSpace, PScreen)],
    [f(Kb1, F1), f(Kb2, F2), f(Kb3, F3),   f(Kb4, F4),    f(Kb5, F5),    f(Kb6, F6),    f(Kb7, Delete), f(Kb8, CapsLock), f(Kb9, Home), f(Kb0, End)],
    [FN,        k(Tab),      k(LCtrl),     k(LAlt),       k(RShift),     k(Grave),      k(Up),         k(Down),       f(Left, PgUp),   f(Right, PgDown)],
];

/// Binding of `cell` in `keymap`.
pub fn binding(keymap: &Keymap, cell: Cell) -> Binding {
    keymap[cell.row][cell.col]
}
