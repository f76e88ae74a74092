//! The recursive-call size matrix.
//!
//! One row per occurrence of the analysed function: row 0 is the
//! function's own signature variables, and each recursive call site adds
//! the fresh variables its instantiation of the signature received.
//! Column `i` of every row names the same formal size slot, so a column
//! lists every incarnation of signature variable `i` across the run.
//!
//! Nothing in the row data enforces that shape, so [`RecursionMatrix`]
//! checks it on every push.

use ori_sized::SizeVar;
use smallvec::SmallVec;

/// One row of the matrix.
pub type MatrixRow = SmallVec<[SizeVar; 4]>;

/// Rectangular matrix of size variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecursionMatrix {
    width: usize,
    rows: Vec<MatrixRow>,
}

impl RecursionMatrix {
    /// Start a matrix whose first row is `identity`.
    pub fn new(identity: impl IntoIterator<Item = SizeVar>) -> Self {
        let row: MatrixRow = identity.into_iter().collect();
        RecursionMatrix {
            width: row.len(),
            rows: vec![row],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Append one call occurrence.
    ///
    /// # Panics
    ///
    /// A row of the wrong width means the call sites and the signature have
    /// desynchronized, which is an internal error.
    pub fn push_row(&mut self, row: impl IntoIterator<Item = SizeVar>) {
        let row: MatrixRow = row.into_iter().collect();
        assert!(
            row.len() == self.width,
            "internal error: recursion matrix row has {} columns, expected {}",
            row.len(),
            self.width
        );
        self.rows.push(row);
    }

    /// Every occurrence of formal slot `slot`, row by row.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the matrix (internal error).
    pub fn column(&self, slot: usize) -> MatrixRow {
        assert!(
            slot < self.width,
            "internal error: size slot {slot} outside recursion matrix of width {}",
            self.width
        );
        self.rows.iter().map(|row| row[slot]).collect()
    }
}
