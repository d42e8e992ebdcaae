//! Per-operation running aggregates.
//!
//! [`StatisticsState`] holds one buffer per requested operation, all of
//! the same length, plus the number of fields folded in. Buffers hold the
//! operation's neutral element exactly when the count is zero.

use indexmap::IndexMap;

use crate::error::StatisticsError;
use crate::operation::Operation;

#[derive(Clone, Debug, PartialEq)]
struct Buffer {
    values: Vec<f64>,
    /// Running sum of squares, kept for `stddev` only.
    squares: Option<Vec<f64>>,
}

impl Buffer {
    fn new(op: Operation, size: usize) -> Self {
        Self {
            values: vec![op.neutral(); size],
            squares: op.needs_squares().then(|| vec![0.0; size]),
        }
    }

    fn reset(&mut self, op: Operation) {
        self.values.fill(op.neutral());
        if let Some(squares) = self.squares.as_mut() {
            squares.fill(0.0);
        }
    }

    fn fold(&mut self, op: Operation, field: &[f64]) {
        match op {
            Operation::Average | Operation::Accumulate => {
                for (acc, v) in self.values.iter_mut().zip(field) {
                    *acc += v;
                }
            }
            Operation::Maximum => {
                for (acc, v) in self.values.iter_mut().zip(field) {
                    *acc = acc.max(*v);
                }
            }
            Operation::Minimum => {
                for (acc, v) in self.values.iter_mut().zip(field) {
                    *acc = acc.min(*v);
                }
            }
            Operation::StdDev => {
                for (acc, v) in self.values.iter_mut().zip(field) {
                    *acc += v;
                }
                if let Some(squares) = self.squares.as_mut() {
                    for (acc, v) in squares.iter_mut().zip(field) {
                        *acc += v * v;
                    }
                }
            }
        }
    }

    fn result(&self, op: Operation, count: u64) -> Vec<f64> {
        let n = count as f64;
        match op {
            Operation::Accumulate | Operation::Maximum | Operation::Minimum => self.values.clone(),
            Operation::Average => self.values.iter().map(|s| s / n).collect(),
            Operation::StdDev => {
                let squares = self.squares.as_deref().unwrap_or(&[]);
                self.values
                    .iter()
                    .zip(squares)
                    .map(|(sum, sq)| {
                        let mean = sum / n;
                        (sq / n - mean * mean).max(0.0).sqrt()
                    })
                    .collect()
            }
        }
    }
}

/// Running aggregates for a fixed set of operations and field size.
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsState {
    buffers: IndexMap<Operation, Buffer>,
    size: usize,
    count: u64,
}

impl StatisticsState {
    /// Allocate one neutral buffer of `size` elements per operation.
    pub fn new(operations: &[Operation], size: usize) -> Self {
        let buffers = operations
            .iter()
            .map(|&op| (op, Buffer::new(op, size)))
            .collect();
        Self {
            buffers,
            size,
            count: 0,
        }
    }

    /// Element count of every buffer.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of fields folded in since the last reset.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The tracked operations, in request order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.buffers.keys().copied()
    }

    /// Raw buffer of `op` (sums for `average` and `stddev`).
    pub fn buffer(&self, op: Operation) -> Option<&[f64]> {
        self.buffers.get(&op).map(|b| b.values.as_slice())
    }

    /// Fold one field into every buffer.
    pub fn fold(&mut self, field: &[f64]) -> Result<(), StatisticsError> {
        if field.len() != self.size {
            return Err(StatisticsError::SizeMismatch {
                expected: self.size,
                found: field.len(),
            });
        }
        for (op, buffer) in self.buffers.iter_mut() {
            buffer.fold(*op, field);
        }
        self.count += 1;
        Ok(())
    }

    /// Final values of every operation, or nothing if the window is empty.
    pub fn results(&self) -> Vec<(Operation, Vec<f64>)> {
        if self.count == 0 {
            return Vec::new();
        }
        self.buffers
            .iter()
            .map(|(op, buffer)| (*op, buffer.result(*op, self.count)))
            .collect()
    }

    /// Return every buffer to its neutral element and the count to zero.
    pub fn reset(&mut self) {
        for (op, buffer) in self.buffers.iter_mut() {
            buffer.reset(*op);
        }
        self.count = 0;
    }
}
