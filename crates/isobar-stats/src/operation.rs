//! Statistical operations.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::StatisticsError;

/// A time-aggregation operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Element-wise mean over the window.
    Average,
    /// Element-wise sum over the window.
    Accumulate,
    /// Element-wise maximum.
    Maximum,
    /// Element-wise minimum.
    Minimum,
    /// Element-wise population standard deviation.
    StdDev,
}

/// The operation list of one statistics stage.
pub type Operations = SmallVec<[Operation; 5]>;

impl Operation {
    /// Every operation.
    pub const ALL: [Operation; 5] = [
        Operation::Average,
        Operation::Accumulate,
        Operation::Maximum,
        Operation::Minimum,
        Operation::StdDev,
    ];

    /// The operation's configuration and metadata name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Average => "average",
            Operation::Accumulate => "accumulate",
            Operation::Maximum => "maximum",
            Operation::Minimum => "minimum",
            Operation::StdDev => "stddev",
        }
    }

    /// Initial buffer element before anything is folded in.
    pub fn neutral(self) -> f64 {
        match self {
            Operation::Maximum => f64::NEG_INFINITY,
            Operation::Minimum => f64::INFINITY,
            _ => 0.0,
        }
    }

    /// Whether a second buffer of squares is kept.
    pub(crate) fn needs_squares(self) -> bool {
        self == Operation::StdDev
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = StatisticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| StatisticsError::UnknownOperation {
                name: s.to_string(),
            })
    }
}

/// Parse a list of operation names, dropping repeats.
pub fn parse_operations<S: AsRef<str>>(names: &[S]) -> Result<Operations, StatisticsError> {
    let mut ops = Operations::new();
    for name in names {
        let op = name.as_ref().parse()?;
        if !ops.contains(&op) {
            ops.push(op);
        }
    }
    if ops.is_empty() {
        return Err(StatisticsError::NoOperations);
    }
    Ok(ops)
}
