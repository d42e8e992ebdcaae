//! Fixed code tables of the output format.

use crate::error::EncodeError;

/// Operation name of an instantaneous (non-statistical) field.
pub const INSTANT: &str = "instant";

/// Unit code written with every time increment: seconds.
pub const TIME_UNIT_SECONDS: i64 = 13;

/// Statistical processing code of an operation.
pub fn operation_code(operation: &str) -> Result<i64, EncodeError> {
    match operation {
        "average" => Ok(0),
        "accumulate" => Ok(1),
        "maximum" => Ok(2),
        "minimum" => Ok(3),
        "stddev" => Ok(6),
        _ => Err(EncodeError::UnknownOperation {
            operation: operation.to_string(),
        }),
    }
}

/// Generating-process code of a run type.
pub fn generating_process_code(run_type: &str) -> Result<i64, EncodeError> {
    match run_type {
        "an" => Ok(0),
        "in" => Ok(1),
        "fc" => Ok(2),
        "pf" => Ok(4),
        _ => Err(EncodeError::UnknownRunType {
            run_type: run_type.to_string(),
        }),
    }
}

/// Level type of a field category.
pub fn level_type(category: &str) -> Result<&'static str, EncodeError> {
    match category {
        "ocean-grid-coordinate" | "ocean-2d" => Ok("oceanSurface"),
        "ocean-3d" => Ok("oceanModelLevel"),
        _ => Err(EncodeError::UnknownCategory {
            category: category.to_string(),
        }),
    }
}
