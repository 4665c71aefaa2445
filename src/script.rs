//! Script generation for every routine of a built database

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{Database, Routine};

/// Minimum number of routines to benefit from parallel scripting.
/// Below this threshold, sequential processing is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 8;

/// Script every routine in declaration order, as CREATE or as ALTER.
///
/// Each routine gets its own result so one routine that cannot be altered
/// does not hide the scripts of the others.
pub fn script_routines(db: &Database, alter: bool) -> Vec<Result<String>> {
    let script = |routine: &Routine| {
        if alter {
            routine.script_alter(Some(db))
        } else {
            Ok(routine.script_create(Some(db)))
        }
    };

    let routines = db.routines();
    if routines.len() >= PARALLEL_THRESHOLD {
        routines.par_iter().map(script).collect()
    } else {
        routines.iter().map(script).collect()
    }
}
