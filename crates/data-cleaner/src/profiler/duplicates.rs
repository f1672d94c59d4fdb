//! Exact-duplicate row detection.
//!
//! Rows are compared on every column of a frame with unique column names,
//! nulls equal to nulls. The profiler (counting), the planner (missing rates)
//! and the executor (removal) share these helpers so they never disagree.

use polars::prelude::*;

/// Drop repeated rows, keeping the first occurrence in original order.
pub fn drop_duplicate_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(df.clone());
    }
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Rows minus distinct rows.
pub fn count_duplicate_rows(df: &DataFrame) -> PolarsResult<usize> {
    Ok(df.height() - drop_duplicate_rows(df)?.height())
}
