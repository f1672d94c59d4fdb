//! Sanitization of column names and text values.

use crate::utils::disambiguate_names;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Separator that replaces whitespace runs in column names.
pub const NAME_SEPARATOR: &str = "_";

/// Trim, lower-case and replace whitespace runs with `_`.
pub fn normalize_column_name(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), NAME_SEPARATOR)
        .to_lowercase()
}

/// Normalize every name, re-suffixing names that collide after normalization.
pub fn normalize_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let normalized: Vec<String> = names
        .iter()
        .map(|n| normalize_column_name(n.as_ref()))
        .collect();
    disambiguate_names(&normalized)
}

/// Trim string values and optionally lower-case them.
///
/// Returns `None` when no value changed. Nulls stay null. Non-string series
/// are left alone.
pub fn normalize_text_values(series: &Series, lowercase: bool) -> PolarsResult<Option<(Series, usize)>> {
    if series.dtype() != &DataType::String {
        return Ok(None);
    }

    let str_series = series.str()?;
    let mut changed = 0;
    let mut cleaned_values = Vec::with_capacity(str_series.len());

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => {
                let trimmed = val.trim();
                let cleaned = if lowercase {
                    trimmed.to_lowercase()
                } else {
                    trimmed.to_string()
                };
                if cleaned != val {
                    changed += 1;
                }
                cleaned_values.push(Some(cleaned));
            }
            None => cleaned_values.push(None),
        }
    }

    if changed == 0 {
        return Ok(None);
    }

    Ok(Some((Series::new(series.name().clone(), cleaned_values), changed)))
}
