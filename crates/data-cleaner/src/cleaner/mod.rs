//! Column-name and text-value sanitization used by the executor.

mod sanitizers;

pub use sanitizers::{
    NAME_SEPARATOR, normalize_column_name, normalize_column_names, normalize_text_values,
};
