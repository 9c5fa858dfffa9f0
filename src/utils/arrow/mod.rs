//! Arrow utilities for named-column feature tables

pub mod array_utils;

pub use array_utils::{
    batch_from_columns, column_names, downcast_array, drop_columns, float_values, get_column,
    has_column, named_columns, replace_with_columns, set_column, string_values,
};
