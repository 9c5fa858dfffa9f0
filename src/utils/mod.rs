//! Shared helpers for Arrow tables, file I/O and logging.

pub mod arrow;
pub mod io;
pub mod logging;
