//! Writers for traced skeletons.

pub mod svg;
