//! Use a loaded grammar for something other than generating inputs.

pub mod json;
