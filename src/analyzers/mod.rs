pub mod python;

pub use python::{extract_functions, FunctionOutline};
