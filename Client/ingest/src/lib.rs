pub mod args;
pub mod sink;
