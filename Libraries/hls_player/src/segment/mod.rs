pub mod fetcher;
pub mod state;
