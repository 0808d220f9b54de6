//! Reading matrices from files.

pub mod matrix_market;

pub use matrix_market::{read_matrix_market, read_matrix_market_file};
