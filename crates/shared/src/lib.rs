pub mod geo;
pub mod marker;
pub mod models;
pub mod signal;
