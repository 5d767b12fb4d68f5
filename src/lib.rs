pub mod anomaly;
pub mod common;
pub mod stream;
