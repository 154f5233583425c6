//! Integration tests for askcars.

pub mod fixtures;
pub mod pipeline_test;
pub mod store_test;
