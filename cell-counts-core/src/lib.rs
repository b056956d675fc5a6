pub mod dashboard;
pub mod model;
