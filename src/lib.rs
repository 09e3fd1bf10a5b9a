pub mod app;
pub mod cloud;
pub mod terms;
