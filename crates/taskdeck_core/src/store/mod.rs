pub mod filters;
pub mod tasks;
