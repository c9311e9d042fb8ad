pub mod agent;
pub mod completions;
pub mod config;
pub mod doctor;
pub mod history;
pub mod plan;
