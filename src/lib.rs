pub mod cli;
pub mod convex;
pub mod entity;
pub mod env_boot;
pub mod input;
pub mod normalization;
pub mod orchestrator;
pub mod records;
pub mod sync;
pub mod tracing;

pub mod util {
    pub mod env;
}
