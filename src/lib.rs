pub mod cli;
pub mod config;
pub mod convert;
pub mod engine;
pub mod output;
pub mod report;
pub mod session;
pub mod util;
pub mod walk;
