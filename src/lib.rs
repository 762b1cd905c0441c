pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod ocr;
pub mod pipeline;
pub mod region;
pub mod scanner;
