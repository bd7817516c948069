//! Structured logging: `tracing` + `tracing-subscriber` + `tracing-appender`,
//! with a scrubbing layer so secrets never reach a log sink.

pub mod logger;
pub mod secret_scrubbing;

pub use logger::LoggerImpl;
pub use secret_scrubbing::SecretScrubbingLayer;
