pub mod normalizer;
pub mod notifier;
pub mod pipeline;
pub mod report_writer;
