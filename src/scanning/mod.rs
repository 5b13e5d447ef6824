pub mod config;
pub mod controller;
pub mod event;
pub mod loop_worker;
pub mod notify;
pub mod pipeline;

pub use config::ScanConfig;
pub use controller::ScanController;
pub use event::{ScanEvent, ScanPayload};
pub use loop_worker::FrameSource;
pub use notify::{LogSink, NotificationSink, ScanOutcome};
pub use pipeline::ScanPipeline;
