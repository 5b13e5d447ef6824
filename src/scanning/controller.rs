use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::event::ScanEvent;
use super::loop_worker::{polling_loop, stream_loop, FrameSource};
use super::pipeline::ScanPipeline;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Owns the lifecycle of one scan loop: start it in either mode, stop it
/// deterministically (cancel + join). One loop per controller at a time.
pub struct ScanController {
    pipeline: Arc<Mutex<ScanPipeline>>,
    tick_interval: Duration,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ScanController {
    /// `tick_interval` only drives the polling mode; the pipeline carries
    /// every other tunable it was built with.
    pub fn new(pipeline: ScanPipeline, tick_interval: Duration) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            tick_interval,
            handle: None,
            cancel_token: None,
        }
    }

    /// Shared handle to the pipeline, e.g. for a manual re-scan path that
    /// must race safely against the running loop.
    pub fn pipeline(&self) -> Arc<Mutex<ScanPipeline>> {
        Arc::clone(&self.pipeline)
    }

    /// Starts the fixed-cadence polling loop over a frame source.
    pub fn start_polling(&mut self, source: Box<dyn FrameSource>) -> Result<()> {
        if self.handle.is_some() {
            bail!("scan loop already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(polling_loop(
            source,
            Arc::clone(&self.pipeline),
            self.tick_interval,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Starts the callback-driven loop and returns the sender the decode
    /// collaborator pushes events into.
    pub fn start_stream(&mut self) -> Result<mpsc::Sender<ScanEvent>> {
        if self.handle.is_some() {
            bail!("scan loop already active");
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(stream_loop(
            event_rx,
            Arc::clone(&self.pipeline),
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(event_tx)
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("scan loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
