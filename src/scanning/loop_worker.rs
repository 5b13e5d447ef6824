use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use log::{debug, error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::event::ScanEvent;
use super::pipeline::ScanPipeline;

/// Pull-per-tick producer of scan events — the face-recognition style
/// collaborator that re-evaluates the current camera frame on demand.
/// The loop owns the source and drops it on exit, so the underlying
/// capture resource is released on every shutdown path.
pub trait FrameSource: Send + 'static {
    fn poll(&mut self) -> Result<Vec<ScanEvent>>;
}

/// Fixed-cadence loop: poll the source every tick, feed each event through
/// the shared pipeline. Poll failures are logged and the loop keeps going;
/// the next tick naturally retries with a fresh frame.
pub async fn polling_loop(
    mut source: Box<dyn FrameSource>,
    pipeline: Arc<Mutex<ScanPipeline>>,
    tick_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = match source.poll() {
                    Ok(events) => events,
                    Err(err) => {
                        error!("frame source poll failed: {err:?}");
                        continue;
                    }
                };
                process_events(&pipeline, events).await;
            }
            _ = cancel_token.cancelled() => {
                info!("polling scan loop shutting down");
                break;
            }
        }
    }
}

/// Callback-driven loop: one event per successful external decode (QR
/// style), delivered over a channel. Shares the same pipeline — and thus
/// the same dedup and ledger guarantees — as the polling loop.
pub async fn stream_loop(
    mut events: mpsc::Receiver<ScanEvent>,
    pipeline: Arc<Mutex<ScanPipeline>>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(event) => process_events(&pipeline, vec![event]).await,
                    None => {
                        info!("scan event channel closed");
                        break;
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("stream scan loop shutting down");
                break;
            }
        }
    }
}

async fn process_events(pipeline: &Arc<Mutex<ScanPipeline>>, events: Vec<ScanEvent>) {
    for event in events {
        let today = Utc::now().date_naive();

        let mut guard = pipeline.lock().await;
        match guard.process(&event, event.timestamp, today).await {
            Ok(outcome) => debug!("scan event resolved: {}", outcome.kind()),
            Err(err) => error!("scan processing failed for key {}: {err:?}", event.raw_key),
        }
    }
}
