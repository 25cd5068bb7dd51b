use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::app::{AssistantApp, AssistantResponse};

const REQUEST_QUEUE_DEPTH: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub scripted_commands: Vec<String>,
    #[serde(default = "default_simulation_interval_ms")]
    pub interval_ms: u64,
}

fn default_simulation_interval_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline already running")]
    AlreadyRunning,
    #[error("pipeline not running")]
    NotRunning,
    #[error("failed to send control message: {0}")]
    SendError(String),
    #[error("pipeline dropped the request")]
    Dropped,
    #[error("pipeline task failed: {0}")]
    Join(String),
}

#[derive(Debug)]
enum ControlMessage {
    Shutdown { ack: oneshot::Sender<()> },
}

#[derive(Debug)]
struct PipelineRequest {
    utterance: String,
    respond_to: oneshot::Sender<AssistantResponse>,
}

#[derive(Debug, Default, Clone)]
pub struct PipelineMetrics {
    processed: usize,
    scripted: usize,
    last_activity: Option<Instant>,
    last_latency: Option<Duration>,
    max_latency: Option<Duration>,
}

impl PipelineMetrics {
    pub fn processed_commands(&self) -> usize {
        self.processed
    }

    pub fn scripted_commands(&self) -> usize {
        self.scripted
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    pub fn last_latency(&self) -> Option<Duration> {
        self.last_latency
    }

    pub fn max_latency(&self) -> Option<Duration> {
        self.max_latency
    }
}

/// Serialises utterances through one background task that owns the
/// assistant. Requests are answered in submission order.
pub struct CommandPipeline {
    config: PipelineConfig,
    app: Arc<AssistantApp>,
    control_tx: Option<mpsc::Sender<ControlMessage>>,
    request_tx: Option<mpsc::Sender<PipelineRequest>>,
    task: Option<JoinHandle<()>>,
    metrics: Arc<Mutex<PipelineMetrics>>,
    response_rx: Option<mpsc::UnboundedReceiver<AssistantResponse>>,
}

impl CommandPipeline {
    pub fn new(config: PipelineConfig, app: Arc<AssistantApp>) -> Self {
        Self {
            config,
            app,
            control_tx: None,
            request_tx: None,
            task: None,
            metrics: Arc::new(Mutex::new(PipelineMetrics::default())),
            response_rx: None,
        }
    }

    pub async fn start(&mut self) -> Result<(), PipelineError> {
        if self.task.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }

        let (control_tx, control_rx) = mpsc::channel(1);
        let (request_tx, request_rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let metrics = Arc::clone(&self.metrics);
        let config = self.config.clone();
        let app = Arc::clone(&self.app);

        let task = tokio::spawn(async move {
            run_pipeline(control_rx, request_rx, config, app, metrics, response_tx).await;
        });

        self.control_tx = Some(control_tx);
        self.request_tx = Some(request_tx);
        self.task = Some(task);
        self.response_rx = Some(response_rx);

        info!("Command pipeline started");
        Ok(())
    }

    /// Queues `utterance` and waits for its response.
    pub async fn submit(&self, utterance: impl Into<String>) -> Result<AssistantResponse, PipelineError> {
        let tx = self.request_tx.as_ref().ok_or(PipelineError::NotRunning)?;

        let (respond_to, response) = oneshot::channel();
        tx.send(PipelineRequest {
            utterance: utterance.into(),
            respond_to,
        })
        .await
        .map_err(|err| PipelineError::SendError(err.to_string()))?;

        response.await.map_err(|_| PipelineError::Dropped)
    }

    pub async fn stop(&mut self) -> Result<(), PipelineError> {
        let tx = self.control_tx.take().ok_or(PipelineError::NotRunning)?;
        let task = self.task.take().ok_or(PipelineError::NotRunning)?;
        self.request_tx = None;

        let (ack_tx, ack_rx) = oneshot::channel();
        tx.send(ControlMessage::Shutdown { ack: ack_tx })
            .await
            .map_err(|err| PipelineError::SendError(err.to_string()))?;

        if ack_rx.await.is_err() {
            warn!("Pipeline shutdown acknowledgement was dropped");
        }

        task.await.map_err(|err| PipelineError::Join(err.to_string()))?;

        let metrics = self.metrics().await;
        info!(
            processed = metrics.processed_commands(),
            scripted = metrics.scripted_commands(),
            max_latency_ms = metrics
                .max_latency()
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default(),
            "Command pipeline stopped"
        );

        Ok(())
    }

    pub async fn metrics(&self) -> PipelineMetrics {
        self.metrics.lock().await.clone()
    }

    /// Responses to scripted commands, in script order.
    pub fn take_response_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<AssistantResponse>> {
        self.response_rx.take()
    }
}

async fn run_pipeline(
    mut control_rx: mpsc::Receiver<ControlMessage>,
    mut request_rx: mpsc::Receiver<PipelineRequest>,
    config: PipelineConfig,
    app: Arc<AssistantApp>,
    metrics: Arc<Mutex<PipelineMetrics>>,
    response_tx: mpsc::UnboundedSender<AssistantResponse>,
) {
    let script = if config.simulation.enabled {
        info!(
            "Replaying {} scripted commands",
            config.simulation.scripted_commands.len()
        );
        config.simulation.scripted_commands.clone()
    } else {
        Vec::new()
    };
    let mut scripted = script.into_iter().peekable();

    let interval = Duration::from_millis(config.simulation.interval_ms);
    let mut next_script = time::Instant::now();

    loop {
        let script_pending = scripted.peek().is_some();

        tokio::select! {
            Some(ControlMessage::Shutdown { ack }) = control_rx.recv() => {
                let _ = ack.send(());
                break;
            }
            Some(request) = request_rx.recv() => {
                let response = process_command(&app, &request.utterance, &metrics).await;
                if request.respond_to.send(response).is_err() {
                    debug!("Requester went away before the response was ready");
                }
            }
            _ = time::sleep_until(next_script), if script_pending => {
                if let Some(text) = scripted.next() {
                    let response = process_command(&app, &text, &metrics).await;
                    metrics.lock().await.scripted += 1;
                    let _ = response_tx.send(response);
                }
                next_script = time::Instant::now() + interval;
            }
            else => break,
        }
    }

    info!("Command pipeline terminated");
}

async fn process_command(
    app: &AssistantApp,
    utterance: &str,
    metrics: &Arc<Mutex<PipelineMetrics>>,
) -> AssistantResponse {
    let started = Instant::now();
    let response = app.respond(utterance).await;
    let latency = started.elapsed();

    let mut guard = metrics.lock().await;
    guard.processed += 1;
    guard.last_activity = Some(Instant::now());
    guard.last_latency = Some(latency);
    if guard.max_latency.map(|max| latency > max).unwrap_or(true) {
        guard.max_latency = Some(latency);
    }

    response
}
