//! Axum web server with WebSocket streaming for the visualizer.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use arbor_trace::{source_lines, Step, Trace};
use arbor_tree::{
    format_level_order, parse_level_order, random_level_order, Layout, Preset, Viewport, PRESETS,
};

use crate::autoplay::AutoPlay;
use crate::config::VisConfig;
use crate::error::Result;
use crate::replay::{PlaybackSpeed, Replay, ReplayCommand, ReplayStatus};

/// Node count for `/api/tree/random` when none is given.
const DEFAULT_RANDOM_NODES: usize = 7;

/// Shared application state.
pub struct AppState {
    player: AutoPlay,
    config: VisConfig,
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server for the configured input.
    ///
    /// Starts the auto-play driver, so this must run inside a tokio runtime.
    pub fn new(config: VisConfig) -> Result<Self> {
        let input = parse_level_order(&config.input, config.limits)?;
        let replay = Replay::new(input, config.speed);
        Ok(Self {
            state: Arc::new(AppState {
                player: AutoPlay::spawn(replay),
                config,
            }),
        })
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/source", get(source_handler))
            .route("/api/presets", get(presets_handler))
            // Trace and layout for the current tree
            .route("/api/step", get(step_handler))
            .route("/api/trace", get(trace_handler))
            .route("/api/layout", get(layout_handler))
            // Input
            .route("/api/tree", post(tree_handler))
            .route("/api/tree/random", post(random_tree_handler))
            // Playback
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/toggle", post(toggle_handler))
            .route("/api/playback/next", post(next_handler))
            .route("/api/playback/prev", post(prev_handler))
            .route("/api/playback/jump", post(jump_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/playback/speeds", get(speeds_handler))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn serve(self) -> Result<()> {
        let addr = self.state.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Visualization server running on http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    input: String,
    node_count: usize,
    step_count: usize,
    result: u32,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let replay = state.player.read().await;
    Json(StatusResponse {
        status: "ok",
        input: format_level_order(replay.input()),
        node_count: replay.tree().len(),
        step_count: replay.total_steps(),
        result: replay.trace().result(),
    })
}

#[derive(Serialize)]
struct SourceResponse {
    lines: Vec<&'static str>,
}

async fn source_handler() -> Json<SourceResponse> {
    Json(SourceResponse {
        lines: source_lines().collect(),
    })
}

async fn presets_handler() -> Json<&'static [Preset]> {
    Json(PRESETS)
}

async fn step_handler(State(state): State<Arc<AppState>>) -> std::result::Result<Json<Step>, StatusCode> {
    let replay = state.player.read().await;
    replay
        .current_step()
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn trace_handler(State(state): State<Arc<AppState>>) -> Json<Arc<Trace>> {
    let trace = Arc::clone(state.player.read().await.trace());
    Json(trace)
}

#[derive(Deserialize)]
struct LayoutQuery {
    width: Option<f64>,
    height: Option<f64>,
}

async fn layout_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LayoutQuery>,
) -> Json<Layout> {
    let fallback = state.config.viewport;
    let viewport = Viewport::new(
        query.width.unwrap_or(fallback.width),
        query.height.unwrap_or(fallback.height),
    );
    let replay = state.player.read().await;
    let layout = Layout::compute(replay.tree(), viewport);
    debug!(nodes = layout.len(), width = viewport.width, height = viewport.height, "layout");
    Json(layout)
}

#[derive(Deserialize)]
struct TreeRequest {
    input: String,
}

#[derive(Serialize)]
struct TreeResponse {
    changed: bool,
    input: String,
    status: ReplayStatus,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

async fn tree_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TreeRequest>,
) -> std::result::Result<Json<TreeResponse>, ApiError> {
    let input = parse_level_order(&req.input, state.config.limits).map_err(|e| {
        warn!("Rejected tree input {:?}: {}", req.input, e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;
    Ok(Json(load(&state, input).await))
}

#[derive(Deserialize)]
struct RandomQuery {
    nodes: Option<usize>,
}

async fn random_tree_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RandomQuery>,
) -> Json<TreeResponse> {
    let nodes = query.nodes.unwrap_or(DEFAULT_RANDOM_NODES);
    let input = random_level_order(&mut rand::thread_rng(), nodes);
    Json(load(&state, input).await)
}

async fn load(state: &AppState, input: Vec<Option<i32>>) -> TreeResponse {
    let (changed, status) = state
        .player
        .update(|replay| (replay.data_changed(&input), replay.status()))
        .await;
    let input = format_level_order(&input);
    if changed {
        info!("Loaded tree {}", input);
    }
    TreeResponse {
        changed,
        input,
        status,
    }
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Json<ReplayStatus> {
    Json(state.player.status().await)
}

async fn toggle_handler(State(state): State<Arc<AppState>>) -> Json<ReplayStatus> {
    Json(state.player.apply(ReplayCommand::Toggle).await)
}

async fn next_handler(State(state): State<Arc<AppState>>) -> Json<ReplayStatus> {
    Json(state.player.apply(ReplayCommand::Next).await)
}

async fn prev_handler(State(state): State<Arc<AppState>>) -> Json<ReplayStatus> {
    Json(state.player.apply(ReplayCommand::Prev).await)
}

#[derive(Deserialize)]
struct JumpRequest {
    index: i64,
}

async fn jump_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JumpRequest>,
) -> Json<ReplayStatus> {
    Json(state.player.apply(ReplayCommand::Jump { index: req.index }).await)
}

/// Either a raw delay or one of the named presets.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpeedRequest {
    Millis { millis: u64 },
    Preset { preset: PlaybackSpeed },
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Json<ReplayStatus> {
    let command = match req {
        SpeedRequest::Millis { millis } => ReplayCommand::Speed { millis },
        SpeedRequest::Preset { preset } => ReplayCommand::Preset { speed: preset },
    };
    Json(state.player.apply(command).await)
}

#[derive(Serialize)]
struct SpeedPreset {
    preset: PlaybackSpeed,
    multiplier: f64,
    delay_ms: u64,
}

async fn speeds_handler() -> Json<Vec<SpeedPreset>> {
    let presets = PlaybackSpeed::ALL
        .into_iter()
        .map(|preset| SpeedPreset {
            preset,
            multiplier: preset.multiplier(),
            delay_ms: Duration::from(preset).as_millis() as u64,
        })
        .collect();
    Json(presets)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let (tx, rx) = socket.split();
        ws_session(tx, rx, state)
    })
}

/// Serve one WebSocket client over its outgoing and incoming halves.
async fn ws_session<Tx, Rx, E>(mut tx: Tx, mut rx: Rx, state: Arc<AppState>)
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = std::result::Result<Message, E>> + Unpin,
    E: Display,
{
    let mut updates = state.player.subscribe();

    // Send the current frame straight away
    if let Err(e) = send(&mut tx, &frame(&state).await).await {
        warn!("Failed to send initial frame: {}", e);
        return;
    }

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WsCommand>(text.as_str()) {
                            Ok(cmd) => handle_ws_command(&state, cmd).await,
                            Err(e) => Some(WsResponse::Error { message: e.to_string() }),
                        };
                        if let Some(reply) = reply {
                            if let Err(e) = send(&mut tx, &reply).await {
                                warn!("Failed to send reply: {}", e);
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Err(e) = send(&mut tx, &frame(&state).await).await {
                    warn!("Failed to send frame: {}", e);
                    break;
                }
            }
        }
    }
}

async fn send<Tx>(tx: &mut Tx, response: &WsResponse) -> Result<()>
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
{
    let json = serde_json::to_string(response)?;
    tx.send(Message::Text(json.into()))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}

async fn frame(state: &AppState) -> WsResponse {
    let replay = state.player.read().await;
    WsResponse::Frame {
        status: replay.status(),
        step: replay.current_step().cloned(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetFrame,
    GetStatus,
    Load { input: String },
    Toggle,
    Next,
    Prev,
    Jump { index: i64 },
    Speed { millis: u64 },
    Preset { speed: PlaybackSpeed },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Frame {
        status: ReplayStatus,
        step: Option<Step>,
    },
    Status(ReplayStatus),
    Error {
        message: String,
    },
}

/// Commands that change state reply through the next pushed frame.
async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> Option<WsResponse> {
    let command = match cmd {
        WsCommand::GetFrame => return Some(frame(state).await),
        WsCommand::GetStatus => return Some(WsResponse::Status(state.player.status().await)),
        WsCommand::Load { input } => {
            return match parse_level_order(&input, state.config.limits) {
                Ok(values) => {
                    load(state, values).await;
                    None
                }
                Err(e) => Some(WsResponse::Error {
                    message: e.to_string(),
                }),
            };
        }
        WsCommand::Toggle => ReplayCommand::Toggle,
        WsCommand::Next => ReplayCommand::Next,
        WsCommand::Prev => ReplayCommand::Prev,
        WsCommand::Jump { index } => ReplayCommand::Jump { index },
        WsCommand::Speed { millis } => ReplayCommand::Speed { millis },
        WsCommand::Preset { speed } => ReplayCommand::Preset { speed },
    };
    state.player.apply(command).await;
    None
}
