use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use polaroid_core::Service;
use polaroid_types::api::Claims;
use polaroid_types::events::{GatewayCommand, GatewayEvent};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);
const IDENTIFY_TIMEOUT: Duration = Duration::from_secs(10);

type Subscriptions = Arc<RwLock<HashSet<Uuid>>>;

/// Serve one WebSocket client: Identify handshake, then live thread
/// snapshots for the matches it subscribes to plus its notifications.
pub async fn handle_connection(
    socket: WebSocket,
    dispatcher: Dispatcher,
    service: Arc<Service>,
    jwt_secret: String,
) {
    let (mut sender, mut receiver) = socket.split();

    // Step 1: Wait for Identify command with JWT
    let Some((user_id, username)) = wait_for_identify(&mut receiver, &service, &jwt_secret).await else {
        warn!("WebSocket client failed to identify, closing");
        return;
    };

    info!("{} ({}) connected to gateway", username, user_id);

    // Step 2: Send Ready event
    let ready = GatewayEvent::Ready {
        user_id,
        username: username.clone(),
    };
    if !send_event(&mut sender, &ready).await {
        return;
    }

    run_connection_loop(sender, receiver, dispatcher, service, user_id).await;
    info!("{} ({}) disconnected from gateway", username, user_id);
}

async fn run_connection_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    dispatcher: Dispatcher,
    service: Arc<Service>,
    user_id: Uuid,
) {
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let conn_id = dispatcher.register_connection(user_id, out_tx.clone());
    let mut thread_rx = dispatcher.subscribe_threads();

    let subscriptions: Subscriptions = Arc::new(RwLock::new(HashSet::new()));
    let send_subscriptions = subscriptions.clone();
    let send_service = service.clone();

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward targeted events and thread snapshots -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = thread_rx.recv() => {
                    let changed = match result {
                        Ok(match_id) => vec![match_id],
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            // Snapshots are complete, so resending all of them catches up.
                            warn!("Thread receiver lagged by {} updates, resyncing", n);
                            subscribed(&send_subscriptions).into_iter().collect()
                        }
                        Err(_) => break,
                    };

                    for match_id in changed {
                        if !subscribed(&send_subscriptions).contains(&match_id) {
                            continue;
                        }
                        if let Some(event) = thread_snapshot(&send_service, user_id, match_id).await {
                            if !send_event(&mut sender, &event).await {
                                return;
                            }
                        }
                    }
                }
                event = out_rx.recv() => {
                    let Some(event) = event else { break };
                    if !send_event(&mut sender, &event).await {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<GatewayCommand>(&text) {
                    Ok(cmd) => handle_command(&service, user_id, cmd, &subscriptions, &out_tx).await,
                    Err(e) => {
                        warn!(
                            "{} bad command: {} -- raw: {}",
                            user_id,
                            e,
                            text.chars().take(200).collect::<String>()
                        );
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.unregister_connection(user_id, conn_id);
}

async fn wait_for_identify(
    receiver: &mut SplitStream<WebSocket>,
    service: &Arc<Service>,
    jwt_secret: &str,
) -> Option<(Uuid, String)> {
    use jsonwebtoken::{DecodingKey, Validation, decode};

    let identified = tokio::time::timeout(IDENTIFY_TIMEOUT, async {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                if let Ok(GatewayCommand::Identify { token }) = serde_json::from_str::<GatewayCommand>(&text) {
                    let token_data = decode::<Claims>(
                        &token,
                        &DecodingKey::from_secret(jwt_secret.as_bytes()),
                        &Validation::default(),
                    )
                    .ok()?;
                    return Some(token_data.claims.sub);
                }
            }
        }
        None
    });
    let user_id = identified.await.ok().flatten()?;

    // The token may outlive its user.
    let svc = service.clone();
    match tokio::task::spawn_blocking(move || svc.user(user_id)).await {
        Ok(Ok(user)) => Some((user.id, user.username)),
        Ok(Err(e)) => {
            warn!("Identify for {} refused: {}", user_id, e);
            None
        }
        Err(e) => {
            warn!("Identify lookup task failed: {}", e);
            None
        }
    }
}

async fn handle_command(
    service: &Arc<Service>,
    user_id: Uuid,
    cmd: GatewayCommand,
    subscriptions: &Subscriptions,
    out_tx: &mpsc::UnboundedSender<GatewayEvent>,
) {
    match cmd {
        GatewayCommand::Identify { .. } => {} // Already handled

        GatewayCommand::Subscribe { match_ids } => {
            info!("{} subscribing to {} threads", user_id, match_ids.len());

            // Track first so a change racing the initial snapshot still gets sent.
            *subscriptions.write().unwrap_or_else(PoisonError::into_inner) =
                match_ids.iter().copied().collect();

            for match_id in match_ids {
                match thread_snapshot(service, user_id, match_id).await {
                    Some(event) => {
                        let _ = out_tx.send(event);
                    }
                    None => {
                        subscriptions
                            .write()
                            .unwrap_or_else(PoisonError::into_inner)
                            .remove(&match_id);
                    }
                }
            }
        }
    }
}

/// Full current thread, or `None` when the user may not see it.
async fn thread_snapshot(service: &Arc<Service>, user_id: Uuid, match_id: Uuid) -> Option<GatewayEvent> {
    let svc = service.clone();
    match tokio::task::spawn_blocking(move || svc.thread(user_id, match_id)).await {
        Ok(Ok(messages)) => {
            debug!("Snapshot of {} ({} messages) for {}", match_id, messages.len(), user_id);
            Some(GatewayEvent::ThreadSnapshot { match_id, messages })
        }
        Ok(Err(e)) => {
            warn!("{} cannot follow thread {}: {}", user_id, match_id, e);
            None
        }
        Err(e) => {
            warn!("Snapshot task failed: {}", e);
            None
        }
    }
}

fn subscribed(subscriptions: &Subscriptions) -> HashSet<Uuid> {
    subscriptions
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Returns false once the client is gone.
async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &GatewayEvent) -> bool {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to encode gateway event: {}", e);
            return true;
        }
    };
    sender.send(Message::Text(text.into())).await.is_ok()
}
