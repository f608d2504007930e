//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use roomcast_shared::time::SystemClock;
use tokio::sync::mpsc;

use crate::{
    domain::{ChatSession, SessionUpdate, should_attempt_reconnect},
    error::ClientError,
    session::run_client_session,
    ui::{spawn_input_reader, spawn_renderer},
};

pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 5;

/// Everything the terminal client needs to run
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub identity_token: Option<String>,
    pub author_label: String,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
}

/// Run the terminal chat client with reconnection logic
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let mut session = ChatSession::new(
        config.author_label.clone(),
        config.identity_token.clone(),
        Arc::new(SystemClock),
    );

    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        config.author_label
    );

    let mut inputs = spawn_input_reader(config.author_label.clone());
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let renderer = spawn_renderer(updates_rx, config.author_label.clone());

    let result = run_with_reconnect(&config, &mut session, &mut inputs, &updates_tx).await;

    drop(updates_tx);
    renderer.await.ok();

    result
}

/// Drive sessions until the user quits or the attempts are used up.
///
/// The attempt counter resets once a session gets as far as `joined`, so the
/// limit applies per outage rather than over the client's lifetime.
pub async fn run_with_reconnect(
    config: &ClientConfig,
    session: &mut ChatSession,
    inputs: &mut mpsc::UnboundedReceiver<String>,
    updates: &mpsc::UnboundedSender<SessionUpdate>,
) -> Result<(), ClientError> {
    let mut failed_attempts = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            config.url,
            failed_attempts + 1,
            config.max_reconnect_attempts
        );

        match run_client_session(&config.url, session, inputs, updates).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("{}", e);

                if session.connection_id().is_some() {
                    failed_attempts = 0;
                }
                failed_attempts += 1;

                if !should_attempt_reconnect(&e, failed_attempts, config.max_reconnect_attempts) {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        failed_attempts
                    );
                    return Err(match e {
                        ClientError::InvalidUrl(_) => e,
                        _ => ClientError::ReconnectAttemptsExhausted(failed_attempts),
                    });
                }

                tracing::info!(
                    "Reconnecting in {:?}... (attempt {}/{})",
                    config.reconnect_interval,
                    failed_attempts + 1,
                    config.max_reconnect_attempts
                );

                if !wait_dropping_input(config.reconnect_interval, inputs).await {
                    tracing::info!("Input closed while disconnected");
                    return Ok(());
                }
            }
        }
    }
}

/// Sleep for `interval`, discarding anything typed meanwhile.
///
/// Returns `false` if the input channel closed while waiting.
async fn wait_dropping_input(
    interval: Duration,
    inputs: &mut mpsc::UnboundedReceiver<String>,
) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            line = inputs.recv() => match line {
                Some(_) => tracing::debug!("Dropping input while disconnected"),
                None => return false,
            },
        }
    }
}
