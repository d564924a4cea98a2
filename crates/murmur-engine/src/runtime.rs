//! Engine runtime setup and orchestration.
//!
//! This module wires together configuration, shared state, and the message
//! dispatch loop that listens to front end bridge requests.

use std::{sync::Arc, thread};

use murmur_bridge::{MessageFromEngine, MessageToEngine};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::pipeline_cache::PipelineCache;
use crate::state::State;

/// Initialize engine state and start processing front end messages.
async fn setup_engine(rx: Receiver<MessageToEngine>, tx: Sender<MessageFromEngine>) {
    let (config, cache_path) = crate::config::load_config()
        .await
        .expect("failed to load config");

    let request_client = reqwest::Client::new();

    let state = Arc::new(RwLock::new(State {
        config,
        cache_path,
        request_client,
    }));

    let context = Arc::new(AppContext {
        state,
        pipelines: tokio::sync::Mutex::new(PipelineCache::new()),
        tx,
    });
    context.consume_bridge_messages(rx).await;
}

/// Spawn the engine runtime and begin processing bridge messages.
pub fn run(rx: Receiver<MessageToEngine>, tx: Sender<MessageFromEngine>) {
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");
        runtime.block_on(async { setup_engine(rx, tx).await });
    });
}
