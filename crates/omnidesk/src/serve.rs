// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` command: wire every component together and run until ctrl-c.
//!
//! Startup order follows the data flow: storage and media first, then the
//! assistant engine, then the channel session feeding the triage dispatcher
//! through the inbound router, and finally the operator gateway.

use std::sync::Arc;

use tracing::{info, warn};

use omnidesk_assistant::AssistantEngine;
use omnidesk_bus::EventBus;
use omnidesk_channel::{BridgeTransport, EventRouter, SessionManager};
use omnidesk_config::DeskConfig;
use omnidesk_core::{
    Assistant, ChannelSession, ChannelTransport, DeskError, MediaStore, PluginAdapter,
    StorageAdapter,
};
use omnidesk_gateway::{GatewayState, ServerConfig};
use omnidesk_media::DiskMediaStore;
use omnidesk_storage::SqliteStorage;
use omnidesk_triage::{TriageDispatcher, TriagePipeline};

pub async fn run(config: DeskConfig) -> Result<(), DeskError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let media = Arc::new(DiskMediaStore::new(&config.media.uploads_dir)?);
    let bus = EventBus::new();
    let assistant = Arc::new(AssistantEngine::new(&config.anthropic)?);

    let transport: Arc<dyn ChannelTransport> =
        Arc::new(BridgeTransport::new(&config.channel.bridge_url));
    let (manager, inbound_events) = SessionManager::new(transport, &config.channel, bus.clone());

    let pipeline = Arc::new(TriagePipeline::new(
        storage.clone() as Arc<dyn StorageAdapter>,
        assistant.clone() as Arc<dyn Assistant>,
        media.clone() as Arc<dyn MediaStore>,
        Arc::new(manager.clone()) as Arc<dyn ChannelSession>,
        bus.clone(),
    ));
    let dispatcher = TriageDispatcher::new(pipeline);

    let router = EventRouter::new(dispatcher, bus.clone());
    tokio::spawn(router.run(inbound_events));

    manager.start();

    for health in [
        storage.health_check().await,
        media.health_check().await,
        assistant.health_check().await,
    ] {
        if let Ok(status) = health
            && status != omnidesk_core::HealthStatus::Healthy
        {
            warn!(?status, "component degraded at startup");
        }
    }

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        max_upload_bytes: config.media.max_upload_bytes,
    };
    let state = GatewayState {
        channel: Arc::new(manager.clone()),
        storage: storage.clone(),
        media,
        bus,
    };

    info!(name = %config.desk.name, "desk is up");

    tokio::select! {
        result = omnidesk_gateway::start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            manager.shutdown().await?;
            storage.shutdown().await?;
            Ok(())
        }
    }
}
