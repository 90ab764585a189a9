use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    push::PushSender,
    ws::WsRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool: DbPool,
    pub orm: OrmConn,
    /// Process-wide registry of live WebSocket connections, constructed once
    /// at startup and shared by reference. Single-process deployment shape.
    pub ws: WsRegistry,
    pub push: Arc<dyn PushSender>,
}
