//! Redis-backed queue sink
//!
//! Pushes serialized alerts onto Redis lists with `LPUSH`; the downstream
//! processor pops them from the right with `BRPOP`. The sink addresses the
//! queue either directly (host:port) or through sentinel master discovery,
//! and lazily re-establishes its session after a transport failure. The
//! session handle lives behind a `tokio::sync::Mutex` so one entry sequence
//! is always pushed contiguously.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::config::{RelayConfig, SentinelAddr};
use crate::queue::sink::{ConnectionState, EventSink, PushError, QueueEntry};

/// How the queue master is located
#[derive(Debug, Clone)]
enum QueueAddr {
    Direct {
        host: String,
        port: u16,
    },
    Sentinel {
        master: String,
        sentinels: Vec<SentinelAddr>,
    },
}

/// Queue sink backed by a Redis server
pub struct RedisSink {
    addr: QueueAddr,
    db: i64,
    auto_reconnect: bool,
    session: tokio::sync::Mutex<Option<MultiplexedConnection>>,
    state: parking_lot::RwLock<ConnectionState>,
    had_session: AtomicBool,
}

impl RedisSink {
    /// Build a sink from the relay configuration; no connection is made yet
    pub fn from_config(config: &RelayConfig) -> Self {
        let addr = match &config.master {
            Some(master) => QueueAddr::Sentinel {
                master: master.clone(),
                sentinels: config.sentinels.clone(),
            },
            None => QueueAddr::Direct {
                host: config.host.clone(),
                port: config.port,
            },
        };
        Self {
            addr,
            db: config.db,
            auto_reconnect: config.auto_reconnect,
            session: tokio::sync::Mutex::new(None),
            state: parking_lot::RwLock::new(ConnectionState::Disconnected),
            had_session: AtomicBool::new(false),
        }
    }

    /// True when the master is located through sentinels
    pub fn uses_sentinel(&self) -> bool {
        matches!(self.addr, QueueAddr::Sentinel { .. })
    }

    /// Establish the session eagerly. Failure leaves the sink usable: the
    /// next push attempts to open a session itself.
    pub async fn connect(&self) -> Result<(), ConnectError> {
        let session = self.open_session().await?;
        let mut slot = self.session.lock().await;
        *slot = Some(session);
        self.mark_connected();
        Ok(())
    }

    async fn open_session(&self) -> Result<MultiplexedConnection, ConnectError> {
        let (host, port) = match &self.addr {
            QueueAddr::Direct { host, port } => (host.clone(), *port),
            QueueAddr::Sentinel { master, sentinels } => {
                resolve_master(master, sentinels).await?
            }
        };
        let url = session_url(&host, port, self.db);
        let client =
            redis::Client::open(url.as_str()).map_err(|e| ConnectError::Address(e.to_string()))?;
        client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ConnectError::Unreachable {
                addr: format!("{host}:{port}"),
                reason: e.to_string(),
            })
    }

    fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.write();
        if *state != next {
            tracing::info!(
                from = state.as_str(),
                to = next.as_str(),
                "Queue connection state changed"
            );
            *state = next;
        }
    }

    fn mark_connected(&self) {
        self.had_session.store(true, Ordering::SeqCst);
        self.set_state(ConnectionState::Connected);
    }

    fn mark_lost(&self) {
        self.set_state(if self.auto_reconnect {
            ConnectionState::Reconnecting
        } else {
            ConnectionState::Disconnected
        });
    }
}

#[async_trait]
impl EventSink for RedisSink {
    async fn push_sequence(&self, entries: &[QueueEntry]) -> Result<(), PushError> {
        let mut slot = self.session.lock().await;

        if slot.is_none() {
            // The first session is always attempted; auto_reconnect only
            // governs re-establishment after a loss.
            if !self.auto_reconnect && self.had_session.load(Ordering::SeqCst) {
                return Err(PushError::Unavailable(
                    "session lost and auto_reconnect is disabled".to_string(),
                ));
            }
            match self.open_session().await {
                Ok(session) => {
                    *slot = Some(session);
                    self.mark_connected();
                }
                Err(e) => return Err(PushError::Unavailable(e.to_string())),
            }
        }

        let Some(session) = slot.as_mut() else {
            return Err(PushError::Unavailable("no queue session".to_string()));
        };

        let mut failure = None;
        for entry in entries {
            let pushed: Result<i64, redis::RedisError> = session
                .lpush(entry.list.as_str(), entry.payload.as_str())
                .await;
            if let Err(e) = pushed {
                failure = Some(PushError::Transport {
                    list: entry.list.clone(),
                    reason: e.to_string(),
                });
                break;
            }
        }

        match failure {
            Some(err) => {
                // Drop the broken session; the next push re-opens it when
                // auto_reconnect allows.
                *slot = None;
                self.mark_lost();
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }
}

/// Ask each sentinel in order for the master address; unreachable sentinels
/// are skipped as long as one of them answers.
async fn resolve_master(
    master: &str,
    sentinels: &[SentinelAddr],
) -> Result<(String, u16), ConnectError> {
    let mut attempts = Vec::new();
    for sentinel in sentinels {
        match query_sentinel(sentinel, master).await {
            Ok((host, port)) => {
                tracing::debug!(
                    sentinel = %format!("{}:{}", sentinel.host, sentinel.port),
                    master,
                    resolved = %format!("{host}:{port}"),
                    "Resolved queue master"
                );
                return Ok((host, port));
            }
            Err(reason) => {
                attempts.push(format!("{}:{}: {}", sentinel.host, sentinel.port, reason));
            }
        }
    }
    Err(ConnectError::MasterResolution {
        master: master.to_string(),
        attempts: attempts.join("; "),
    })
}

async fn query_sentinel(sentinel: &SentinelAddr, master: &str) -> Result<(String, u16), String> {
    let url = format!("redis://{}:{}/", sentinel.host, sentinel.port);
    let client = redis::Client::open(url.as_str()).map_err(|e| e.to_string())?;
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| e.to_string())?;
    let reply: Option<(String, String)> = redis::cmd("SENTINEL")
        .arg("get-master-addr-by-name")
        .arg(master)
        .query_async(&mut conn)
        .await
        .map_err(|e| e.to_string())?;
    match reply {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| format!("Sentinel returned invalid master port '{port}'"))?;
            Ok((host, port))
        }
        None => Err(format!("Master '{master}' not known to this sentinel")),
    }
}

fn session_url(host: &str, port: u16, db: i64) -> String {
    format!("redis://{host}:{port}/{db}")
}

/// Failures establishing a queue session
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid queue address: {0}")]
    Address(String),

    #[error("Queue at {addr} unreachable: {reason}")]
    Unreachable { addr: String, reason: String },

    #[error("Could not resolve master '{master}' from any sentinel: {attempts}")]
    MasterResolution { master: String, attempts: String },
}
