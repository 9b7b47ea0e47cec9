//! Single-owner store service.
//!
//! The store lives inside one tokio task. Callers talk to it through a
//! [`StoreHandle`]; every request is answered in arrival order, and auto-save
//! ticks are handled by the same task, so nothing else ever touches the
//! inventory. Anything that writes the data file runs on the blocking pool.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use pharmstock_core::ItemId;
use pharmstock_inventory::{InventoryItem, InventoryStats, ItemDraft};

use crate::error::StoreError;
use crate::repository::InventoryRepository;
use crate::store::InventoryStore;

const REQUEST_BUFFER: usize = 64;

/// Answered from memory.
enum Query {
    Items {
        reply: oneshot::Sender<Vec<InventoryItem>>,
    },
    Get {
        id: ItemId,
        reply: oneshot::Sender<Option<InventoryItem>>,
    },
    Filter {
        query: String,
        reply: oneshot::Sender<Vec<InventoryItem>>,
    },
    LowStock {
        threshold: Option<u32>,
        reply: oneshot::Sender<Vec<InventoryItem>>,
    },
    Statistics {
        reply: oneshot::Sender<InventoryStats>,
    },
    Threshold {
        reply: oneshot::Sender<u32>,
    },
    SetThreshold {
        threshold: u32,
        reply: oneshot::Sender<()>,
    },
}

/// Touches storage.
enum Write {
    AddItem {
        draft: ItemDraft,
        reply: oneshot::Sender<Result<InventoryItem, StoreError>>,
    },
    UpdateQuantity {
        id: ItemId,
        quantity: u32,
        reply: oneshot::Sender<Result<InventoryItem, StoreError>>,
    },
    Save {
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
}

enum Message {
    Query(Query),
    Write(Write),
    Shutdown {
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
}

impl From<Query> for Message {
    fn from(query: Query) -> Self {
        Message::Query(query)
    }
}

impl From<Write> for Message {
    fn from(write: Write) -> Self {
        Message::Write(write)
    }
}

/// Spawns and runs the store task.
pub struct StoreService;

impl StoreService {
    /// Move `store` into a new task and return a handle to it.
    ///
    /// With `autosave` set, the task saves pending changes once per period
    /// (missed ticks are skipped). Auto-save failures are logged, never
    /// surfaced to callers. Must be called from within a tokio runtime.
    pub fn spawn<R>(
        store: InventoryStore<R>,
        autosave: Option<Duration>,
    ) -> (StoreHandle, JoinHandle<()>)
    where
        R: InventoryRepository + 'static,
    {
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        let join = tokio::spawn(run(store, rx, autosave));
        (StoreHandle { tx }, join)
    }
}

async fn run<R: InventoryRepository + 'static>(
    mut store: InventoryStore<R>,
    mut messages: mpsc::Receiver<Message>,
    autosave: Option<Duration>,
) {
    let mut ticker = autosave.map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    tracing::info!(autosave = ?autosave, "inventory store service started");

    loop {
        tokio::select! {
            message = messages.recv() => match message {
                Some(Message::Query(query)) => answer(&mut store, query),
                Some(Message::Write(write)) => {
                    store = match on_blocking_pool(store, move |s| apply(s, write)).await {
                        Ok((s, ())) => s,
                        Err(err) => return lost(err),
                    };
                }
                Some(Message::Shutdown { reply }) => {
                    let (_, result) = match on_blocking_pool(store, InventoryStore::save_if_dirty).await {
                        Ok(done) => done,
                        Err(err) => return lost(err),
                    };
                    let _ = reply.send(result.map(|_| ()).map_err(StoreError::from));
                    break;
                }
                None => {
                    // Every handle is gone; persist what is pending.
                    match on_blocking_pool(store, InventoryStore::save_if_dirty).await {
                        Ok((_, Err(err))) => {
                            tracing::warn!(error = %err, "final save failed after all handles dropped");
                        }
                        Ok(_) => {}
                        Err(err) => return lost(err),
                    }
                    break;
                }
            },
            _ = next_tick(&mut ticker) => {
                tracing::debug!(dirty = store.is_dirty(), "auto-save tick");
                store = match on_blocking_pool(store, InventoryStore::save_if_dirty).await {
                    Ok((s, Err(err))) => {
                        tracing::warn!(error = %err, "auto-save failed; will retry on the next tick");
                        s
                    }
                    Ok((s, Ok(_))) => s,
                    Err(err) => return lost(err),
                };
            }
        }
    }

    tracing::info!("inventory store service stopped");
}

/// Hand the store to the blocking pool for `f` and take it back afterwards.
async fn on_blocking_pool<R, T, F>(
    mut store: InventoryStore<R>,
    f: F,
) -> Result<(InventoryStore<R>, T), JoinError>
where
    R: InventoryRepository + 'static,
    T: Send + 'static,
    F: FnOnce(&mut InventoryStore<R>) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let out = f(&mut store);
        (store, out)
    })
    .await
}

fn lost(err: JoinError) {
    tracing::error!(error = %err, "inventory store task panicked; store is gone");
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn answer<R: InventoryRepository>(store: &mut InventoryStore<R>, query: Query) {
    // A dropped reply receiver means the caller gave up; nothing to do.
    match query {
        Query::Items { reply } => {
            let _ = reply.send(store.items().to_vec());
        }
        Query::Get { id, reply } => {
            let _ = reply.send(store.get(&id).cloned());
        }
        Query::Filter { query, reply } => {
            let _ = reply.send(store.filter(&query).into_iter().cloned().collect());
        }
        Query::LowStock { threshold, reply } => {
            let items = match threshold {
                Some(t) => store.low_stock_below(t),
                None => store.low_stock(),
            };
            let _ = reply.send(items.into_iter().cloned().collect());
        }
        Query::Statistics { reply } => {
            let _ = reply.send(store.statistics());
        }
        Query::Threshold { reply } => {
            let _ = reply.send(store.low_stock_threshold());
        }
        Query::SetThreshold { threshold, reply } => {
            store.set_low_stock_threshold(threshold);
            let _ = reply.send(());
        }
    }
}

fn apply<R: InventoryRepository>(store: &mut InventoryStore<R>, write: Write) {
    match write {
        Write::AddItem { draft, reply } => {
            let _ = reply.send(store.add_item(&draft));
        }
        Write::UpdateQuantity { id, quantity, reply } => {
            let _ = reply.send(store.update_quantity(&id, quantity));
        }
        Write::Save { reply } => {
            let _ = reply.send(store.save().map_err(StoreError::from));
        }
    }
}

/// Cloneable handle to a running store service.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<Message>,
}

impl StoreHandle {
    async fn call<T, M: Into<Message>>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> M,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply).into())
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)
    }

    /// Every item, in insertion order.
    pub async fn items(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.call(|reply| Query::Items { reply }).await
    }

    pub async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        self.call(|reply| Query::Get { id, reply }).await
    }

    pub async fn filter(&self, query: impl Into<String>) -> Result<Vec<InventoryItem>, StoreError> {
        let query = query.into();
        self.call(|reply| Query::Filter { query, reply }).await
    }

    /// Items below the configured threshold.
    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, StoreError> {
        self.call(|reply| Query::LowStock {
            threshold: None,
            reply,
        })
        .await
    }

    pub async fn low_stock_below(&self, threshold: u32) -> Result<Vec<InventoryItem>, StoreError> {
        self.call(|reply| Query::LowStock {
            threshold: Some(threshold),
            reply,
        })
        .await
    }

    pub async fn statistics(&self) -> Result<InventoryStats, StoreError> {
        self.call(|reply| Query::Statistics { reply }).await
    }

    pub async fn low_stock_threshold(&self) -> Result<u32, StoreError> {
        self.call(|reply| Query::Threshold { reply }).await
    }

    pub async fn set_low_stock_threshold(&self, threshold: u32) -> Result<(), StoreError> {
        self.call(|reply| Query::SetThreshold { threshold, reply })
            .await
    }

    pub async fn add_item(&self, draft: ItemDraft) -> Result<InventoryItem, StoreError> {
        self.call(|reply| Write::AddItem { draft, reply }).await?
    }

    pub async fn update_quantity(
        &self,
        id: ItemId,
        quantity: u32,
    ) -> Result<InventoryItem, StoreError> {
        self.call(|reply| Write::UpdateQuantity {
            id,
            quantity,
            reply,
        })
        .await?
    }

    /// Write the inventory out now, whether or not anything changed.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.call(|reply| Write::Save { reply }).await?
    }

    /// Save pending changes, if any, and stop the service.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.call(|reply| Message::Shutdown { reply }).await?
    }
}
