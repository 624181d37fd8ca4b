//! Drives a [`SpotMap`] from a live subscription, a one-second tick, and
//! user commands.
//!
//! [`mount`] subscribes to the store and spawns a single task that owns the
//! widget state. Every change is published as a fresh [`MapView`] on a
//! `watch` channel. Dropping or [unmounting](MountedWidget::unmount) the
//! handle stops the tick and releases the subscription.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use quietfinder_core::clock::Clock;
use quietfinder_core::error::CoreError;
use quietfinder_core::spot::{GeoPosition, NewSpot, SpotStatus};
use quietfinder_core::store::{SpotStore, SpotSubscription};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::view::MapView;
use crate::widget::{FormError, SpotMap};

/// How often the expiry filter re-evaluates.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1_000);

enum WidgetCommand {
    Click(GeoPosition),
    SetName(String),
    SetStatus(SpotStatus),
    Submit(oneshot::Sender<Result<NewSpot, FormError>>),
    Cancel,
    DismissBanner,
    WriteFailed(String),
}

/// Handle to a mounted widget.
#[derive(Debug)]
pub struct MountedWidget {
    commands: mpsc::UnboundedSender<WidgetCommand>,
    view: watch::Receiver<MapView>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// Subscribe to `store` and start the widget loop.
///
/// Fails only if the initial subscription cannot be created.
pub async fn mount(
    store: Arc<dyn SpotStore>,
    clock: Arc<dyn Clock>,
) -> Result<MountedWidget, CoreError> {
    let subscription = store.subscribe().await?;
    let map = SpotMap::new(clock.now());

    let (view_tx, view_rx) = watch::channel(map.view());
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run(
        map,
        WidgetIo {
            store,
            clock,
            subscription,
            commands: cmd_rx,
            writes: cmd_tx.clone(),
            view: view_tx,
        },
        cancel.clone(),
    ));
    tracing::debug!("Spot map mounted");

    Ok(MountedWidget {
        commands: cmd_tx,
        view: view_rx,
        cancel,
        task: Some(task),
    })
}

struct WidgetIo {
    store: Arc<dyn SpotStore>,
    clock: Arc<dyn Clock>,
    subscription: SpotSubscription,
    commands: mpsc::UnboundedReceiver<WidgetCommand>,
    writes: mpsc::UnboundedSender<WidgetCommand>,
    view: watch::Sender<MapView>,
}

async fn run(mut map: SpotMap, mut io: WidgetIo, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut subscription_open = true;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = io.subscription.next(), if subscription_open => match event {
                Some(event) => map.apply(event),
                None => {
                    tracing::warn!("Spot subscription ended");
                    subscription_open = false;
                }
            },
            Some(command) = io.commands.recv() => handle_command(&mut map, &io, command),
            _ = ticker.tick() => map.tick(io.clock.now()),
        }

        io.view.send_if_modified(|current| {
            let next = map.view();
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    // Dropping the subscription here releases the store feed.
    tracing::debug!("Spot map unmounted");
}

fn handle_command(map: &mut SpotMap, io: &WidgetIo, command: WidgetCommand) {
    match command {
        WidgetCommand::Click(position) => map.click(position),
        WidgetCommand::SetName(name) => map.set_name(name),
        WidgetCommand::SetStatus(status) => map.set_status(status),
        WidgetCommand::Submit(reply) => {
            let result = map.submit(io.clock.now());
            if let Ok(spot) = &result {
                spawn_write(Arc::clone(&io.store), io.writes.clone(), spot.clone());
            }
            let _ = reply.send(result);
        }
        WidgetCommand::Cancel => map.cancel(),
        WidgetCommand::DismissBanner => map.dismiss_banner(),
        WidgetCommand::WriteFailed(reason) => map.write_failed(reason),
    }
}

/// Fire-and-forget append. The new spot shows up through the subscription;
/// a failure is logged and raised as a banner, never retried.
fn spawn_write(
    store: Arc<dyn SpotStore>,
    writes: mpsc::UnboundedSender<WidgetCommand>,
    spot: NewSpot,
) {
    tokio::spawn(async move {
        match store.add(spot).await {
            Ok(spot) => tracing::info!(spot_id = %spot.id, name = %spot.name, "Spot posted"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to post spot");
                let _ = writes.send(WidgetCommand::WriteFailed(e.to_string()));
            }
        }
    });
}

impl MountedWidget {
    fn send(&self, command: WidgetCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Command sent to unmounted spot map");
        }
    }

    pub fn click(&self, position: GeoPosition) {
        self.send(WidgetCommand::Click(position));
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.send(WidgetCommand::SetName(name.into()));
    }

    pub fn set_status(&self, status: SpotStatus) {
        self.send(WidgetCommand::SetStatus(status));
    }

    /// Submit the pending pin.
    ///
    /// Returns as soon as the form is validated; the write itself happens in
    /// the background.
    pub async fn submit(&self) -> Result<NewSpot, FormError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(WidgetCommand::Submit(reply_tx))
            .map_err(|_| FormError::Unmounted)?;
        reply_rx.await.map_err(|_| FormError::Unmounted)?
    }

    pub fn cancel_pending(&self) {
        self.send(WidgetCommand::Cancel);
    }

    pub fn dismiss_banner(&self) {
        self.send(WidgetCommand::DismissBanner);
    }

    /// The most recently published view.
    pub fn view(&self) -> MapView {
        self.view.borrow().clone()
    }

    /// A receiver that is notified on every view change.
    pub fn watch(&self) -> watch::Receiver<MapView> {
        self.view.clone()
    }

    /// Stop the widget and wait for its task to finish.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Spot map task failed");
            }
        }
    }
}

impl Drop for MountedWidget {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
