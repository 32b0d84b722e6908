use crate::events::AppEvent;
use async_channel::Sender;
use relay::RelaySettings;
use std::thread;
use tokio::runtime::Runtime;

/// Runs the config watcher, and the relay when configured, on a tokio
/// runtime off the GTK thread.
pub fn start_background_services(tx: Sender<AppEvent>, relay_settings: Option<RelaySettings>) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            tokio::spawn(crate::config::run_async_watcher(tx));

            if let Some(settings) = relay_settings {
                tokio::spawn(async move {
                    if let Err(e) = relay::serve(&settings, std::future::pending()).await {
                        log::error!("Relay failed: {}", e);
                    }
                });
            }

            std::future::pending::<()>().await;
        });
    });
}
