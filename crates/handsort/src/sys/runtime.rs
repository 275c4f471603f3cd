use crate::events::AppEvent;
use crate::sys::narrator::Narration;
use async_channel::{Receiver, Sender};
use std::thread;
use tokio::runtime::Runtime;

pub fn start_background_services(tx: Sender<AppEvent>, narrations: Receiver<Narration>) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            tokio::spawn(async move {
                crate::sys::narrator::run_narrator(narrations).await;
            });

            std::future::pending::<()>().await;
        });
    });
}
