use crate::events::AppEvent;
use async_channel::Sender;
use pantry::control::{ControlCommand, SOCKET_PATH};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub fn parse_line(line: &str) -> Option<AppEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.parse::<ControlCommand>() {
        Ok(cmd) => Some(AppEvent::Control(cmd)),
        Err(_) => {
            log::warn!("Unknown control command '{}'", line);
            None
        }
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    // a previous run may have left its socket behind
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", SOCKET_PATH, e);
            return;
        }
    };
    log::debug!("Listening for commands on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        if let Some(event) = parse_line(&line)
                            && tx.send(event).await.is_err()
                        {
                            break;
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
