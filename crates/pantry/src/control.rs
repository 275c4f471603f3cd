use std::io::Write;
use std::os::unix::net::UnixStream;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

pub const SOCKET_PATH: &str = "/tmp/handsort.sock";

/// One line on the control socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ControlCommand {
    Start,
    Pause,
    Resume,
    Stop,
    Quit,
}

pub fn send(cmd: ControlCommand) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to handsort at {}: {}. Is the game running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
