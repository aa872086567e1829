//! Line-oriented stimulus driver for the virtual host.
//!
//! Reads commands from an async reader (stdin in production) and turns
//! them into sensor stimuli:
//!
//! ```text
//! motion binary_sensor.motion_sensor_kitchen
//! state binary_sensor.motion_sensor_kitchen on
//! state sensor.humidity_bathroom 82
//! show
//! quit
//! ```

use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use automoli_adapter_virtual::VirtualHost;
use automoli_app::ports::EventPublisher;

const HELP: &str = "commands: motion <entity_id> | state <entity_id> <value> | show | help | quit";

/// One parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Emit a motion pulse.
    Motion(String),
    /// Force an entity into a state.
    State { entity_id: String, state: String },
    /// Print every entity.
    Show,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    Arguments {
        command: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let keyword = words.next().ok_or(ParseCommandError::Empty)?;
        let args: Vec<&str> = words.collect();
        match (keyword, args.as_slice()) {
            ("motion", [entity_id]) => Ok(Self::Motion((*entity_id).to_string())),
            ("motion", _) => Err(ParseCommandError::Arguments {
                command: "motion",
                expected: "an entity id",
            }),
            ("state" | "set", [entity_id, state @ ..]) if !state.is_empty() => Ok(Self::State {
                entity_id: (*entity_id).to_string(),
                state: state.join(" "),
            }),
            ("state" | "set", _) => Err(ParseCommandError::Arguments {
                command: "state",
                expected: "an entity id and a state",
            }),
            ("show", []) => Ok(Self::Show),
            ("help", _) => Ok(Self::Help),
            ("quit" | "exit", []) => Ok(Self::Quit),
            (other, _) => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

/// Feed commands from `input` into `host` until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only when reading `input` fails. Bad commands and
/// unknown entities are logged and skipped.
pub async fn run<P, R>(host: &VirtualHost<P>, input: R) -> std::io::Result<()>
where
    P: EventPublisher + Send + Sync,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                warn!(error = %err, "{HELP}");
                continue;
            }
        };
        let result = match command {
            Command::Motion(entity_id) => host.motion(&entity_id).await,
            Command::State { entity_id, state } => host.set_state(&entity_id, state).await,
            Command::Show => {
                for entity in host.entities() {
                    info!(entity = %entity.entity_id, state = %entity.state, attributes = ?entity.attributes, "entity");
                }
                Ok(())
            }
            Command::Help => {
                info!("{HELP}");
                Ok(())
            }
            Command::Quit => break,
        };
        if let Err(err) = result {
            warn!(error = %err, "command failed");
        }
    }
    Ok(())
}
