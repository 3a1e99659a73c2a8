// Wire protocol DTOs and conversions for the public WebSocket.

use crate::domain::{Command, Direction, Occupant, View, ViewCell};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message the client sends: `{"action": "move", "data": 2}` or `{"action": "shoot"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    pub action: ClientAction,
    // Direction wire value; only meaningful for `move`.
    #[serde(default)]
    pub data: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientAction {
    Move,
    Shoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    MissingDirection,
    UnknownDirection(u8),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MissingDirection => write!(f, "move without a direction"),
            ProtocolError::UnknownDirection(v) => write!(f, "unknown direction value {v}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl TryFrom<ClientMessage> for Command {
    type Error = ProtocolError;

    fn try_from(msg: ClientMessage) -> Result<Self, Self::Error> {
        match msg.action {
            ClientAction::Shoot => Ok(Command::Shoot),
            ClientAction::Move => {
                let value = msg.data.ok_or(ProtocolError::MissingDirection)?;
                Direction::from_wire(value)
                    .map(Command::Move)
                    .ok_or(ProtocolError::UnknownDirection(value))
            }
        }
    }
}

/// Frame broadcast every tick: `{"state": [[cell, ...], ...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct StateMessage {
    pub state: Vec<Vec<CellDto>>,
}

impl From<&View> for StateMessage {
    fn from(view: &View) -> Self {
        Self {
            state: view
                .rows
                .iter()
                .map(|row| row.iter().map(CellDto::from).collect())
                .collect(),
        }
    }
}

/// `{"terrain": 0|1}` plus the occupant fields when something stands there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDto {
    pub terrain: u8,
    #[serde(flatten)]
    pub occupant: Option<OccupantDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OccupantDto {
    Player {
        #[serde(rename = "playerId")]
        player_id: u64,
        direction: u8,
    },
    // `playerId` is the shooter.
    Bullet {
        #[serde(rename = "playerId")]
        player_id: u64,
        direction: u8,
    },
}

impl From<&ViewCell> for CellDto {
    fn from(cell: &ViewCell) -> Self {
        Self {
            terrain: cell.terrain.wire_value(),
            occupant: cell.occupant.as_ref().map(OccupantDto::from),
        }
    }
}

impl From<&Occupant> for OccupantDto {
    fn from(occupant: &Occupant) -> Self {
        match *occupant {
            Occupant::Player {
                player_id,
                direction,
            } => OccupantDto::Player {
                player_id,
                direction: direction.wire_value(),
            },
            Occupant::Bullet {
                owner_id,
                direction,
            } => OccupantDto::Bullet {
                player_id: owner_id,
                direction: direction.wire_value(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Terrain;
    use serde_json::json;

    fn parse(text: &str) -> Result<Command, ProtocolError> {
        let msg: ClientMessage = serde_json::from_str(text).expect("valid json");
        Command::try_from(msg)
    }

    #[test]
    fn parses_client_actions() {
        assert_eq!(
            parse(r#"{"action":"move","data":3}"#),
            Ok(Command::Move(Direction::Up))
        );
        assert_eq!(parse(r#"{"action":"shoot"}"#), Ok(Command::Shoot));
        // Extra data on shoot is ignored.
        assert_eq!(parse(r#"{"action":"shoot","data":1}"#), Ok(Command::Shoot));
    }

    #[test]
    fn rejects_bad_moves() {
        assert_eq!(
            parse(r#"{"action":"move"}"#),
            Err(ProtocolError::MissingDirection)
        );
        assert_eq!(
            parse(r#"{"action":"move","data":9}"#),
            Err(ProtocolError::UnknownDirection(9))
        );
        assert!(serde_json::from_str::<ClientMessage>(r#"{"action":"jump"}"#).is_err());
    }

    #[test]
    fn serializes_cells_in_wire_shape() {
        let view = View {
            width: 3,
            height: 1,
            rows: vec![vec![
                ViewCell {
                    terrain: Terrain::Wall,
                    occupant: None,
                },
                ViewCell {
                    terrain: Terrain::Empty,
                    occupant: Some(Occupant::Player {
                        player_id: 4,
                        direction: Direction::Right,
                    }),
                },
                ViewCell {
                    terrain: Terrain::Empty,
                    occupant: Some(Occupant::Bullet {
                        owner_id: 4,
                        direction: Direction::Down,
                    }),
                },
            ]],
        };

        let value = serde_json::to_value(StateMessage::from(&view)).expect("serialize");
        assert_eq!(
            value,
            json!({
                "state": [[
                    {"terrain": 1},
                    {"terrain": 0, "type": "player", "playerId": 4, "direction": 2},
                    {"terrain": 0, "type": "bullet", "playerId": 4, "direction": 4}
                ]]
            })
        );
    }
}
