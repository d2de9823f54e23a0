use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

/// Fixed production workflow, in the order an order walks through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "Medição técnica")]
    TechnicalMeasurement,
    #[serde(rename = "Projeto técnico")]
    TechnicalDesign,
    #[serde(rename = "Produção")]
    Manufacturing,
    #[serde(rename = "Expedição")]
    Dispatch,
    #[serde(rename = "Transporte")]
    Transport,
    #[serde(rename = "Montagem")]
    Assembly,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::TechnicalMeasurement,
        Stage::TechnicalDesign,
        Stage::Manufacturing,
        Stage::Dispatch,
        Stage::Transport,
        Stage::Assembly,
    ];

    pub fn first() -> Stage {
        Stage::TechnicalMeasurement
    }

    /// Label stored in `pedidos.etapa_atual` and `producao_etapas.etapa`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TechnicalMeasurement => "Medição técnica",
            Stage::TechnicalDesign => "Projeto técnico",
            Stage::Manufacturing => "Produção",
            Stage::Dispatch => "Expedição",
            Stage::Transport => "Transporte",
            Stage::Assembly => "Montagem",
        }
    }

    /// Logistics stages are tracked but get no Kanban column.
    pub fn on_board(&self) -> bool {
        match self {
            Stage::Dispatch | Stage::Transport => false,
            Stage::TechnicalMeasurement
            | Stage::TechnicalDesign
            | Stage::Manufacturing
            | Stage::Assembly => true,
        }
    }

    pub fn board_stages() -> Vec<Stage> {
        Stage::ALL.into_iter().filter(Stage::on_board).collect()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| AppError::InvalidArgument(format!("Etapa inválida: {}", wanted)))
    }
}

/// Lifecycle of an order inside its current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StageStatus {
    #[serde(rename = "A fazer")]
    ToDo,
    #[serde(rename = "Em andamento")]
    InProgress,
    #[serde(rename = "Pausado")]
    Paused,
    #[serde(rename = "Concluído")]
    Done,
}

impl StageStatus {
    pub const ALL: [StageStatus; 4] = [
        StageStatus::ToDo,
        StageStatus::InProgress,
        StageStatus::Paused,
        StageStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::ToDo => "A fazer",
            StageStatus::InProgress => "Em andamento",
            StageStatus::Paused => "Pausado",
            StageStatus::Done => "Concluído",
        }
    }

    /// CSS modifier for the Kanban card badge.
    pub fn badge_class(&self) -> &'static str {
        match self {
            StageStatus::Done => "ok",
            StageStatus::InProgress => "warn",
            StageStatus::ToDo | StageStatus::Paused => "",
        }
    }
}

impl Default for StageStatus {
    fn default() -> Self {
        StageStatus::ToDo
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StageStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| AppError::InvalidArgument(format!("Status inválido: {}", wanted)))
    }
}

/// Raw `producao_etapas` row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct TransitionRow {
    pub id: i32,
    pub order_id: i32,
    pub stage: String,
    pub status: Option<String>,
    pub responsible_id: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One stay of an order in one stage. Open while `ended_at` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTransition {
    pub id: i32,
    pub order_id: i32,
    pub stage: Stage,
    pub status: StageStatus,
    pub responsible_id: Option<i32>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub note: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl StageTransition {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

impl TryFrom<TransitionRow> for StageTransition {
    type Error = AppError;

    fn try_from(row: TransitionRow) -> Result<Self, Self::Error> {
        let stage = row.stage.parse::<Stage>()?;
        // Legacy rows may carry an empty status; the column default is "A fazer".
        let status = match row.status.as_deref().map(str::trim) {
            None | Some("") => StageStatus::default(),
            Some(raw) => raw.parse::<StageStatus>()?,
        };

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            stage,
            status,
            responsible_id: row.responsible_id,
            started_at: row.started_at,
            ended_at: row.ended_at,
            note: row.note.unwrap_or_default(),
            created_at: row.created_at,
        })
    }
}

/// Where an order currently sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StagePosition {
    pub stage: Stage,
    pub status: StageStatus,
}

/// A validated request to move an order on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub order_id: i32,
    pub stage: Stage,
    pub status: StageStatus,
    pub responsible_id: Option<i32>,
    pub note: String,
}

impl MoveRequest {
    /// Builds a request from the names submitted by the board.
    pub fn parse(
        order_id: i32,
        stage: &str,
        status: &str,
        responsible_id: Option<i32>,
        note: Option<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            order_id,
            stage: stage.parse()?,
            status: status.parse()?,
            responsible_id,
            note: note.map(|n| n.trim().to_string()).unwrap_or_default(),
        })
    }

    pub fn target(&self) -> StagePosition {
        StagePosition {
            stage: self.stage,
            status: self.status,
        }
    }

    pub fn changes(&self, current: &StagePosition) -> bool {
        self.target() != *current
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved {
        transition_id: i32,
        closed_transitions: u64,
        event_id: Option<i32>,
    },
    Unchanged,
}

impl MoveOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }

    pub fn message(&self) -> String {
        match self {
            MoveOutcome::Moved {
                event_id: Some(event_id),
                ..
            } => format!("Movido. Evento criado ID {}.", event_id),
            MoveOutcome::Moved { event_id: None, .. } => {
                "Movido. Mas não consegui criar evento.".to_string()
            }
            MoveOutcome::Unchanged => "Nada mudou. Não registrei evento.".to_string(),
        }
    }
}
