//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blocks::resolve::{SelectionReason, VideoRef};
use crate::blocks::schema::{BlockType, DayBlock};
use crate::blocks::PrimaryResource;

/// Messages the authoring client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    OpenDay {
        lab: String,
        day: u32,
    },
    AddBlock {
        #[serde(rename = "blockType")]
        block_type: String,
        #[serde(default)]
        index: Option<usize>,
    },
    UpdateBlock {
        block: Value,
    },
    RemoveBlock {
        #[serde(rename = "blockId")]
        block_id: String,
    },
    MoveBlock {
        #[serde(rename = "blockId")]
        block_id: String,
        to: usize,
    },
    SetPrimary {
        #[serde(rename = "blockId")]
        block_id: String,
    },
    SetPrompt {
        text: String,
    },
    Undo,
    Redo,
    Save,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionOut,
    },
    Saved {
        day: DayOut,
        session: SessionOut,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

/// Current state of an authoring session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub lab_slug: String,
    pub day_number: u32,
    pub title: String,
    pub blocks: Vec<DayBlock>,
    pub discussion_prompt: String,
    pub can_undo: bool,
    pub can_redo: bool,
    pub dirty: bool,
}

/// Which block drives the day's gating and progress UI.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryOut {
    pub block_id: String,
    pub index: usize,
    pub block_type: BlockType,
    pub reason: SelectionReason,
    pub gating: bool,
    pub video: Option<VideoRef>,
}

pub fn to_primary_out(p: &PrimaryResource<'_>) -> PrimaryOut {
    PrimaryOut {
        block_id: p.block.id.clone(),
        index: p.index,
        block_type: p.block.block_type(),
        reason: p.reason,
        gating: p.gating,
        video: p.video.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabOut {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub day_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummaryOut {
    pub day_number: u32,
    pub title: String,
    pub summary: String,
    pub block_count: usize,
    pub primary_type: Option<BlockType>,
    pub gating: bool,
}

/// Learner view of a day (also returned after a save).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOut {
    pub lab_slug: String,
    pub day_number: u32,
    pub title: String,
    pub video_url: Option<String>,
    pub revision: u64,
    pub blocks: Vec<DayBlock>,
    pub discussion_prompt: String,
    pub has_custom_prompt: bool,
    pub primary: Option<PrimaryOut>,
}

/// Admin save. Blocks arrive as loose JSON and go through the same normalizer as stored content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDayIn {
    #[serde(default)]
    pub title: Option<String>,
    pub blocks: Vec<Value>,
    #[serde(default)]
    pub discussion_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockIn {
    #[serde(rename = "type")]
    pub block_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseIn {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOut {
    pub blocks: Vec<DayBlock>,
    pub discussion_prompt: String,
    pub primary: Option<PrimaryOut>,
    pub summary: String,
}
