//! WebSocket authoring loop. Each client message is parsed as JSON and applied
//! to the connection's authoring session. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::authoring::AuthoringSession;
use crate::blocks::BlockType;
use crate::error::{ApiError, ApiResult};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "authoring", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "authoring", "WebSocket connected");
  let mut session: Option<AuthoringSession> = None;
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "authoring", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &mut session, &state)
              .await
              .unwrap_or_else(|e| ServerWsMessage::Error { code: e.code(), message: e.to_string() })
          }
          Err(e) => ServerWsMessage::Error { code: "BAD_JSON", message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "code": "SERIALIZATION_ERROR", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "authoring", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  if let Some(s) = &session {
    if s.is_dirty() {
      info!(target: "authoring", lab = %s.lab_slug, day = s.day_number, "WebSocket closed with unsaved changes");
    }
  }
  info!(target: "authoring", "WebSocket disconnected");
}

/// Apply one client message. Everything except `ping` and `open_day` needs an open day.
pub async fn handle_client_ws(
  msg: ClientWsMessage,
  session: &mut Option<AuthoringSession>,
  state: &AppState,
) -> ApiResult<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::OpenDay { lab, day } => {
      let opened = session.insert(AuthoringSession::open(state, &lab, day).await?);
      Ok(ServerWsMessage::Session { session: opened.snapshot() })
    }

    ClientWsMessage::Save => {
      let s = session.as_mut().ok_or(ApiError::NoOpenDay)?;
      let day = s.save(state).await?;
      info!(target: "authoring", lab = %s.lab_slug, day = s.day_number, revision = day.revision, "WS save");
      Ok(ServerWsMessage::Saved { day, session: s.snapshot() })
    }

    edit => {
      let s = session.as_mut().ok_or(ApiError::NoOpenDay)?;
      apply_edit(s, edit)?;
      Ok(ServerWsMessage::Session { session: s.snapshot() })
    }
  }
}

fn apply_edit(s: &mut AuthoringSession, msg: ClientWsMessage) -> ApiResult<()> {
  match msg {
    ClientWsMessage::AddBlock { block_type, index } => {
      let kind = BlockType::from_wire(&block_type)
        .ok_or_else(|| ApiError::InvalidInput(format!("unknown block type: {block_type}")))?;
      s.add_block(kind, index);
    }
    ClientWsMessage::UpdateBlock { block } => { s.update_block(&block)?; }
    ClientWsMessage::RemoveBlock { block_id } => { s.remove_block(&block_id)?; }
    ClientWsMessage::MoveBlock { block_id, to } => { s.move_block(&block_id, to)?; }
    ClientWsMessage::SetPrimary { block_id } => { s.set_primary(&block_id)?; }
    ClientWsMessage::SetPrompt { text } => { s.set_prompt(&text); }
    ClientWsMessage::Undo => { s.undo(); }
    ClientWsMessage::Redo => { s.redo(); }
    ClientWsMessage::Ping | ClientWsMessage::OpenDay { .. } | ClientWsMessage::Save => {}
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::SEED_LAB_SLUG;

  fn msg(json: &str) -> ClientWsMessage {
    serde_json::from_str(json).unwrap()
  }

  #[tokio::test]
  async fn edits_need_an_open_day() {
    let state = AppState::from_config(None);
    let mut session = None;
    let r = handle_client_ws(msg(r#"{"type":"undo"}"#), &mut session, &state).await;
    assert!(matches!(r, Err(ApiError::NoOpenDay)));
    assert!(matches!(handle_client_ws(msg(r#"{"type":"ping"}"#), &mut session, &state).await, Ok(ServerWsMessage::Pong)));
  }

  #[tokio::test]
  async fn open_edit_save_flow() {
    let state = AppState::from_config(None);
    let mut session = None;
    let open = format!(r#"{{"type":"open_day","lab":"{SEED_LAB_SLUG}","day":2}}"#);
    assert!(matches!(handle_client_ws(msg(&open), &mut session, &state).await, Ok(ServerWsMessage::Session { .. })));

    let added = handle_client_ws(msg(r#"{"type":"add_block","blockType":"video","index":0}"#), &mut session, &state).await.unwrap();
    let ServerWsMessage::Session { session: snap } = added else { panic!("expected session") };
    assert!(snap.dirty && snap.can_undo);
    let video_id = snap.blocks[0].id.clone();

    let update = serde_json::json!({
      "type": "update_block",
      "block": { "id": video_id, "type": "video", "url": "https://youtu.be/dQw4w9WgXcQ" }
    })
    .to_string();
    handle_client_ws(msg(&update), &mut session, &state).await.unwrap();
    let primary = serde_json::json!({ "type": "set_primary", "blockId": video_id }).to_string();
    handle_client_ws(msg(&primary), &mut session, &state).await.unwrap();

    let saved = handle_client_ws(msg(r#"{"type":"save"}"#), &mut session, &state).await.unwrap();
    let ServerWsMessage::Saved { day, session: snap } = saved else { panic!("expected saved") };
    assert!(!snap.dirty);
    assert_eq!(day.video_url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
    assert!(day.primary.unwrap().gating);

    let bad = handle_client_ws(msg(r#"{"type":"add_block","blockType":"poll"}"#), &mut session, &state).await;
    assert!(matches!(bad, Err(ApiError::InvalidInput(_))));
  }
}
