//! Discussion prompt lookup without rebuilding the block list.

use serde_json::Value;

/// Custom discussion prompt stored next to the blocks, trimmed. Empty when absent or unreadable.
pub fn extract_discussion_prompt(content: Option<&str>) -> String {
  content
    .and_then(|c| serde_json::from_str::<Value>(c.trim()).ok())
    .as_ref()
    .and_then(|doc| doc.get("discussionPrompt"))
    .and_then(Value::as_str)
    .map(|p| p.trim().to_string())
    .unwrap_or_default()
}

/// Prompt shown in the forum: the custom one, or a generic question about the day.
pub fn discussion_prompt_or_default(content: Option<&str>, day_title: &str) -> String {
  let custom = extract_discussion_prompt(content);
  if !custom.is_empty() {
    return custom;
  }
  let title = day_title.trim();
  if title.is_empty() {
    "¿Qué aprendiste hoy? Comparte tu avance con el grupo.".to_string()
  } else {
    format!("¿Qué aprendiste en \"{title}\"? Comparte tu avance con el grupo.")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_prompt_from_payload() {
    let c = r#"{"version":2,"blocks":[],"discussionPrompt":"  Sube tu captura  "}"#;
    assert_eq!(extract_discussion_prompt(Some(c)), "Sube tu captura");
  }

  #[test]
  fn never_fails() {
    assert_eq!(extract_discussion_prompt(None), "");
    assert_eq!(extract_discussion_prompt(Some("{broken")), "");
    assert_eq!(extract_discussion_prompt(Some("plain legacy text")), "");
    assert_eq!(extract_discussion_prompt(Some("[1,2]")), "");
    assert_eq!(extract_discussion_prompt(Some(r#"{"discussionPrompt":7}"#)), "");
  }

  #[test]
  fn default_mentions_day_title() {
    let p = discussion_prompt_or_default(Some(r#"{"version":2,"blocks":[]}"#), "Día 1: Setup");
    assert!(p.contains("Día 1: Setup"));
    assert_eq!(discussion_prompt_or_default(Some(r#"{"discussionPrompt":"x"}"#), "ignored"), "x");
  }
}
