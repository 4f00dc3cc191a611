//! Small text helpers shared by the block model, listings, and logging.

use crate::blocks::schema::{BlockBody, DayBlock};

/// Remove tags and decode the handful of entities rich-text editors emit.
/// Whitespace is collapsed to single spaces and the result trimmed.
pub fn strip_html(html: &str) -> String {
  let mut text = String::with_capacity(html.len());
  let mut in_tag = false;
  for ch in html.chars() {
    match ch {
      '<' => {
        in_tag = true;
        // Tags separate words ("<p>a</p><p>b</p>" -> "a b").
        text.push(' ');
      }
      '>' if in_tag => in_tag = false,
      _ if !in_tag => text.push(ch),
      _ => {}
    }
  }
  let decoded = decode_entities(&text);
  decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
  s.replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&#x27;", "'")
    .replace("&amp;", "&")
}

pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Heuristic: does this string already carry markup?
pub fn looks_like_html(s: &str) -> bool {
  let t = s.trim_start();
  t.starts_with('<') && t.contains('>')
}

/// Legacy plain-text content -> rich-text HTML.
/// Blank lines split paragraphs; single newlines become `<br>`. Markup is kept verbatim.
pub fn plain_text_to_html(text: &str) -> String {
  let text = text.trim();
  if looks_like_html(text) {
    return text.to_string();
  }
  let normalized = text.replace("\r\n", "\n");
  normalized
    .split("\n\n")
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .map(|p| {
      let lines: Vec<String> = p.lines().map(|l| escape_html(l.trim())).collect();
      format!("<p>{}</p>", lines.join("<br>"))
    })
    .collect()
}

/// Truncate to at most `max` chars on a char boundary, appending `…` when cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    return s.to_string();
  }
  let cut: String = s.chars().take(max).collect();
  // Prefer ending on a word boundary when one is reasonably close.
  let cut = match cut.rfind(' ') {
    Some(i) if i >= cut.len() * 2 / 3 => cut[..i].to_string(),
    _ => cut,
  };
  format!("{}…", cut.trim_end())
}

/// One-line summary of a day for listings and the forum.
/// First non-empty text block, else the first block title or caption.
pub fn summarize_blocks(blocks: &[DayBlock], max_chars: usize) -> String {
  let from_text = blocks.iter().find_map(|b| match &b.body {
    BlockBody::Text { html } => Some(strip_html(html)).filter(|t| !t.is_empty()),
    _ => None,
  });
  let summary = from_text.or_else(|| blocks.iter().find_map(|b| b.label().map(str::to_string)));
  summary.map(|s| truncate_chars(&s, max_chars)).unwrap_or_default()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge stored payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
