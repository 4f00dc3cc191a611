//! Built-in demo lab so the service is useful without any config.
//!
//! The days deliberately cover every storage generation: legacy text + video
//! column, a bare JSON array, and the current versioned payload.

use crate::domain::{Day, Lab};

pub const SEED_LAB_SLUG: &str = "rust-30";

pub fn seed_lab() -> (Lab, Vec<Day>) {
  let lab = Lab {
    slug: SEED_LAB_SLUG.into(),
    title: "Rust en 30 días".into(),
    description: "Un reto diario para aprender Rust construyendo.".into(),
  };
  let day = |day_number: u32, title: &str, video_url: Option<&str>, content: &str| Day {
    lab_slug: SEED_LAB_SLUG.into(),
    day_number,
    title: title.into(),
    video_url: video_url.map(str::to_string),
    content: Some(content.to_string()),
    revision: 0,
  };
  let days = vec![
    day(
      1,
      "Instalación",
      Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
      "Instala rustup y verifica con `cargo --version`.\n\nCuando termines, comparte tu salida en el foro.",
    ),
    day(
      2,
      "Variables y tipos",
      None,
      r#"[{"id":"d2-text","type":"text","content":"<p>Todo valor en Rust tiene un tipo.</p>"},{"id":"d2-check","type":"checklist","items":["Declara una variable mutable","Haz shadowing de otra"]}]"#,
    ),
    day(
      3,
      "Ownership",
      None,
      r#"{"version":2,"blocks":[{"id":"d3-video","type":"video","group":"resource","role":"primary","url":"https://youtu.be/dQw4w9WgXcQ","caption":"Ownership en 10 minutos"},{"id":"d3-notes","type":"file","group":"resource","role":"support","resourceSlot":"download","url":"https://cdn.example.com/ownership.pdf","caption":"Apuntes"},{"id":"d3-quiz","type":"quiz","group":"challenge","role":"support","questions":[{"id":"q1","prompt":"¿Qué pasa al asignar un String a otra variable?","options":["Se copia","Se mueve"],"correctIndex":1}]}],"discussionPrompt":"¿Qué error del borrow checker te costó más entender?"}"#,
    ),
    day(
      4,
      "Reto: CLI de tareas",
      None,
      r#"{"version":2,"blocks":[{"id":"d4-steps","type":"challenge_steps","group":"challenge","steps":["Crea el proyecto con cargo new","Parsea argumentos","Guarda las tareas en un archivo"]}]}"#,
    ),
  ];
  (lab, days)
}
