//! Application state: in-memory lab/day stores and service settings.
//!
//! This module owns:
//!   - labs by slug
//!   - days per lab, ordered by day number
//!   - settings taken from TOML (or defaults)
//!
//! The day store stands in for the hosted relational backend: it keeps the raw
//! `content` / `video_url` columns exactly as written and knows nothing about
//! blocks. Writes are last-write-wins per day; there is no conflict detection.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::{load_labs_config_from_env, LabsConfig};
use crate::domain::{Day, Lab};
use crate::seeds::seed_lab;

#[derive(Clone, Debug)]
pub struct Settings {
    pub history_limit: usize,
    pub summary_max_chars: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub labs: Arc<RwLock<BTreeMap<String, Lab>>>,
    pub days: Arc<RwLock<HashMap<String, BTreeMap<u32, Day>>>>,
    pub settings: Settings,
}

/// Fields written by a content save.
#[derive(Clone, Debug)]
pub struct DayWrite {
    pub title: Option<String>,
    pub content: String,
    pub video_url: Option<String>,
}

impl AppState {
    /// Build state from env: load config, then fill stores from the config bank and seeds.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_labs_config_from_env())
    }

    pub fn from_config(cfg_opt: Option<LabsConfig>) -> Self {
        let cfg = cfg_opt.unwrap_or_default();
        let settings = Settings {
            history_limit: cfg.authoring.history_limit,
            summary_max_chars: cfg.summary.max_chars,
        };

        let mut labs = BTreeMap::<String, Lab>::new();
        let mut days = HashMap::<String, BTreeMap<u32, Day>>::new();

        for lc in &cfg.labs {
            let slug = lc.slug.trim().to_string();
            if slug.is_empty() {
                warn!(target: "labs_backend", title = %lc.title, "Skipping config lab: empty slug.");
                continue;
            }
            let by_number = days.entry(slug.clone()).or_default();
            for dc in &lc.days {
                if by_number.contains_key(&dc.day_number) {
                    warn!(target: "labs_backend", %slug, day = dc.day_number, "Duplicate day number in config; keeping the first.");
                    continue;
                }
                by_number.insert(
                    dc.day_number,
                    Day {
                        lab_slug: slug.clone(),
                        day_number: dc.day_number,
                        title: dc.title.clone(),
                        video_url: dc.video_url.clone(),
                        content: dc.content.clone(),
                        revision: 0,
                    },
                );
            }
            labs.insert(
                slug.clone(),
                Lab { slug, title: lc.title.clone(), description: lc.description.clone() },
            );
        }

        // Built-in demo lab, unless the config already defines that slug.
        let (seed, seed_days) = seed_lab();
        if !labs.contains_key(&seed.slug) {
            days.insert(seed.slug.clone(), seed_days.into_iter().map(|d| (d.day_number, d)).collect());
            labs.insert(seed.slug.clone(), seed);
        }

        for (slug, by_number) in &days {
            info!(target: "labs_backend", %slug, days = by_number.len(), "Startup lab inventory");
        }

        Self {
            labs: Arc::new(RwLock::new(labs)),
            days: Arc::new(RwLock::new(days)),
            settings,
        }
    }

    /// Labs with their day counts, ordered by slug.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_labs(&self) -> Vec<(Lab, usize)> {
        let labs = self.labs.read().await;
        let days = self.days.read().await;
        labs.values()
            .map(|lab| (lab.clone(), days.get(&lab.slug).map_or(0, BTreeMap::len)))
            .collect()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_lab(&self, slug: &str) -> Option<Lab> {
        self.labs.read().await.get(slug).cloned()
    }

    /// Days of a lab in day-number order. None when the lab is unknown.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_days(&self, slug: &str) -> Option<Vec<Day>> {
        let days = self.days.read().await;
        days.get(slug).map(|by_number| by_number.values().cloned().collect())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_day(&self, slug: &str, day_number: u32) -> Option<Day> {
        let days = self.days.read().await;
        days.get(slug).and_then(|by_number| by_number.get(&day_number)).cloned()
    }

    /// Overwrite a day's content columns. Returns the stored row, or None if it does not exist.
    #[instrument(level = "info", skip(self, write), fields(content_len = write.content.len()))]
    pub async fn write_day(&self, slug: &str, day_number: u32, write: DayWrite) -> Option<Day> {
        let mut days = self.days.write().await;
        let day = days.get_mut(slug)?.get_mut(&day_number)?;
        if let Some(title) = write.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            day.title = title;
        }
        day.content = Some(write.content);
        day.video_url = write.video_url;
        day.revision += 1;
        info!(target: "labs_backend", %slug, day = day_number, revision = day.revision, "Day content written");
        Some(day.clone())
    }
}
