/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::relation_store::IN_FILTER_MAX;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TimelineConfig {
    /// Albums kept after the chunked owner query is merged.
    pub album_limit: Option<u32>,
    /// Reposts fetched per chunk of scope members before reducing to one per album.
    pub repost_overlay_limit: Option<u32>,
    /// Ids per "in" query. Clamped to the store limit.
    pub in_filter_chunk: Option<usize>,
    pub comments_preview: Option<usize>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            album_limit: Some(50),
            repost_overlay_limit: Some(50),
            in_filter_chunk: Some(IN_FILTER_MAX),
            comments_preview: Some(3),
        }
    }
}

impl TimelineConfig {
    pub fn album_limit(&self) -> u32 {
        self.album_limit.unwrap_or(50).clamp(1, 500)
    }

    pub fn repost_overlay_limit(&self) -> u32 {
        self.repost_overlay_limit.unwrap_or(50).clamp(1, 500)
    }

    pub fn in_filter_chunk(&self) -> usize {
        self.in_filter_chunk.unwrap_or(IN_FILTER_MAX).clamp(1, IN_FILTER_MAX)
    }

    pub fn comments_preview(&self) -> usize {
        self.comments_preview.unwrap_or(3).min(3)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServiceConfig {
    pub bind: String,
    /// Directory holding `social.db` when `db_path` is not set.
    pub data_dir: Option<String>,
    pub db_path: Option<String>,
    #[serde(default)]
    pub timeline: Option<TimelineConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8790".to_string(),
            data_dir: None,
            db_path: None,
            timeline: None,
        }
    }
}

impl ServiceConfig {
    /// Reads a JSON config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        let cfg: ServiceConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        if let Some(p) = self.db_path.as_deref().filter(|s| !s.trim().is_empty()) {
            return Ok(PathBuf::from(p));
        }
        let dir = match self.data_dir.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(d) => PathBuf::from(d),
            None => default_data_dir()?,
        };
        Ok(dir.join("social.db"))
    }

    pub fn timeline(&self) -> TimelineConfig {
        self.timeline.clone().unwrap_or_default()
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("PHOTOSHARE_CONFIG") {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }
    config_base_dir().join("config.json")
}

pub fn default_data_dir() -> Result<PathBuf> {
    if let Ok(v) = std::env::var("PHOTOSHARE_DATA_DIR") {
        if !v.trim().is_empty() {
            return Ok(PathBuf::from(v));
        }
    }
    let proj = ProjectDirs::from("net", "photoshare", "Photoshare")
        .context("unable to determine platform data dir")?;
    Ok(proj.data_local_dir().to_path_buf())
}

fn config_base_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let base = std::env::var("APPDATA")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        return PathBuf::from(base).join("Photoshare");
    }
    if cfg!(target_os = "macos") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        return PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join("Photoshare");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join("photoshare")
}
