//! Lodging records as served by the regional lodging search backend, and
//! their conversion into provider-neutral [`RawRecord`]s.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{DisplayField, RawRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LodgingRecord {
    pub id: Option<String>,
    pub sigun_code: Option<String>,
    pub biz_name: String,
    pub indu_type: String,
    pub road_addr: Option<String>,
    pub lotno_addr: Option<String>,
    pub tel_no: Option<String>,
    /// Served as either a number or a string depending on the source table.
    pub room_cnt: Option<serde_json::Value>,
    pub rep_name: Option<String>,
    pub subfaclt: Option<String>,
    pub park_yn: Option<String>,
    pub tourism_info: Option<String>,
    pub homepage: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl LodgingRecord {
    pub fn room_count(&self) -> Option<String> {
        match &self.room_cnt {
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<&str> { non_blank(&self.road_addr).or_else(|| non_blank(&self.lotno_addr)) }

    /// Popup field order: type, address, phone, rooms, then the optional extras.
    pub fn display_fields(&self) -> Vec<DisplayField> {
        let mut fields = vec![DisplayField::new("Type", self.indu_type.clone())];
        if let Some(addr) = self.address() { fields.push(DisplayField::new("Address", addr)); }
        if let Some(tel) = non_blank(&self.tel_no) { fields.push(DisplayField::new("Phone", tel)); }
        if let Some(rooms) = self.room_count() { fields.push(DisplayField::new("Rooms", rooms)); }
        let extras = [("Owner", &self.rep_name), ("Facilities", &self.subfaclt), ("Parking", &self.park_yn), ("Nearby attractions", &self.tourism_info)];
        for (label, value) in extras {
            if let Some(v) = non_blank(value) { fields.push(DisplayField::new(label, v)); }
        }
        fields
    }

    pub fn into_raw(self) -> RawRecord {
        RawRecord {
            id: self.id.clone(),
            lat: self.lat,
            lng: self.lng,
            category_label: self.indu_type.clone(),
            title: self.biz_name.clone(),
            fields: self.display_fields(),
            homepage: self.homepage.clone(),
            badge: self.room_count(),
            has_action_target: true,
        }
    }
}

/// Load lodging records from a `.json` file (array of records) or from every
/// `.json` file under a directory, in path order.
pub fn load_fixtures(path: &Path) -> Result<Vec<LodgingRecord>> {
    let files = if path.is_dir() { list_json_files(path) } else { vec![path.to_path_buf()] };
    let mut records = Vec::new();
    for file in &files {
        let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let batch: Vec<LodgingRecord> = serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
        records.extend(batch);
    }
    Ok(records)
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut json_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("json") { json_files.push(path.to_path_buf()); }
    }
    json_files.sort(); json_files
}
