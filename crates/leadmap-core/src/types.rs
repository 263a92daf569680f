//! Domain types shared by the engine, its collaborators and the driver.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Business type keyword that marks a result as a pension.
pub const PENSION_KEYWORD: &str = "펜션";
/// Business type wildcard understood by the search backend.
pub const ANY_BUSINESS_TYPE: &str = "전체";

/// Stable identity of a result within one session.
///
/// Upstream keys and positional ids live in separate namespaces: a key that
/// happens to read `#3` never equals the positional id of record 3.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResultId {
    /// Natural key carried by the upstream record.
    Key(String),
    /// Position in the provider batch, for records without a key. Only
    /// meaningful within the session that produced it.
    Position(usize),
}

impl ResultId {
    pub fn new(id: impl Into<String>) -> Self { Self::Key(id.into()) }

    /// Identity used when the upstream record has no natural key.
    pub fn from_index(index: usize) -> Self { Self::Position(index) }

    /// Reads a user-typed id: `#<n>` is positional, anything else a key.
    pub fn parse(input: &str) -> Self {
        match input.strip_prefix('#').and_then(|n| n.parse().ok()) {
            Some(index) => Self::Position(index),
            None => Self::new(input),
        }
    }

    pub fn is_positional(&self) -> bool { matches!(self, Self::Position(_)) }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Position(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for ResultId {
    fn from(s: &str) -> Self { Self::new(s) }
}

impl From<String> for ResultId {
    fn from(s: String) -> Self { Self::Key(s) }
}

/// Monotonic counter minted on every new search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self { Self(self.0 + 1) }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "s{}", self.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self { Self { lat, lng } }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Derived classification that drives the marker look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Pension,
    Guesthouse,
}

impl Category {
    pub fn classify(label: &str) -> Self {
        if label.contains(PENSION_KEYWORD) { Category::Pension } else { Category::Guesthouse }
    }

    pub fn marker_style(&self, badge: Option<&str>) -> MarkerStyle {
        let (glyph, color, css_class) = match self {
            Category::Pension => ("🏡", "#10B981", "indutype-icon pension-icon"),
            Category::Guesthouse => ("🏠", "#3B82F6", "indutype-icon minbak-icon"),
        };
        MarkerStyle { glyph: glyph.to_string(), color: color.to_string(), css_class: css_class.to_string(), badge: badge.map(str::to_string) }
    }
}

/// Visual parameters handed to the overlay factory. The engine never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub glyph: String,
    pub color: String,
    pub css_class: String,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayField {
    pub label: String,
    pub value: String,
}

impl DisplayField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// One record as the search provider returns it, before ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category_label: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<DisplayField>,
    pub homepage: Option<String>,
    pub badge: Option<String>,
    #[serde(default)]
    pub has_action_target: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultBatch {
    pub records: Vec<RawRecord>,
    /// Backend-reported total; may exceed `records.len()`.
    pub total_count: Option<usize>,
}

impl ResultBatch {
    pub fn new(records: Vec<RawRecord>) -> Self { Self { records, total_count: None } }
}

/// An ingested search hit. Immutable once it is part of a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ResultId,
    pub position: Position,
    pub category: Category,
    pub category_label: String,
    pub title: String,
    pub fields: Vec<DisplayField>,
    pub homepage: Option<String>,
    pub badge: Option<String>,
    pub has_action_target: bool,
}

impl SearchResult {
    /// Returns `None` for records that cannot be placed on the map.
    pub fn ingest(index: usize, raw: RawRecord) -> Option<Self> {
        let position = Position::new(raw.lat?, raw.lng?);
        if !position.is_valid() { return None; }
        let id = match raw.id.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => ResultId::new(key),
            _ => ResultId::from_index(index),
        };
        Some(Self {
            id,
            position,
            category: Category::classify(&raw.category_label),
            category_label: raw.category_label,
            title: raw.title,
            fields: raw.fields,
            homepage: raw.homepage.as_deref().and_then(normalize_homepage),
            badge: raw.badge,
            has_action_target: raw.has_action_target,
        })
    }

    pub fn marker_style(&self) -> MarkerStyle { self.category.marker_style(self.badge.as_deref()) }

    pub fn detail(&self) -> DetailContent { DetailContent::for_result(self) }
}

/// Prefixes `http://` when no scheme is given; blank input yields `None`.
pub fn normalize_homepage(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() { return None; }
    if url.starts_with("http") { Some(url.to_string()) } else { Some(format!("http://{url}")) }
}

/// What the user searched for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub region_code: String,
    pub business_type: Option<String>,
}

impl SearchCriteria {
    pub fn new(region_code: impl Into<String>, business_type: Option<String>) -> Self {
        Self { region_code: region_code.into(), business_type }
    }

    pub fn validate(&self) -> Result<()> {
        if self.region_code.trim().is_empty() {
            return Err(Error::InvalidInput("a region must be selected before searching".to_string()));
        }
        Ok(())
    }

    pub fn business_type_or_any(&self) -> &str {
        match self.business_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => ANY_BUSINESS_TYPE,
        }
    }
}

/// Opaque reference to an overlay owned by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

/// Identifies one viewport move so its completion can be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewportTransition(pub u64);

/// A button inside a detail popup, bound to the result it was rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailAction {
    OpenHomepage { url: String },
    Convert { result_id: ResultId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailContent {
    pub result_id: ResultId,
    pub title: String,
    pub fields: Vec<DisplayField>,
    pub actions: Vec<DetailAction>,
}

impl DetailContent {
    pub fn for_result(result: &SearchResult) -> Self {
        let mut actions = Vec::new();
        if let Some(url) = &result.homepage { actions.push(DetailAction::OpenHomepage { url: url.clone() }); }
        if result.has_action_target { actions.push(DetailAction::Convert { result_id: result.id.clone() }); }
        Self { result_id: result.id.clone(), title: result.title.clone(), fields: result.fields.clone(), actions }
    }
}

/// Reference to the business record created by a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalRef(pub String);

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity, title: title.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub record_ref: ExternalRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: Option<&str>, lat: Option<f64>) -> RawRecord {
        RawRecord { id: id.map(str::to_string), lat, lng: Some(127.0), category_label: "민박".into(), title: "A".into(), ..Default::default() }
    }

    #[test]
    fn ingest_falls_back_to_index_identity() {
        let r = SearchResult::ingest(7, raw(None, Some(37.0))).expect("ingest");
        assert_eq!(r.id, ResultId::Position(7));
        assert_eq!(r.id.to_string(), "#7");
        let r = SearchResult::ingest(7, raw(Some("  "), Some(37.0))).expect("ingest");
        assert_eq!(r.id, ResultId::Position(7));
        let r = SearchResult::ingest(7, raw(Some("biz-1"), Some(37.0))).expect("ingest");
        assert_eq!(r.id, ResultId::new("biz-1"));
    }

    #[test]
    fn hash_keys_do_not_collide_with_positions() {
        let keyed = SearchResult::ingest(0, raw(Some("#3"), Some(37.0))).expect("ingest");
        let positional = SearchResult::ingest(3, raw(None, Some(37.0))).expect("ingest");
        assert_ne!(keyed.id, positional.id);
        assert!(!keyed.id.is_positional());
        assert_eq!(ResultId::parse("#3"), positional.id);
        assert_eq!(ResultId::parse("#x"), ResultId::new("#x"));
    }

    #[test]
    fn ingest_skips_records_without_coordinates() {
        assert!(SearchResult::ingest(0, raw(None, None)).is_none());
        assert!(SearchResult::ingest(0, raw(None, Some(f64::NAN))).is_none());
        assert!(SearchResult::ingest(0, raw(None, Some(123.0))).is_none());
    }

    #[test]
    fn homepage_gets_scheme() {
        assert_eq!(normalize_homepage("www.a.kr").as_deref(), Some("http://www.a.kr"));
        assert_eq!(normalize_homepage("https://a.kr").as_deref(), Some("https://a.kr"));
        assert_eq!(normalize_homepage("   "), None);
    }

    #[test]
    fn category_follows_keyword() {
        assert_eq!(Category::classify("관광펜션업"), Category::Pension);
        assert_eq!(Category::classify("농어촌민박업"), Category::Guesthouse);
        assert_eq!(Category::Pension.marker_style(Some("4")).badge.as_deref(), Some("4"));
    }

    #[test]
    fn criteria_require_region() {
        assert!(SearchCriteria::new(" ", None).validate().is_err());
        let c = SearchCriteria::new("41820", Some("".into()));
        assert!(c.validate().is_ok());
        assert_eq!(c.business_type_or_any(), ANY_BUSINESS_TYPE);
    }
}
