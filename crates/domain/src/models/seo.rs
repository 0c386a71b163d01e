//! Per-page SEO metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::text::{non_blank, normalize_tags};
use shared::validation::{validate_link, validate_slug, validate_unit_interval};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::document::Document;
use crate::error::{DomainError, Violations};

pub const MAX_SEO_TITLE: usize = 60;
pub const MAX_SEO_DESCRIPTION: usize = 160;
pub const DEFAULT_SITEMAP_PRIORITY: f64 = 0.5;

/// Value of the robots meta tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RobotsMeta {
    #[default]
    #[serde(rename = "index, follow")]
    IndexFollow,
    #[serde(rename = "noindex, follow")]
    NoindexFollow,
    #[serde(rename = "index, nofollow")]
    IndexNofollow,
    #[serde(rename = "noindex, nofollow")]
    NoindexNofollow,
}

impl RobotsMeta {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotsMeta::IndexFollow => "index, follow",
            RobotsMeta::NoindexFollow => "noindex, follow",
            RobotsMeta::IndexNofollow => "index, nofollow",
            RobotsMeta::NoindexNofollow => "noindex, nofollow",
        }
    }
}

impl FromStr for RobotsMeta {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "index, follow" => Ok(RobotsMeta::IndexFollow),
            "noindex, follow" => Ok(RobotsMeta::NoindexFollow),
            "index, nofollow" => Ok(RobotsMeta::IndexNofollow),
            "noindex, nofollow" => Ok(RobotsMeta::NoindexNofollow),
            _ => Err(format!("Invalid robots meta value: {}", s)),
        }
    }
}

/// Sitemap `<changefreq>` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

impl FromStr for ChangeFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(ChangeFrequency::Always),
            "hourly" => Ok(ChangeFrequency::Hourly),
            "daily" => Ok(ChangeFrequency::Daily),
            "weekly" => Ok(ChangeFrequency::Weekly),
            "monthly" => Ok(ChangeFrequency::Monthly),
            "yearly" => Ok(ChangeFrequency::Yearly),
            "never" => Ok(ChangeFrequency::Never),
            _ => Err(format!("Invalid change frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwitterCard {
    Summary,
    #[default]
    SummaryLargeImage,
    App,
    Player,
}

fn default_og_type() -> String {
    "website".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    #[validate(length(max = 95))]
    pub title: Option<String>,
    #[validate(length(max = 300))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub image: Option<String>,
    #[serde(rename = "type", default = "default_og_type")]
    pub kind: String,
    #[validate(custom(function = "validate_link"))]
    pub url: Option<String>,
    pub site_name: Option<String>,
}

impl Default for OpenGraph {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            image: None,
            kind: default_og_type(),
            url: None,
            site_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TwitterMeta {
    #[serde(default)]
    pub card: TwitterCard,
    #[validate(length(max = 70))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub image: Option<String>,
    pub site: Option<String>,
    pub creator: Option<String>,
}

/// SEO metadata bag keyed by page slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Page slug must be 1-200 characters"))]
    #[validate(custom(function = "validate_slug"))]
    pub page_slug: String,

    #[validate(length(min = 1, max = 60, message = "SEO title must be 1-60 characters"))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 160,
        message = "SEO description must be 1-160 characters"
    ))]
    pub description: String,

    pub keywords: Vec<String>,

    #[validate(custom(function = "validate_link"))]
    pub canonical_url: Option<String>,

    #[validate(nested)]
    pub open_graph: OpenGraph,

    #[validate(nested)]
    pub twitter: TwitterMeta,

    /// JSON-LD blob rendered verbatim.
    pub structured_data: Option<serde_json::Value>,

    pub robots_meta: RobotsMeta,

    #[validate(custom(function = "validate_unit_interval"))]
    pub sitemap_priority: f64,

    pub sitemap_change_freq: ChangeFrequency,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Seo {
    pub fn new(
        page_slug: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            page_slug: page_slug.into(),
            title: title.into(),
            description: description.into(),
            keywords: Vec::new(),
            canonical_url: None,
            open_graph: OpenGraph::default(),
            twitter: TwitterMeta::default(),
            structured_data: None,
            robots_meta: RobotsMeta::default(),
            sitemap_priority: DEFAULT_SITEMAP_PRIORITY,
            sitemap_change_freq: ChangeFrequency::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The canonical URL, defaulting to `/<page_slug>`.
    pub fn full_canonical_url(&self) -> String {
        match non_blank(self.canonical_url.as_deref()) {
            Some(url) => url.to_string(),
            None => format!("/{}", self.page_slug),
        }
    }
}

impl Document for Seo {
    const COLLECTION: &'static str = "seo";

    fn id(&self) -> Uuid {
        self.id
    }

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {
        self.page_slug = self.page_slug.trim().to_lowercase();
        self.keywords = normalize_tags(&self.keywords);

        let og = &mut self.open_graph;
        if non_blank(og.title.as_deref()).is_none() {
            og.title = Some(self.title.clone());
        }
        if non_blank(og.description.as_deref()).is_none() {
            og.description = Some(self.description.clone());
        }

        let tw = &mut self.twitter;
        if non_blank(tw.title.as_deref()).is_none() {
            tw.title = og.title.clone();
        }
        if non_blank(tw.description.as_deref()).is_none() {
            tw.description = og.description.clone();
        }
        if non_blank(tw.image.as_deref()).is_none() {
            tw.image = og.image.clone();
        }
    }

    fn check(&self, _previous: Option<&Self>) -> Violations {
        self.validate().into()
    }

    fn finalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(prev) = previous {
            self.created_at = prev.created_at;
        }
        self.updated_at = now;
        Ok(())
    }
}
