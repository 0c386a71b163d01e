//! Page domain model: content, publish workflow and version history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::text::{non_blank, normalize_tags, slugify, truncate_chars};
use shared::validation::{validate_link, validate_slug};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::document::Document;
use crate::error::{DomainError, Violations};
use crate::models::seo::{MAX_SEO_DESCRIPTION, MAX_SEO_TITLE};
use crate::models::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Scheduled,
    Archived,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Scheduled => "scheduled",
            PageStatus::Archived => "archived",
        }
    }
}

impl FromStr for PageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PageStatus::Draft),
            "published" => Ok(PageStatus::Published),
            "scheduled" => Ok(PageStatus::Scheduled),
            "archived" => Ok(PageStatus::Archived),
            _ => Err(format!("Invalid page status: {}", s)),
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageTemplate {
    #[default]
    Default,
    Landing,
    Service,
    Provider,
    Contact,
    Blog,
    Custom,
}

impl PageTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageTemplate::Default => "default",
            PageTemplate::Landing => "landing",
            PageTemplate::Service => "service",
            PageTemplate::Provider => "provider",
            PageTemplate::Contact => "contact",
            PageTemplate::Blog => "blog",
            PageTemplate::Custom => "custom",
        }
    }
}

impl FromStr for PageTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(PageTemplate::Default),
            "landing" => Ok(PageTemplate::Landing),
            "service" => Ok(PageTemplate::Service),
            "provider" => Ok(PageTemplate::Provider),
            "contact" => Ok(PageTemplate::Contact),
            "blog" => Ok(PageTemplate::Blog),
            "custom" => Ok(PageTemplate::Custom),
            _ => Err(format!("Invalid page template: {}", s)),
        }
    }
}

/// Building block kinds of a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    Text,
    Image,
    Gallery,
    Video,
    Cta,
    Testimonials,
    Faq,
    Team,
    Services,
    Contact,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PageSection {
    pub id: Uuid,
    pub kind: SectionKind,
    #[validate(length(max = 200, message = "Section title cannot exceed 200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
    /// Template-specific payload.
    pub data: Option<serde_json::Value>,
    pub order: i32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl PageSection {
    pub fn new(kind: SectionKind, order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: None,
            content: None,
            data: None,
            order,
            is_visible: true,
        }
    }
}

/// SEO fields embedded in the page itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSeo {
    #[validate(length(max = 60, message = "Meta title cannot exceed 60 characters"))]
    pub meta_title: Option<String>,
    #[validate(length(max = 160, message = "Meta description cannot exceed 160 characters"))]
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    #[validate(custom(function = "validate_link"))]
    pub canonical_url: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub og_image: Option<String>,
    pub no_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visibility {
    pub is_public: bool,
    pub requires_auth: bool,
    pub allowed_roles: Vec<UserRole>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            is_public: true,
            requires_auth: false,
            allowed_roles: Vec::new(),
        }
    }
}

/// A stored snapshot of a page's title and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVersion {
    pub version_number: i32,
    pub title: String,
    pub content: String,
    pub author: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub change_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Versioning {
    pub enabled: bool,
    pub current_version: i32,
    pub history: Vec<PageVersion>,
}

impl Default for Versioning {
    fn default() -> Self {
        Self {
            enabled: true,
            current_version: 1,
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Workflow {
    pub requires_approval: bool,
    pub approval_status: ApprovalStatus,
    pub submitted_by: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub review_notes: Option<String>,
}

fn default_true() -> bool {
    true
}

/// A CMS page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 200, message = "Slug must be 1-200 characters"))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    pub content: String,

    #[validate(length(max = 500, message = "Excerpt cannot exceed 500 characters"))]
    pub excerpt: Option<String>,

    pub template: PageTemplate,
    pub status: PageStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,

    pub author: Uuid,
    pub last_modified_by: Option<Uuid>,

    pub featured_image: Option<Uuid>,
    pub attachments: Vec<Uuid>,

    pub tags: Vec<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(nested)]
    pub sections: Vec<PageSection>,

    #[validate(nested)]
    pub seo: PageSeo,

    pub visibility: Visibility,

    pub views: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,

    pub versioning: Versioning,

    #[validate(nested)]
    pub workflow: Workflow,

    pub parent_page: Option<Uuid>,
    pub child_pages: Vec<Uuid>,
    pub related_pages: Vec<Uuid>,
    pub menu_order: i32,
    pub show_in_menu: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Note attached to the next version snapshot. Not persisted.
    #[serde(skip)]
    pub change_note: Option<String>,
}

impl Page {
    /// Creates an unsaved draft; the slug is derived from the title on save.
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            slug: String::new(),
            content: content.into(),
            excerpt: None,
            template: PageTemplate::default(),
            status: PageStatus::Draft,
            published_at: None,
            scheduled_at: None,
            author,
            last_modified_by: None,
            featured_image: None,
            attachments: Vec::new(),
            tags: Vec::new(),
            category: None,
            sections: Vec::new(),
            seo: PageSeo::default(),
            visibility: Visibility::default(),
            views: 0,
            last_viewed_at: None,
            versioning: Versioning::default(),
            workflow: Workflow::default(),
            parent_page: None,
            child_pages: Vec::new(),
            related_pages: Vec::new(),
            menu_order: 0,
            show_in_menu: true,
            created_at: now,
            updated_at: now,
            change_note: None,
        }
    }

    pub fn url_path(&self) -> String {
        format!("/{}", self.slug)
    }

    pub fn is_published(&self) -> bool {
        self.status == PageStatus::Published
    }

    /// Forces the page to published. An existing `published_at` is kept.
    pub fn publish(&mut self, now: DateTime<Utc>) {
        self.status = PageStatus::Published;
        self.published_at.get_or_insert(now);
        self.scheduled_at = None;
    }

    pub fn archive(&mut self) {
        self.status = PageStatus::Archived;
    }

    pub fn unpublish(&mut self) {
        self.status = PageStatus::Draft;
    }

    pub fn schedule(&mut self, at: DateTime<Utc>) {
        self.status = PageStatus::Scheduled;
        self.scheduled_at = Some(at);
    }

    /// Whether a scheduled page has reached its publication time.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == PageStatus::Scheduled && self.scheduled_at.is_some_and(|at| at <= now)
    }

    pub fn submit_for_review(&mut self, actor: Uuid, now: DateTime<Utc>) {
        let wf = &mut self.workflow;
        wf.approval_status = ApprovalStatus::Pending;
        wf.submitted_by = Some(actor);
        wf.submitted_at = Some(now);
        wf.approved_by = None;
        wf.approved_at = None;
    }

    pub fn approve(&mut self, actor: Uuid, now: DateTime<Utc>) {
        let wf = &mut self.workflow;
        wf.approval_status = ApprovalStatus::Approved;
        wf.approved_by = Some(actor);
        wf.approved_at = Some(now);
    }

    pub fn reject(&mut self, actor: Uuid, notes: impl Into<String>) {
        let wf = &mut self.workflow;
        wf.approval_status = ApprovalStatus::Rejected;
        wf.approved_by = None;
        wf.approved_at = None;
        wf.review_notes = Some(notes.into());
        self.last_modified_by = Some(actor);
    }

    pub fn version(&self, version_number: i32) -> Option<&PageVersion> {
        self.versioning
            .history
            .iter()
            .find(|v| v.version_number == version_number)
    }

    /// Restores title and content from a stored snapshot.
    ///
    /// Fails with [`DomainError::VersionNotFound`] without touching the page
    /// when no such snapshot exists. The restored content is snapshotted again
    /// on the next save.
    pub fn revert(&mut self, version_number: i32) -> Result<(), DomainError> {
        let snapshot = self
            .version(version_number)
            .ok_or(DomainError::VersionNotFound(version_number))?;
        let (title, content) = (snapshot.title.clone(), snapshot.content.clone());

        self.title = title;
        self.content = content;
        self.change_note = Some(format!("Reverted to version {}", version_number));
        Ok(())
    }

    /// Whether `role` may publish the page under its approval workflow.
    ///
    /// Saving never enforces this; callers that gate publishing ask here.
    pub fn can_be_published_by(&self, role: UserRole) -> bool {
        !self.workflow.requires_approval
            || self.workflow.approval_status == ApprovalStatus::Approved
            || role.can_publish()
    }

    /// Whether a visitor with `role` (or anonymous) may view the page.
    pub fn is_visible_to(&self, role: Option<UserRole>) -> bool {
        if !self.is_published() {
            return false;
        }
        let vis = &self.visibility;
        match role {
            None => vis.is_public && !vis.requires_auth,
            Some(role) => vis.allowed_roles.is_empty() || vis.allowed_roles.contains(&role),
        }
    }

    fn content_changed(&self, previous: Option<&Self>) -> bool {
        previous.map_or(true, |prev| prev.content != self.content)
    }
}

impl Document for Page {
    const COLLECTION: &'static str = "pages";

    fn id(&self) -> Uuid {
        self.id
    }

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {
        self.title = self.title.trim().to_string();
        let slug = self.slug.trim();
        self.slug = if slug.is_empty() {
            slugify(&self.title)
        } else {
            slug.to_lowercase()
        };

        if non_blank(self.seo.meta_title.as_deref()).is_none() {
            self.seo.meta_title = Some(truncate_chars(&self.title, MAX_SEO_TITLE));
        }
        if non_blank(self.seo.meta_description.as_deref()).is_none() {
            self.seo.meta_description = non_blank(self.excerpt.as_deref())
                .map(|excerpt| truncate_chars(excerpt, MAX_SEO_DESCRIPTION));
        }
        self.seo.keywords = normalize_tags(&self.seo.keywords);
        self.tags = normalize_tags(&self.tags);

        self.sections.sort_by_key(|s| s.order);
    }

    fn check(&self, _previous: Option<&Self>) -> Violations {
        self.validate().into()
    }

    fn enforce_rules(&self) -> Result<(), DomainError> {
        if self.parent_page == Some(self.id) {
            return Err(DomainError::rule("A page cannot be its own parent"));
        }
        Ok(())
    }

    fn finalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) -> Result<(), DomainError> {
        let content_changed = self.content_changed(previous);

        if let Some(prev) = previous {
            self.created_at = prev.created_at;
            // History is append-only; callers cannot rewrite it.
            self.versioning.history = prev.versioning.history.clone();
            self.versioning.current_version = prev.versioning.current_version;
            if prev.published_at.is_some() {
                self.published_at = prev.published_at;
            }
        }

        if self.status == PageStatus::Published && self.published_at.is_none() {
            self.published_at = Some(now);
        }

        if content_changed && self.versioning.enabled {
            let version_number = self.versioning.current_version;
            self.versioning.history.push(PageVersion {
                version_number,
                title: self.title.clone(),
                content: self.content.clone(),
                author: self.last_modified_by.or(Some(self.author)),
                created_at: now,
                change_note: self.change_note.clone(),
            });
            self.versioning.current_version = version_number + 1;

            tracing::debug!(
                page_id = %self.id,
                version_number,
                "Page version recorded"
            );
        }

        self.change_note = None;
        self.updated_at = now;
        Ok(())
    }
}
