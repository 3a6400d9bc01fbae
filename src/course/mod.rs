//! Course page view models: curriculum, module tabs and the certificate block.
//!
//! Course data is shipped as JSON alongside the site and comes in a few
//! historical shapes; everything here normalizes it into one typed form or
//! reports a [`CourseError`].

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Duration shown for modules that don't specify one.
pub const DEFAULT_MODULE_DURATION: &str = "1-2 weeks";

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("malformed course data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("module {0} has neither a name nor a title")]
    UntitledModule(usize),
    #[error("course has no tab '{0}'")]
    TabNotFound(String),
    #[error("course has no module tabs")]
    NoTabs,
}

// ========== Curriculum ==========

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawModule {
    Title(String),
    Detailed {
        name: Option<String>,
        title: Option<String>,
        duration: Option<String>,
        subtopics: Option<Value>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawOverview {
    #[serde(default)]
    modules: Option<Vec<RawModule>>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    label: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCourse {
    #[serde(default)]
    overview: Option<RawOverview>,
    #[serde(default)]
    modules: Option<Vec<RawModule>>,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurriculumModule {
    pub title: String,
    pub duration: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatIcon {
    Languages,
    Clock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseStat {
    pub value: String,
    pub label: String,
    pub icon: StatIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Curriculum {
    pub modules: Vec<CurriculumModule>,
    pub stats: Vec<CourseStat>,
}

impl Curriculum {
    /// Normalize course JSON. Modules come from `overview.modules` when
    /// present, otherwise from `modules`; each entry is either a plain title
    /// or an object with `name`/`title`, `duration` and `subtopics`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a module has no title.
    pub fn from_json(value: Value) -> Result<Self, CourseError> {
        let raw: RawCourse = serde_json::from_value(value)?;

        let source = raw
            .overview
            .and_then(|o| o.modules)
            .or(raw.modules)
            .unwrap_or_default();

        let modules = source
            .into_iter()
            .enumerate()
            .map(|(index, module)| normalize_module(index, module))
            .collect::<Result<Vec<_>, _>>()?;

        let stats = raw
            .features
            .into_iter()
            .map(|f| {
                let label = f.description.unwrap_or_default();
                let icon = if label.to_lowercase().contains("languages") {
                    StatIcon::Languages
                } else {
                    StatIcon::Clock
                };
                CourseStat {
                    value: f.label.unwrap_or_default(),
                    label,
                    icon,
                }
            })
            .collect();

        Ok(Self { modules, stats })
    }
}

fn normalize_module(index: usize, module: RawModule) -> Result<CurriculumModule, CourseError> {
    match module {
        RawModule::Title(title) => Ok(CurriculumModule {
            title,
            duration: DEFAULT_MODULE_DURATION.to_string(),
            topics: Vec::new(),
        }),
        RawModule::Detailed {
            name,
            title,
            duration,
            subtopics,
        } => {
            let title = name
                .or(title)
                .filter(|t| !t.trim().is_empty())
                .ok_or(CourseError::UntitledModule(index))?;
            let topics = match subtopics {
                Some(Value::Array(items)) => items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            Ok(CurriculumModule {
                title,
                duration: duration
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_MODULE_DURATION.to_string()),
                topics,
            })
        }
    }
}

// ========== Module tabs ==========

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabModule {
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub content: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleTab {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub modules: Vec<TabModule>,
}

impl ModuleTab {
    /// Tab caption: the type with its first letter capitalized.
    #[must_use]
    pub fn label(&self) -> String {
        let mut chars = self.kind.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawTabs {
    #[serde(default)]
    title: String,
    #[serde(default)]
    tabs: Vec<ModuleTab>,
}

/// Tabbed module browser (beginner / intermediate / advanced ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTabs {
    pub title: String,
    pub tabs: Vec<ModuleTab>,
    active_tab: usize,
    active_module: usize,
}

impl ModuleTabs {
    /// The first tab starts active.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has no tabs.
    pub fn from_json(value: Value) -> Result<Self, CourseError> {
        let raw: RawTabs = serde_json::from_value(value)?;
        if raw.tabs.is_empty() {
            return Err(CourseError::NoTabs);
        }
        Ok(Self {
            title: raw.title,
            tabs: raw.tabs,
            active_tab: 0,
            active_module: 0,
        })
    }

    #[must_use]
    pub fn active_tab(&self) -> &ModuleTab {
        &self.tabs[self.active_tab]
    }

    /// Switch tabs; the module selection goes back to the first module.
    ///
    /// # Errors
    ///
    /// Returns an error if no tab has this type.
    pub fn select_tab(&mut self, kind: &str) -> Result<(), CourseError> {
        let index = self
            .tabs
            .iter()
            .position(|t| t.kind == kind)
            .ok_or_else(|| CourseError::TabNotFound(kind.to_string()))?;
        self.active_tab = index;
        self.active_module = 0;
        Ok(())
    }

    /// Select a module within the active tab. Out-of-range indexes are ignored.
    pub fn select_module(&mut self, index: usize) {
        if index < self.active_tab().modules.len() {
            self.active_module = index;
        }
    }

    /// Module currently expanded, if the active tab has any.
    #[must_use]
    pub fn active_module(&self) -> Option<&TabModule> {
        self.active_tab().modules.get(self.active_module)
    }
}

// ========== Certificate ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCertificate {
    image: String,
    alt: Option<String>,
    course_title: String,
    #[serde(default)]
    completion_text: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub image: String,
    pub alt: String,
    pub course_title: String,
    pub completion_text: String,
    pub description: String,
}

impl Certificate {
    /// # Errors
    ///
    /// Returns an error if `image` or `courseTitle` is missing.
    pub fn from_json(value: Value) -> Result<Self, CourseError> {
        let raw: RawCertificate = serde_json::from_value(value)?;
        let alt = raw
            .alt
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| format!("{} Certificate", raw.course_title));
        Ok(Self {
            image: raw.image,
            alt,
            course_title: raw.course_title,
            completion_text: raw.completion_text,
            description: raw.description,
        })
    }
}
