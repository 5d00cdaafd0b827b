use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(CourseId);
id_newtype!(UserId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Basic,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Basic, Level::Intermediate, Level::Advanced];

    pub fn label(self) -> &'static str {
        match self {
            Level::Basic => "Básico",
            Level::Intermediate => "Intermedio",
            Level::Advanced => "Avanzado",
        }
    }

    /// Accepts the display label or the English variant name, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        Level::ALL.into_iter().find(|level| {
            level.label().to_lowercase() == lower || format!("{level:?}").to_lowercase() == lower
        })
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub short_description: String,
    pub level: Level,
    pub duration: String,
    pub progress_percent: u8,
    pub tags: Vec<String>,
}

impl Course {
    pub fn new(
        id: &str,
        title: &str,
        short_description: &str,
        level: Level,
        duration: &str,
        progress_percent: u8,
        tags: &[&str],
    ) -> Self {
        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique_tags.iter().any(|existing| existing == tag) {
                unique_tags.push((*tag).to_string());
            }
        }

        Self {
            id: CourseId::from(id),
            title: title.to_string(),
            short_description: short_description.to_string(),
            level,
            duration: duration.to_string(),
            progress_percent: progress_percent.min(100),
            tags: unique_tags,
        }
    }

    /// Tags shown on a course card.
    pub fn card_tags(&self) -> &[String] {
        let end = self.tags.len().min(2);
        &self.tags[..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: u32,
    pub title: String,
    pub duration: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDay {
    pub weekday: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePreview {
    pub issuer: String,
    pub holder: String,
    pub course_title: String,
    pub certificate_id: String,
    pub issued_on: String,
    pub verification: String,
    pub signatory: String,
    pub completion_percent: u8,
    pub criteria: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationTrack {
    pub name: String,
}
