use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed label set a note may be filed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Work,
    Personal,
    Ideas,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Ideas];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Ideas => "Ideas",
        }
    }

    /// Candidate labels sent to the zero-shot classifier, in display order.
    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(Category::as_str).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label '{0}'")]
pub struct UnknownLabel(pub String);

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Work" => Ok(Category::Work),
            "Personal" => Ok(Category::Personal),
            "Ideas" => Ok(Category::Ideas),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl FromStr for Sentiment {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(Sentiment::Positive),
            "Neutral" => Ok(Sentiment::Neutral),
            "Negative" => Ok(Sentiment::Negative),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// A persisted note. Shared by the server handlers and the client-side editor/page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<Category>,
    pub sentiment: Option<Sentiment>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of create and update requests. Update replaces all three fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<Category>,
}

impl NoteInput {
    /// Required-field check applied by every store backend before writing.
    /// Returns one message per offending field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title is required.".to_string());
        }
        if self.content.trim().is_empty() {
            errors.push("Content is required.".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Raw `notes` table row. Labels are stored as text and checked on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sentiment: Option<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NoteRow> for Note {
    type Error = UnknownLabel;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        Ok(Note {
            id: row.id,
            title: row.title,
            content: row.content,
            category: row.category.as_deref().map(str::parse::<Category>).transpose()?,
            sentiment: row.sentiment.as_deref().map(str::parse::<Sentiment>).transpose()?,
            summary: row.summary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("Chores".parse::<Category>().is_err());
    }

    #[test]
    fn test_unknown_category_rejected_in_json() {
        let result: Result<NoteInput, _> =
            serde_json::from_str(r#"{"title":"t","content":"c","category":"Chores"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_category_optional_in_input() {
        let input: NoteInput = serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert_eq!(input.category, None);
    }

    #[test]
    fn test_validate_reports_each_blank_field() {
        let input = NoteInput {
            title: "  ".into(),
            content: String::new(),
            category: None,
        };
        assert_eq!(
            input.validate().unwrap_err(),
            vec!["Title is required.", "Content is required."]
        );
    }

    #[test]
    fn test_note_serializes_camel_case_timestamps() {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            category: Some(Category::Ideas),
            sentiment: None,
            summary: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["category"], "Ideas");
    }

    #[test]
    fn test_row_with_unknown_label_rejected() {
        let now = Utc::now();
        let row = NoteRow {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            category: Some("Chores".into()),
            sentiment: None,
            summary: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(Note::try_from(row).unwrap_err(), UnknownLabel("Chores".into()));
    }
}
