//! Appointment title derivation from category and cause codes.
//!
//! The rules live in one table so they can be read and tested on their own:
//! one pattern extracts the level letter, the others flag an interim
//! appointment.

use std::sync::OnceLock;

use regex::Regex;

use crate::records::AssignmentRecord;

/// Title prefix printed before the level letter.
pub const TITLE_PREFIX: &str = "PROFESOR DE ASIGNATURA";
/// Level used when the category carries no quoted capital letter.
pub const DEFAULT_LEVEL: char = 'A';
/// Suffix appended to interim appointments.
pub const INTERIM_SUFFIX: &str = "INTERINO";

/// Which record field a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Category,
    Cause,
}

/// One interim-indicator rule: `field` matching `pattern` marks the title
/// as interim.
#[derive(Debug)]
pub struct InterimRule {
    pub field: RuleField,
    pub pattern: Regex,
}

#[derive(Debug)]
pub struct TitleRules {
    /// Captures the level letter in group 1.
    pub level: Regex,
    pub interim: Vec<InterimRule>,
}

/// The rule table in use for every document.
pub fn standard_rules() -> &'static TitleRules {
    static RULES: OnceLock<TitleRules> = OnceLock::new();
    RULES.get_or_init(|| TitleRules {
        level: Regex::new(r#""([A-Z])""#).expect("static pattern"),
        interim: vec![
            InterimRule {
                field: RuleField::Category,
                pattern: Regex::new(r"(?i)INT").expect("static pattern"),
            },
            InterimRule {
                field: RuleField::Cause,
                pattern: Regex::new(r"(?i)INTER|OTRO NOMB").expect("static pattern"),
            },
        ],
    })
}

/// Decoded title parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Title {
    pub level: char,
    pub interim: bool,
}

impl TitleRules {
    pub fn classify(&self, category: &str, cause: &str) -> Title {
        let level = self
            .level
            .captures(category)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().chars().next())
            .unwrap_or(DEFAULT_LEVEL);

        let interim = self.interim.iter().any(|rule| {
            let text = match rule.field {
                RuleField::Category => category,
                RuleField::Cause => cause,
            };
            rule.pattern.is_match(text)
        });

        Title { level, interim }
    }
}

impl Title {
    /// `PROFESOR DE ASIGNATURA "A"` or `PROFESOR DE ASIGNATURA "A" INTERINO`.
    pub fn render(&self) -> String {
        let mut out = format!("{TITLE_PREFIX} \"{}\"", self.level);
        if self.interim {
            out.push(' ');
            out.push_str(INTERIM_SUFFIX);
        }
        out
    }
}

/// Title string for one assignment, using the standard rule table.
pub fn title_for(record: &AssignmentRecord) -> String {
    standard_rules()
        .classify(
            record.category.as_deref().unwrap_or(""),
            record.cause.as_deref().unwrap_or(""),
        )
        .render()
}
