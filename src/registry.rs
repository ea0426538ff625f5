//! Section registry: the ordered list of navigable documentation sections.
//!
//! The registry is built once and never mutated afterwards. The process-wide
//! instance returned by [`SectionRegistry::global`] is shared by reference
//! between any number of readers without locking.

use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Icon shown next to a section title in menus and the table of contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Glyph {
    FileText,
    Eye,
    Zap,
    Cpu,
    Sliders,
    Code,
    Radar,
    BatteryCharging,
    Cube,
    Gauge,
    Wrench,
    Users,
}

impl Glyph {
    /// A printable stand-in for the icon, used by text frontends
    pub fn symbol(self) -> char {
        match self {
            Glyph::FileText => '\u{1F4C4}',
            Glyph::Eye => '\u{1F441}',
            Glyph::Zap => '\u{26A1}',
            Glyph::Cpu => '\u{1F5A5}',
            Glyph::Sliders => '\u{1F39A}',
            Glyph::Code => '\u{2328}',
            Glyph::Radar => '\u{1F4E1}',
            Glyph::BatteryCharging => '\u{1F50B}',
            Glyph::Cube => '\u{1F4E6}',
            Glyph::Gauge => '\u{23F1}',
            Glyph::Wrench => '\u{1F527}',
            Glyph::Users => '\u{1F465}',
        }
    }
}

/// One navigable section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionEntry {
    /// Stable identifier, also used as the scroll anchor
    pub id: String,
    /// Human readable title
    pub title: String,
    pub glyph: Glyph,
}

impl SectionEntry {
    pub fn new(id: &str, title: &str, glyph: Glyph) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            glyph,
        }
    }
}

const BUILTIN_SECTIONS: &[(&str, &str, Glyph)] = &[
    ("executive-summary", "Executive Summary", Glyph::FileText),
    ("project-vision", "Project Origin & Vision", Glyph::Eye),
    ("functional-scope", "Functional Scope", Glyph::Zap),
    ("system-architecture", "System Architecture", Glyph::Cpu),
    ("components", "Components & Interfaces", Glyph::Sliders),
    ("firmware", "Firmware and Codebase", Glyph::Code),
    ("navigation", "Navigation & Sensors", Glyph::Radar),
    ("power", "Power & Battery", Glyph::BatteryCharging),
    ("payload", "Payload & Mechanical Design", Glyph::Cube),
    ("testing", "Testing & Calibration", Glyph::Gauge),
    ("maintenance", "Maintenance & Safety", Glyph::Wrench),
    ("team", "Team & Timeline", Glyph::Users),
];

static GLOBAL: OnceLock<SectionRegistry> = OnceLock::new();

/// Read-only ordered collection of [`SectionEntry`] values
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    entries: Vec<SectionEntry>,
}

impl SectionRegistry {
    /// Build a registry, rejecting empty or duplicate ids.
    pub fn new(entries: Vec<SectionEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for e in &entries {
            if e.id.trim().is_empty() {
                return Err(Error::ConfigError(format!(
                    "section '{}' has an empty id",
                    e.title
                )));
            }
            if !seen.insert(e.id.as_str()) {
                return Err(Error::ConfigError(format!("duplicate section id '{}'", e.id)));
            }
        }
        Ok(Self { entries })
    }

    /// The sections of the BI1 documentation, initialized on first use.
    pub fn global() -> &'static SectionRegistry {
        GLOBAL.get_or_init(|| SectionRegistry {
            entries: BUILTIN_SECTIONS
                .iter()
                .map(|(id, title, glyph)| SectionEntry::new(id, title, *glyph))
                .collect(),
        })
    }

    /// All entries in registration order
    pub fn list(&self) -> &[SectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SectionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Zero-based position of `id` in registration order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// `(id, title)` pairs for building menus
    pub fn nav_index(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.title.clone()))
            .collect()
    }

    /// Titles prefixed with their 1-based number, as shown in the table of contents
    pub fn numbered_titles(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}", i + 1, e.title))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_registry_has_twelve_unique_sections_in_order() {
        let reg = SectionRegistry::global();
        assert_eq!(reg.len(), 12);
        assert_eq!(reg.list()[0].id, "executive-summary");
        assert_eq!(reg.list()[11].id, "team");
        let ids: HashSet<_> = reg.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let res = SectionRegistry::new(vec![
            SectionEntry::new("a", "A", Glyph::Zap),
            SectionEntry::new("a", "Again", Glyph::Eye),
        ]);
        assert!(matches!(res, Err(Error::ConfigError(_))));
    }

    #[test]
    fn empty_id_is_rejected() {
        let res = SectionRegistry::new(vec![SectionEntry::new(" ", "Blank", Glyph::Zap)]);
        assert!(matches!(res, Err(Error::ConfigError(_))));
    }

    #[test]
    fn lookup_and_numbering() {
        let reg = SectionRegistry::global();
        assert_eq!(reg.position("power"), Some(7));
        assert_eq!(reg.get("firmware").map(|e| e.glyph), Some(Glyph::Code));
        assert!(reg.get("nope").is_none());
        assert_eq!(reg.numbered_titles()[2], "3. Functional Scope");
        assert_eq!(reg.nav_index()[9].0, "testing");
    }
}
