//! Section content: the HTML fragments rendered for each registered section.
//!
//! Content is static presentational data. A short built-in fragment exists
//! for every section of the global registry; a directory of `<id>.html`
//! files can override any of them.

use crate::registry::SectionRegistry;
use crate::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN: &[(&str, &str)] = &[
    (
        "executive-summary",
        "<p>BI1 (Bot I) is a first-generation indoor mobile serving robot prototype built to \
         demonstrate autonomous retrieval and delivery of beverages, documents and small items \
         via voice control, mobile app commands and manual override.</p>\
         <p>It targets semi-structured environments such as schools, research labs, offices and \
         light industrial floors.</p>",
    ),
    (
        "project-vision",
        "<p>BI1 originated from a team of electrical and computer engineering students driven by \
         the vision of automating repetitive service tasks with affordable, modular hardware.</p>",
    ),
    (
        "functional-scope",
        "<h3>3.1 Voice-Control Workflow</h3>\
         <ul><li>User speaks a predefined phrase to the voice assistant.</li>\
         <li>Sinric Pro parses the phrase into a structured JSON event.</li>\
         <li>The receiver board forwards the command to the main controller.</li></ul>",
    ),
    (
        "system-architecture",
        "<h3>4.1 Block Diagram Overview</h3>\
         <p>A multi-controller architecture: voice assistant, Sinric Pro cloud, Arduino R4 sender, \
         R4 receiver, Mega 2560 main controller, then mobility via Cytron motor drivers.</p>",
    ),
    (
        "components",
        "<table><tr><th>Component</th><th>Role</th></tr>\
         <tr><td>Arduino Mega 2560</td><td>Central controller</td></tr>\
         <tr><td>Arduino Uno R4 WiFi</td><td>Wireless command bridge</td></tr>\
         <tr><td>IR sensor array</td><td>Line detection</td></tr>\
         <tr><td>Ultrasonic sensors</td><td>Obstacle detection</td></tr></table>",
    ),
    (
        "firmware",
        "<p>The firmware is modular, one class per peripheral.</p>\
         <ul><li>Motor: DC drive control through Cytron drivers.</li>\
         <li>StepperMotor: waist extension control.</li>\
         <li>IrArray: line position estimate.</li>\
         <li>UltrasonicSensor: distance sampling.</li></ul>",
    ),
    (
        "navigation",
        "<h3>7.1 Line-Following Algorithm</h3>\
         <p>Autonomous line following with a finite-state control loop and PID correction: \
         adjustment = Kp*error + Ki*integral + Kd*(error - lastError).</p>",
    ),
    (
        "power",
        "<ul><li>3 series groups of 7 parallel cells per module.</li>\
         <li>Nominal per cell: 3.5 to 3.7 V.</li>\
         <li>Nominal per module: about 11.1 V.</li></ul>",
    ),
    (
        "payload",
        "<ul><li>Arm installed on a sliding base that retracts into the chassis.</li>\
         <li>Joints: 270 degree digital metal-gear hobby servos.</li>\
         <li>Waist extension: NEMA34 stepper with belt drive.</li></ul>",
    ),
    (
        "testing",
        "<ul><li>IR sensitivity tuned via onboard potentiometer.</li>\
         <li>Calibrated on black and white test surfaces.</li>\
         <li>PID step-response tuning with manual displacement tests.</li></ul>",
    ),
    (
        "maintenance",
        "<ul><li>Inspect wiring integrity and verify all connectors are secure.</li>\
         <li>Clean and realign IR sensors.</li>\
         <li>Check ultrasonic sensors for obstructions.</li>\
         <li>Tighten servo mounting screws.</li></ul>",
    ),
    (
        "team",
        "<ul><li>Mechanical design: chassis structure, frame strength and stability.</li>\
         <li>Firmware and control systems: navigation, sensors, motor control.</li></ul>",
    ),
];

/// HTML fragments keyed by section id
#[derive(Debug, Clone, Default)]
pub struct ContentSource {
    fragments: HashMap<String, String>,
}

impl ContentSource {
    /// An empty source; every section renders only its heading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in fragments for the global registry
    pub fn builtin() -> Self {
        let fragments = BUILTIN
            .iter()
            .map(|(id, html)| (id.to_string(), html.to_string()))
            .collect();
        Self { fragments }
    }

    /// Load `<id>.html` for each registry entry from `dir`. Sections without a
    /// file keep their built-in fragment.
    pub fn from_dir(dir: &Path, registry: &SectionRegistry) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::ConfigError(format!(
                "content directory {} does not exist",
                dir.display()
            )));
        }
        let mut source = Self::builtin();
        for entry in registry.list() {
            let path = dir.join(format!("{}.html", entry.id));
            if !path.exists() {
                debug!("no content file for '{}', using built-in fragment", entry.id);
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(html) => source.insert(&entry.id, html),
                Err(e) => {
                    return Err(Error::ConfigError(format!(
                        "failed to read {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }
        for id in source.fragments.keys() {
            if registry.get(id).is_none() {
                warn!("content for unregistered section '{}' will not be rendered", id);
            }
        }
        Ok(source)
    }

    pub fn insert(&mut self, id: &str, html: impl Into<String>) {
        self.fragments.insert(id.to_string(), html.into());
    }

    pub fn fragment(&self, id: &str) -> Option<&str> {
        self.fragments.get(id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_registered_section() {
        let src = ContentSource::builtin();
        for e in SectionRegistry::global().list() {
            assert!(src.fragment(&e.id).is_some(), "missing content for {}", e.id);
        }
    }

    #[test]
    fn from_dir_overrides_and_falls_back() {
        let dir = std::env::temp_dir().join(format!("bi1docs-content-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("power.html"), "<p>Custom power notes</p>").unwrap();

        let src = ContentSource::from_dir(&dir, SectionRegistry::global()).unwrap();
        assert_eq!(src.fragment("power"), Some("<p>Custom power notes</p>"));
        assert!(src.fragment("team").unwrap().contains("Mechanical"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_dir_is_a_config_error() {
        let res = ContentSource::from_dir(Path::new("/definitely/not/here"), SectionRegistry::global());
        assert!(matches!(res, Err(Error::ConfigError(_))));
    }
}
