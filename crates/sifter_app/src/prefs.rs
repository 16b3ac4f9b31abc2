//! Per-tab preference persistence.
//!
//! One RON document holds every tab's record. Writes go through a sibling
//! temp file and a rename so a crash never leaves a half-written document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sifter_core::TabId;
use sift_logging::sift_warn;

const PREFS_FILENAME: &str = ".sifter_prefs.ron";

/// Saved settings for one tab. Absent fields fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TabPrefs {
    pub discount: Option<u8>,
    pub optimize: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefsDocument {
    tabs: BTreeMap<TabId, TabPrefs>,
}

/// Handle on the preference document in a given directory.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(PREFS_FILENAME),
        }
    }

    /// The saved record for one tab; defaults when nothing was saved.
    pub fn tab_prefs(&self, tab: TabId) -> TabPrefs {
        self.load().tabs.get(&tab).copied().unwrap_or_default()
    }

    /// Persist a threshold change, leaving the tab's other settings alone.
    pub fn save_discount(&self, tab: TabId, value: u8) -> io::Result<()> {
        let mut doc = self.load();
        doc.tabs.entry(tab).or_default().discount = Some(value);
        self.write(&doc)
    }

    /// Persist the full record for one tab.
    pub fn save_tab_prefs(&self, tab: TabId, discount: u8, optimize: bool) -> io::Result<()> {
        let mut doc = self.load();
        doc.tabs.insert(
            tab,
            TabPrefs {
                discount: Some(discount),
                optimize: Some(optimize),
            },
        );
        self.write(&doc)
    }

    /// An unreadable or unparseable document degrades to defaults; losing
    /// saved settings is preferable to refusing to run.
    fn load(&self) -> PrefsDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return PrefsDocument::default();
            }
            Err(err) => {
                sift_warn!("failed to read preferences from {:?}: {}", self.path, err);
                return PrefsDocument::default();
            }
        };

        match ron::from_str(&content) {
            Ok(doc) => doc,
            Err(err) => {
                sift_warn!("failed to parse preferences from {:?}: {}", self.path, err);
                PrefsDocument::default()
            }
        }
    }

    fn write(&self, doc: &PrefsDocument) -> io::Result<()> {
        let content = ron::ser::to_string_pretty(doc, ron::ser::PrettyConfig::new())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        let temp = self.path.with_extension("ron.tmp");
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)
    }
}
