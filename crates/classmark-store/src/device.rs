//! Local device snapshot.
//!
//! What the device remembers between runs: whether a student is signed
//! in, who, and the last result recorded here. One small JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use classmark_core::results::{ResultRecord, StudentIdentity};

/// Snapshot persisted on the local device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    #[serde(default)]
    pub signed_in: bool,
    #[serde(default)]
    pub student: Option<StudentIdentity>,
    #[serde(default)]
    pub last_result: Option<ResultRecord>,
}

/// Reads and writes the device snapshot file.
pub struct LocalDeviceStore {
    path: PathBuf,
}

impl LocalDeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default snapshot location, `~/.config/classmark/device.json`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("classmark")
                .join("device.json")
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot. A missing file is an empty snapshot.
    pub fn load(&self) -> Result<DeviceSnapshot> {
        if !self.path.exists() {
            return Ok(DeviceSnapshot::default());
        }
        let content = fs::read_to_string(&self.path).with_context(|| {
            format!("failed to read device snapshot from {}", self.path.display())
        })?;
        let snapshot = serde_json::from_str(&content).with_context(|| {
            format!("failed to parse device snapshot from {}", self.path.display())
        })?;
        Ok(snapshot)
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, snapshot: &DeviceSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(snapshot).context("failed to serialize device snapshot")?;
        fs::write(&self.path, json).with_context(|| {
            format!("failed to write device snapshot to {}", self.path.display())
        })?;
        Ok(())
    }

    /// Mark a student as signed in on this device.
    pub fn record_sign_in(&self, student: &StudentIdentity) -> Result<DeviceSnapshot> {
        let mut snapshot = self.load()?;
        snapshot.signed_in = true;
        snapshot.student = Some(student.clone());
        self.save(&snapshot)?;
        Ok(snapshot)
    }

    /// Remember the last result recorded on this device.
    pub fn record_result(&self, record: &ResultRecord) -> Result<DeviceSnapshot> {
        let mut snapshot = self.load()?;
        snapshot.last_result = Some(record.clone());
        self.save(&snapshot)?;
        Ok(snapshot)
    }

    /// Sign out and forget everything.
    pub fn clear(&self) -> Result<()> {
        self.save(&DeviceSnapshot::default())
    }
}
