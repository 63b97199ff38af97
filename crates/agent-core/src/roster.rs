//! Student roster collaborator.
//!
//! `add_student` / `remove_student` commands mutate this registry and
//! nothing else; scoring state is untouched. The file is read once at
//! startup and rewritten atomically on every mutation, tolerating a
//! missing or corrupt file by starting empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bridge::write_json_atomic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterFile {
    students: BTreeMap<String, StudentRecord>,
}

#[derive(Debug)]
pub struct Roster {
    path: PathBuf,
    students: BTreeMap<String, StudentRecord>,
}

impl Roster {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let students = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<RosterFile>(&raw) {
                Ok(file) => file.students,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "corrupt roster discarded");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "roster unreadable; starting empty");
                BTreeMap::new()
            }
        };
        Self { path, students }
    }

    /// Returns false when the student already exists.
    pub fn add_student(&mut self, student_id: &str, name: &str) -> Result<bool> {
        if self.students.contains_key(student_id) {
            return Ok(false);
        }
        self.students.insert(
            student_id.to_string(),
            StudentRecord {
                name: name.to_string(),
            },
        );
        self.save()?;
        info!(student_id, name, "student added to roster");
        Ok(true)
    }

    /// Returns false when the student was not present.
    pub fn remove_student(&mut self, student_id: &str) -> Result<bool> {
        if self.students.remove(student_id).is_none() {
            return Ok(false);
        }
        self.save()?;
        info!(student_id, "student removed from roster");
        Ok(true)
    }

    pub fn student_name(&self, student_id: &str) -> Option<&str> {
        self.students.get(student_id).map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    fn save(&self) -> Result<()> {
        write_json_atomic(
            &self.path,
            &RosterFile {
                students: self.students.clone(),
            },
        )
    }
}
