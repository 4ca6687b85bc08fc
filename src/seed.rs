use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::model::{Assignment, AttendanceRecord, Class, Grade, Record, Student};

const BUILTIN_STUDENTS: &str = include_str!("../fixtures/seed/students.json");
const BUILTIN_CLASSES: &str = include_str!("../fixtures/seed/classes.json");
const BUILTIN_ASSIGNMENTS: &str = include_str!("../fixtures/seed/assignments.json");
const BUILTIN_GRADES: &str = include_str!("../fixtures/seed/grades.json");
const BUILTIN_ATTENDANCE: &str = include_str!("../fixtures/seed/attendance.json");

/// Initial contents of every store. Each process start begins from one of
/// these; nothing is written back.
#[derive(Debug, Clone, Default)]
pub struct SeedSnapshot {
    pub students: Vec<Record<Student>>,
    pub classes: Vec<Record<Class>>,
    pub assignments: Vec<Record<Assignment>>,
    pub grades: Vec<Record<Grade>>,
    pub attendance: Vec<Record<AttendanceRecord>>,
}

fn load_collection<T: DeserializeOwned>(
    dir: Option<&Path>,
    file: &str,
    builtin: &str,
) -> anyhow::Result<Vec<T>> {
    if let Some(dir) = dir {
        let path = dir.join(file);
        if path.is_file() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("read seed {}", path.display()))?;
            return serde_json::from_str(&text)
                .with_context(|| format!("parse seed {}", path.display()));
        }
    }
    serde_json::from_str(builtin).with_context(|| format!("parse built-in seed {file}"))
}

impl SeedSnapshot {
    #[cfg(test)]
    pub fn builtin() -> anyhow::Result<Self> {
        Self::load(None)
    }

    /// Reads snapshots from `dir`; files absent there fall back to the
    /// compiled-in data.
    pub fn load(dir: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self {
            students: load_collection(dir, "students.json", BUILTIN_STUDENTS)?,
            classes: load_collection(dir, "classes.json", BUILTIN_CLASSES)?,
            assignments: load_collection(dir, "assignments.json", BUILTIN_ASSIGNMENTS)?,
            grades: load_collection(dir, "grades.json", BUILTIN_GRADES)?,
            attendance: load_collection(dir, "attendance.json", BUILTIN_ATTENDANCE)?,
        })
    }
}
