use chrono::NaiveDate;
use tracing::info;

use crate::calc;
use crate::model::{
    Assignment, AttendancePatch, AttendanceRecord, AttendanceStatus, Class, Grade, GradePatch,
    Record, RecordId, Student,
};
use crate::seed::SeedSnapshot;
use crate::store::{DataStore, Latency, StoreResult};

/// Class used for attendance marks that arrive without one.
pub const DEFAULT_CLASS_ID: RecordId = 1;

/// Owns one store per entity type. Built once at startup and lent to every
/// request handler.
pub struct Hub {
    pub students: DataStore<Student>,
    pub classes: DataStore<Class>,
    pub assignments: DataStore<Assignment>,
    pub grades: DataStore<Grade>,
    pub attendance: DataStore<AttendanceRecord>,
}

pub struct DashboardData {
    pub students: Vec<Record<Student>>,
    pub classes: Vec<Record<Class>>,
    pub attendance: Vec<Record<AttendanceRecord>>,
    pub grades: Vec<Record<Grade>>,
}

pub struct GradebookData {
    pub students: Vec<Record<Student>>,
    pub assignments: Vec<Record<Assignment>>,
    pub grades: Vec<Record<Grade>>,
}

pub struct AttendanceData {
    pub students: Vec<Record<Student>>,
    pub attendance: Vec<Record<AttendanceRecord>>,
}

pub struct ClassesData {
    pub classes: Vec<Record<Class>>,
    pub students: Vec<Record<Student>>,
}

impl Hub {
    pub fn new(seed: SeedSnapshot, latency: Latency) -> Self {
        info!(
            students = seed.students.len(),
            classes = seed.classes.len(),
            assignments = seed.assignments.len(),
            grades = seed.grades.len(),
            attendance = seed.attendance.len(),
            "stores seeded"
        );
        Self {
            students: DataStore::new(seed.students, latency),
            classes: DataStore::new(seed.classes, latency),
            assignments: DataStore::new(seed.assignments, latency),
            grades: DataStore::new(seed.grades, latency),
            attendance: DataStore::new(seed.attendance, latency),
        }
    }

    // Page loaders: every read runs concurrently and the first failure
    // discards the whole batch.

    pub async fn load_dashboard(&self) -> StoreResult<DashboardData> {
        let (students, classes, attendance, grades) = tokio::try_join!(
            self.students.get_all(),
            self.classes.get_all(),
            self.attendance.get_all(),
            self.grades.get_all()
        )?;
        Ok(DashboardData {
            students,
            classes,
            attendance,
            grades,
        })
    }

    pub async fn load_gradebook(&self) -> StoreResult<GradebookData> {
        let (students, assignments, grades) = tokio::try_join!(
            self.students.get_all(),
            self.assignments.get_all(),
            self.grades.get_all()
        )?;
        Ok(GradebookData {
            students,
            assignments,
            grades,
        })
    }

    pub async fn load_attendance(&self) -> StoreResult<AttendanceData> {
        let (students, attendance) =
            tokio::try_join!(self.students.get_all(), self.attendance.get_all())?;
        Ok(AttendanceData {
            students,
            attendance,
        })
    }

    pub async fn load_classes(&self) -> StoreResult<ClassesData> {
        let (classes, students) =
            tokio::try_join!(self.classes.get_all(), self.students.get_all())?;
        Ok(ClassesData { classes, students })
    }

    /// Stores `score` for the pair: rewrites the existing grade's score and
    /// submission date, or creates a grade with empty comments.
    pub async fn record_grade(
        &self,
        student_id: RecordId,
        assignment_id: RecordId,
        score: f64,
        submitted: NaiveDate,
    ) -> StoreResult<Record<Grade>> {
        let grades = self.grades.get_all().await?;
        match calc::find_grade(&grades, student_id, assignment_id) {
            Some(existing) => {
                let patch = GradePatch {
                    score: Some(score),
                    submitted_date: Some(submitted),
                    ..Default::default()
                };
                self.grades.update(existing.id, patch).await
            }
            None => {
                self.grades
                    .create(Grade {
                        student_id,
                        assignment_id,
                        score,
                        submitted_date: submitted,
                        comments: String::new(),
                    })
                    .await
            }
        }
    }

    /// Sets the student's status for `date`, creating the day's record under
    /// `class_id` when none exists yet.
    pub async fn mark_attendance(
        &self,
        student_id: RecordId,
        date: NaiveDate,
        status: AttendanceStatus,
        class_id: RecordId,
    ) -> StoreResult<Record<AttendanceRecord>> {
        let records = self.attendance.get_all().await?;
        match calc::find_attendance(&records, student_id, date) {
            Some(existing) => {
                let patch = AttendancePatch {
                    status: Some(status),
                    ..Default::default()
                };
                self.attendance.update(existing.id, patch).await
            }
            None => {
                self.attendance
                    .create(AttendanceRecord {
                        student_id,
                        class_id,
                        date,
                        status,
                        reason: None,
                    })
                    .await
            }
        }
    }
}
