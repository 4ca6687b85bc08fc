use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

pub type RecordId = i64;

/// A stored entity: the collection-unique `Id` plus the entity's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub data: T,
}

/// Entity types held by a `DataStore`.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human label used in "<NAME> not found" errors.
    const NAME: &'static str;
    /// JSON key for a single record in IPC results.
    const KEY: &'static str;
    /// JSON key for the whole collection in IPC results.
    const COLLECTION: &'static str;

    /// Field-wise partial update. Carries no identifier, so a merge can never
    /// rewrite a record's `Id`.
    type Patch: Send;

    fn apply(&mut self, patch: Self::Patch);
}

// Date fields arrive from forms as "" when left blank.
fn blank_date<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(de::Error::custom),
    }
}

fn patch_blank_date<'de, D>(d: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_date(d).map(Some)
}

// Distinguishes an explicit `null` (clear the field) from an absent key.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

macro_rules! merge {
    ($target:expr, $patch:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(v) = $patch.$field {
                $target.$field = v;
            }
        )*
    };
}

// ---------------------------------------------------------------------------
// Students

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
    Graduated,
    Transferred,
}

impl StudentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Graduated => "graduated",
            StudentStatus::Transferred => "transferred",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "blank_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_date")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(default)]
    pub grade_level: String,
    /// School-issued identifier, distinct from the record `Id`.
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub status: StudentStatus,
}

impl Student {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "patch_blank_date")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_blank_date")]
    pub enrollment_date: Option<Option<NaiveDate>>,
    pub grade_level: Option<String>,
    pub student_id: Option<String>,
    pub status: Option<StudentStatus>,
}

impl Entity for Student {
    const NAME: &'static str = "Student";
    const KEY: &'static str = "student";
    const COLLECTION: &'static str = "students";
    type Patch = StudentPatch;

    fn apply(&mut self, patch: StudentPatch) {
        merge!(
            self,
            patch,
            [
                first_name,
                last_name,
                email,
                phone,
                date_of_birth,
                enrollment_date,
                grade_level,
                student_id,
                status,
            ]
        );
    }
}

// ---------------------------------------------------------------------------
// Classes

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub academic_year: String,
    /// Enrollment order. Ids are not checked against the student store.
    #[serde(default)]
    pub student_ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPatch {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub period: Option<String>,
    pub room: Option<String>,
    pub schedule: Option<String>,
    pub academic_year: Option<String>,
    pub student_ids: Option<Vec<RecordId>>,
}

impl Entity for Class {
    const NAME: &'static str = "Class";
    const KEY: &'static str = "class";
    const COLLECTION: &'static str = "classes";
    type Patch = ClassPatch;

    fn apply(&mut self, patch: ClassPatch) {
        merge!(
            self,
            patch,
            [name, subject, period, room, schedule, academic_year, student_ids]
        );
    }
}

// ---------------------------------------------------------------------------
// Assignments

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Quiz,
    Exam,
    Homework,
    Project,
    Participation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub total_points: f64,
    #[serde(default, deserialize_with = "blank_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub class_id: RecordId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AssignmentType>,
    pub total_points: Option<f64>,
    #[serde(default, deserialize_with = "patch_blank_date")]
    pub due_date: Option<Option<NaiveDate>>,
    pub description: Option<String>,
    pub class_id: Option<RecordId>,
}

impl Entity for Assignment {
    const NAME: &'static str = "Assignment";
    const KEY: &'static str = "assignment";
    const COLLECTION: &'static str = "assignments";
    type Patch = AssignmentPatch;

    fn apply(&mut self, patch: AssignmentPatch) {
        merge!(
            self,
            patch,
            [title, kind, total_points, due_date, description, class_id]
        );
    }
}

// ---------------------------------------------------------------------------
// Grades

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub student_id: RecordId,
    pub assignment_id: RecordId,
    /// Percentage, 0..=100.
    pub score: f64,
    pub submitted_date: NaiveDate,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePatch {
    pub student_id: Option<RecordId>,
    pub assignment_id: Option<RecordId>,
    pub score: Option<f64>,
    pub submitted_date: Option<NaiveDate>,
    pub comments: Option<String>,
}

impl Entity for Grade {
    const NAME: &'static str = "Grade";
    const KEY: &'static str = "grade";
    const COLLECTION: &'static str = "grades";
    type Patch = GradePatch;

    fn apply(&mut self, patch: GradePatch) {
        merge!(
            self,
            patch,
            [student_id, assignment_id, score, submitted_date, comments]
        );
    }
}

// ---------------------------------------------------------------------------
// Attendance

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Tardy,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    pub student_id: Option<RecordId>,
    pub class_id: Option<RecordId>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "present")]
    pub reason: Option<Option<String>>,
}

impl Entity for AttendanceRecord {
    const NAME: &'static str = "Attendance record";
    const KEY: &'static str = "record";
    const COLLECTION: &'static str = "attendance";
    type Patch = AttendancePatch;

    fn apply(&mut self, patch: AttendancePatch) {
        merge!(self, patch, [student_id, class_id, date, status, reason]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_id_next_to_entity_fields() {
        let rec = Record {
            id: 7,
            data: Grade {
                student_id: 1,
                assignment_id: 2,
                score: 88.5,
                submitted_date: NaiveDate::from_ymd_opt(2024, 9, 12).expect("date"),
                comments: String::new(),
            },
        };
        let v = serde_json::to_value(&rec).expect("serialize");
        assert_eq!(v["Id"], json!(7));
        assert_eq!(v["studentId"], json!(1));
        assert_eq!(v["submittedDate"], json!("2024-09-12"));
    }

    #[test]
    fn blank_form_dates_read_as_none() {
        let s: Student = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Byron",
            "dateOfBirth": "",
            "enrollmentDate": "2023-09-05"
        }))
        .expect("parse student");
        assert_eq!(s.date_of_birth, None);
        assert_eq!(s.enrollment_date, NaiveDate::from_ymd_opt(2023, 9, 5));
        assert_eq!(s.status, StudentStatus::Active);
    }

    #[test]
    fn patch_ignores_identifier_and_keeps_absent_fields() {
        let mut s: Student = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Byron",
            "email": "ada@example.edu",
            "gradeLevel": "10"
        }))
        .expect("parse student");
        let patch: StudentPatch =
            serde_json::from_value(json!({ "Id": 99, "email": "ada@school.edu" }))
                .expect("parse patch");
        s.apply(patch);
        assert_eq!(s.email, "ada@school.edu");
        assert_eq!(s.first_name, "Ada");
        assert_eq!(s.grade_level, "10");
    }

    #[test]
    fn attendance_patch_null_reason_clears_it() {
        let mut r = AttendanceRecord {
            student_id: 1,
            class_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 10, 1).expect("date"),
            status: AttendanceStatus::Absent,
            reason: Some("sick".to_string()),
        };
        let keep: AttendancePatch =
            serde_json::from_value(json!({ "status": "excused" })).expect("patch");
        r.apply(keep);
        assert_eq!(r.status, AttendanceStatus::Excused);
        assert_eq!(r.reason.as_deref(), Some("sick"));

        let clear: AttendancePatch =
            serde_json::from_value(json!({ "reason": null })).expect("patch");
        r.apply(clear);
        assert_eq!(r.reason, None);
    }
}
