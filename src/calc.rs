use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;

use crate::model::{
    Assignment, AttendanceRecord, AttendanceStatus, Class, Grade, Record, RecordId, Student,
    StudentStatus,
};

/// Number of entries shown in each dashboard activity list.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut n: usize = 0;
    let mut sum: f64 = 0.0;
    for v in values {
        n += 1;
        sum += v;
    }
    if n == 0 {
        None
    } else {
        Some(sum / (n as f64))
    }
}

/// Rounds a percentage half-up to a whole number.
pub fn round_percent(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

pub fn student_average(grades: &[Record<Grade>], student_id: RecordId) -> Option<f64> {
    mean(
        grades
            .iter()
            .filter(|g| g.data.student_id == student_id)
            .map(|g| g.data.score),
    )
}

pub fn assignment_average(grades: &[Record<Grade>], assignment_id: RecordId) -> Option<f64> {
    mean(
        grades
            .iter()
            .filter(|g| g.data.assignment_id == assignment_id)
            .map(|g| g.data.score),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    /// Whole-number percentage of `present` over `total`; 0 with no records.
    pub rate: i64,
}

fn stats_over<'a, I>(records: I) -> AttendanceStats
where
    I: IntoIterator<Item = &'a Record<AttendanceRecord>>,
{
    let mut total = 0;
    let mut present = 0;
    for r in records {
        total += 1;
        if r.data.status == AttendanceStatus::Present {
            present += 1;
        }
    }
    let rate = if total > 0 {
        round_percent(100.0 * (present as f64) / (total as f64))
    } else {
        0
    };
    AttendanceStats {
        total,
        present,
        rate,
    }
}

pub fn attendance_stats(
    records: &[Record<AttendanceRecord>],
    student_id: RecordId,
) -> AttendanceStats {
    stats_over(records.iter().filter(|r| r.data.student_id == student_id))
}

pub fn attendance_rate(records: &[Record<AttendanceRecord>], student_id: RecordId) -> i64 {
    attendance_stats(records, student_id).rate
}

// ---------------------------------------------------------------------------
// Letter bands and tones

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
    NotApplicable,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
            LetterGrade::NotApplicable => "N/A",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            LetterGrade::A => Tone::Green,
            LetterGrade::B => Tone::Blue,
            LetterGrade::C => Tone::Yellow,
            LetterGrade::D => Tone::Orange,
            LetterGrade::F => Tone::Red,
            LetterGrade::NotApplicable => Tone::Gray,
        }
    }
}

impl Serialize for LetterGrade {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Badge color family for grades and statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Blue,
    Yellow,
    Orange,
    Red,
    Gray,
}

pub fn letter_grade(score: f64) -> LetterGrade {
    if score.is_nan() {
        LetterGrade::NotApplicable
    } else if score >= 90.0 {
        LetterGrade::A
    } else if score >= 80.0 {
        LetterGrade::B
    } else if score >= 70.0 {
        LetterGrade::C
    } else if score >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

/// Bands a loosely-typed score: numbers and numeric strings are banded,
/// anything else is `N/A`.
pub fn letter_grade_value(v: &serde_json::Value) -> LetterGrade {
    let score = match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.map_or(LetterGrade::NotApplicable, letter_grade)
}

pub fn attendance_tone(status: AttendanceStatus) -> Tone {
    match status {
        AttendanceStatus::Present => Tone::Green,
        AttendanceStatus::Absent => Tone::Red,
        AttendanceStatus::Tardy => Tone::Yellow,
        AttendanceStatus::Excused => Tone::Blue,
    }
}

pub fn student_status_tone(status: StudentStatus) -> Tone {
    match status {
        StudentStatus::Active => Tone::Green,
        StudentStatus::Inactive => Tone::Gray,
        StudentStatus::Graduated => Tone::Blue,
        StudentStatus::Transferred => Tone::Yellow,
    }
}

// ---------------------------------------------------------------------------
// Roster

/// Students enrolled in `class`, in student-collection order. Ids with no
/// matching student are dropped.
pub fn enrolled_students<'a>(
    class: &Class,
    students: &'a [Record<Student>],
) -> Vec<&'a Record<Student>> {
    students
        .iter()
        .filter(|s| class.student_ids.contains(&s.id))
        .collect()
}

pub fn search_students(students: &[Record<Student>], term: &str) -> Vec<Record<Student>> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return students.to_vec();
    }
    students
        .iter()
        .filter(|s| {
            let d = &s.data;
            [&d.first_name, &d.last_name, &d.email, &d.student_id]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    StudentId,
    #[default]
    LastName,
    Email,
    GradeLevel,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

fn sort_key(s: &Student, field: SortField) -> String {
    match field {
        SortField::StudentId => s.student_id.to_lowercase(),
        SortField::LastName => s.last_name.to_lowercase(),
        SortField::Email => s.email.to_lowercase(),
        SortField::GradeLevel => s.grade_level.to_lowercase(),
        SortField::Status => s.status.as_str().to_string(),
    }
}

pub fn sort_students(students: &mut [Record<Student>], field: SortField, dir: SortDirection) {
    students.sort_by(|a, b| {
        let ord: Ordering = sort_key(&a.data, field).cmp(&sort_key(&b.data, field));
        match dir {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

// ---------------------------------------------------------------------------
// Dashboard

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_classes: usize,
    pub average_grade: i64,
    pub attendance_rate: i64,
}

pub fn dashboard_stats(
    students: &[Record<Student>],
    classes: &[Record<Class>],
    grades: &[Record<Grade>],
    attendance: &[Record<AttendanceRecord>],
) -> DashboardStats {
    let average = mean(grades.iter().map(|g| g.data.score)).unwrap_or(0.0);
    DashboardStats {
        total_students: students.len(),
        total_classes: classes.len(),
        average_grade: round_percent(average),
        attendance_rate: stats_over(attendance).rate,
    }
}

fn student_name(students: &[Record<Student>], id: RecordId) -> Option<String> {
    students
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.data.display_name())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceActivity {
    pub record: Record<AttendanceRecord>,
    pub student_name: Option<String>,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeActivity {
    pub grade: Record<Grade>,
    pub student_name: Option<String>,
    pub letter: LetterGrade,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub today_attendance: Vec<AttendanceActivity>,
    pub today_attendance_total: usize,
    pub recent_grades: Vec<GradeActivity>,
}

pub fn recent_activity(
    students: &[Record<Student>],
    grades: &[Record<Grade>],
    attendance: &[Record<AttendanceRecord>],
    today: NaiveDate,
) -> RecentActivity {
    let todays: Vec<&Record<AttendanceRecord>> =
        attendance.iter().filter(|a| a.data.date == today).collect();
    let today_attendance = todays
        .iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|a| AttendanceActivity {
            record: (*a).clone(),
            student_name: student_name(students, a.data.student_id),
            tone: attendance_tone(a.data.status),
        })
        .collect();

    let skip = grades.len().saturating_sub(RECENT_ACTIVITY_LIMIT);
    let recent_grades = grades[skip..]
        .iter()
        .map(|g| {
            let letter = letter_grade(g.data.score);
            GradeActivity {
                grade: g.clone(),
                student_name: student_name(students, g.data.student_id),
                letter,
                tone: letter.tone(),
            }
        })
        .collect();

    RecentActivity {
        today_attendance,
        today_attendance_total: todays.len(),
        recent_grades,
    }
}

// ---------------------------------------------------------------------------
// Grade book

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCell {
    pub assignment_id: RecordId,
    pub grade_id: Option<RecordId>,
    pub score: Option<f64>,
    pub letter: LetterGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookRow {
    pub student_id: RecordId,
    pub name: String,
    pub cells: Vec<GradeCell>,
    pub average: Option<f64>,
    pub letter: LetterGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradebookColumn {
    pub assignment: Record<Assignment>,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradebook {
    pub columns: Vec<GradebookColumn>,
    pub rows: Vec<GradebookRow>,
}

/// First grade stored for the (student, assignment) pair.
pub fn find_grade(
    grades: &[Record<Grade>],
    student_id: RecordId,
    assignment_id: RecordId,
) -> Option<&Record<Grade>> {
    grades
        .iter()
        .find(|g| g.data.student_id == student_id && g.data.assignment_id == assignment_id)
}

pub fn gradebook(
    students: &[Record<Student>],
    assignments: &[Record<Assignment>],
    grades: &[Record<Grade>],
) -> Gradebook {
    let columns = assignments
        .iter()
        .map(|a| GradebookColumn {
            assignment: a.clone(),
            average: assignment_average(grades, a.id),
        })
        .collect();

    let rows = students
        .iter()
        .map(|s| {
            let cells = assignments
                .iter()
                .map(|a| {
                    let g = find_grade(grades, s.id, a.id);
                    let score = g.map(|g| g.data.score);
                    GradeCell {
                        assignment_id: a.id,
                        grade_id: g.map(|g| g.id),
                        score,
                        letter: score.map_or(LetterGrade::NotApplicable, letter_grade),
                    }
                })
                .collect();
            let average = student_average(grades, s.id);
            GradebookRow {
                student_id: s.id,
                name: s.data.display_name(),
                cells,
                average,
                letter: average.map_or(LetterGrade::NotApplicable, letter_grade),
            }
        })
        .collect();

    Gradebook { columns, rows }
}

// ---------------------------------------------------------------------------
// Attendance sheet

pub fn find_attendance(
    records: &[Record<AttendanceRecord>],
    student_id: RecordId,
    date: NaiveDate,
) -> Option<&Record<AttendanceRecord>> {
    records
        .iter()
        .find(|r| r.data.student_id == student_id && r.data.date == date)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDayRow {
    pub student_id: RecordId,
    pub name: String,
    pub record_id: Option<RecordId>,
    pub status: Option<AttendanceStatus>,
    pub tone: Tone,
    pub stats: AttendanceStats,
}

pub fn attendance_day(
    students: &[Record<Student>],
    records: &[Record<AttendanceRecord>],
    date: NaiveDate,
) -> Vec<AttendanceDayRow> {
    students
        .iter()
        .map(|s| {
            let rec = find_attendance(records, s.id, date);
            let status = rec.map(|r| r.data.status);
            AttendanceDayRow {
                student_id: s.id,
                name: s.data.display_name(),
                record_id: rec.map(|r| r.id),
                status,
                tone: status.map_or(Tone::Gray, attendance_tone),
                stats: attendance_stats(records, s.id),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedSnapshot;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn grade(id: RecordId, student_id: RecordId, assignment_id: RecordId, score: f64) -> Record<Grade> {
        Record {
            id,
            data: Grade {
                student_id,
                assignment_id,
                score,
                submitted_date: day(2024, 10, 1),
                comments: String::new(),
            },
        }
    }

    fn mark(id: RecordId, student_id: RecordId, status: AttendanceStatus) -> Record<AttendanceRecord> {
        Record {
            id,
            data: AttendanceRecord {
                student_id,
                class_id: 1,
                date: day(2024, 10, id as u32),
                status,
                reason: None,
            },
        }
    }

    #[test]
    fn student_average_is_plain_mean() {
        let grades = vec![grade(1, 1, 1, 80.0), grade(2, 1, 2, 90.0), grade(3, 1, 3, 70.0)];
        assert_eq!(student_average(&grades, 1), Some(80.0));
        assert_eq!(student_average(&grades, 2), None);
    }

    #[test]
    fn assignment_average_filters_by_assignment() {
        let grades = vec![grade(1, 1, 7, 100.0), grade(2, 2, 7, 50.0), grade(3, 3, 8, 10.0)];
        assert_eq!(assignment_average(&grades, 7), Some(75.0));
        assert_eq!(assignment_average(&grades, 9), None);
    }

    #[test]
    fn attendance_rate_counts_only_present() {
        use AttendanceStatus::{Absent, Present, Tardy};
        let records = vec![
            mark(1, 4, Present),
            mark(2, 4, Present),
            mark(3, 4, Absent),
            mark(4, 4, Tardy),
        ];
        assert_eq!(attendance_rate(&records, 4), 50);
        assert_eq!(
            attendance_stats(&records, 4),
            AttendanceStats { total: 4, present: 2, rate: 50 }
        );
        assert_eq!(attendance_rate(&records, 5), 0);
    }

    #[test]
    fn attendance_rate_rounds_to_nearest() {
        use AttendanceStatus::{Absent, Present};
        let records = vec![mark(1, 1, Present), mark(2, 1, Present), mark(3, 1, Absent)];
        assert_eq!(attendance_rate(&records, 1), 67);
    }

    #[test]
    fn letter_bands_at_boundaries() {
        assert_eq!(letter_grade(90.0), LetterGrade::A);
        assert_eq!(letter_grade(89.999), LetterGrade::B);
        assert_eq!(letter_grade(80.0), LetterGrade::B);
        assert_eq!(letter_grade(70.0), LetterGrade::C);
        assert_eq!(letter_grade(60.0), LetterGrade::D);
        assert_eq!(letter_grade(59.999), LetterGrade::F);
        assert_eq!(letter_grade(f64::NAN), LetterGrade::NotApplicable);
        assert_eq!(letter_grade_value(&json!("abc")), LetterGrade::NotApplicable);
        assert_eq!(letter_grade_value(&json!(null)), LetterGrade::NotApplicable);
        assert_eq!(letter_grade_value(&json!("85")), LetterGrade::B);
        assert_eq!(letter_grade_value(&json!(92.5)), LetterGrade::A);
        assert_eq!(LetterGrade::NotApplicable.as_str(), "N/A");
    }

    #[test]
    fn roster_drops_dangling_ids() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let class = &seed.classes[0].data;
        let ids: Vec<RecordId> = enrolled_students(class, &seed.students)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 5]);
    }

    #[test]
    fn search_matches_names_email_and_external_id() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let by_name = search_students(&seed.students, "  OLIV ");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].data.first_name, "Olivia");

        let by_ext = search_students(&seed.students, "stu00");
        assert_eq!(by_ext.len(), 8);

        assert_eq!(search_students(&seed.students, "").len(), 8);
        assert!(search_students(&seed.students, "nobody-here").is_empty());
    }

    #[test]
    fn sort_by_last_name_both_directions() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let mut students = seed.students.clone();
        sort_students(&mut students, SortField::LastName, SortDirection::Asc);
        assert_eq!(students[0].data.last_name, "Anderson");
        sort_students(&mut students, SortField::LastName, SortDirection::Desc);
        assert_eq!(students[0].data.last_name, "Wilson");
    }

    #[test]
    fn dashboard_numbers_from_seed() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let stats = dashboard_stats(&seed.students, &seed.classes, &seed.grades, &seed.attendance);
        assert_eq!(
            stats,
            DashboardStats {
                total_students: 8,
                total_classes: 3,
                average_grade: 80,
                attendance_rate: 58,
            }
        );
        let empty = dashboard_stats(&[], &[], &[], &[]);
        assert_eq!((empty.average_grade, empty.attendance_rate), (0, 0));
    }

    #[test]
    fn recent_activity_limits_lists() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let act = recent_activity(&seed.students, &seed.grades, &seed.attendance, day(2024, 10, 14));
        assert_eq!(act.today_attendance_total, 6);
        assert_eq!(act.today_attendance.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(act.today_attendance[0].student_name.as_deref(), Some("Emma Johnson"));

        let grade_ids: Vec<RecordId> = act.recent_grades.iter().map(|g| g.grade.id).collect();
        assert_eq!(grade_ids, vec![6, 7, 8, 9, 10]);
        assert_eq!(act.recent_grades[4].letter, LetterGrade::A);
    }

    #[test]
    fn gradebook_rows_and_columns() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let book = gradebook(&seed.students, &seed.assignments, &seed.grades);
        assert_eq!(book.columns.len(), 4);
        assert_eq!(book.columns[0].average, Some(81.75));

        let emma = &book.rows[0];
        assert_eq!(emma.average, Some(90.0));
        assert_eq!(emma.letter, LetterGrade::A);
        assert_eq!(emma.cells[3].score, None);
        assert_eq!(emma.cells[3].letter, LetterGrade::NotApplicable);

        let noah = book.rows.iter().find(|r| r.student_id == 4).expect("noah");
        assert_eq!(noah.average, None);
    }

    #[test]
    fn attendance_day_sheet() {
        let seed = SeedSnapshot::builtin().expect("seed");
        let rows = attendance_day(&seed.students, &seed.attendance, day(2024, 10, 15));
        assert_eq!(rows.len(), 8);
        let liam = &rows[1];
        assert_eq!(liam.status, Some(AttendanceStatus::Present));
        assert_eq!(liam.stats, AttendanceStats { total: 2, present: 1, rate: 50 });
        let noah = &rows[3];
        assert_eq!(noah.status, None);
        assert_eq!(noah.tone, Tone::Gray);
    }
}
