//! Per-career proposal pages.
//!
//! A holder's assignments are flattened into [`ReportRow`]s, bucketed by
//! career, and each bucket becomes one [`ReportPage`] carrying the metadata
//! printed around its table (period, responsible unit, signer, observations).

use std::collections::BTreeMap;

use crate::aggregate::UNKNOWN_CAREER;
use crate::normalize::{compare_es, most_frequent_non_empty, pad_subject_code, zero_pad2};
use crate::records::{field, AssignmentRecord, RosterEntry};

/// Responsible unit printed when nothing better is known.
pub const DEFAULT_UNIT: &str = "DIVISIÓN DE CIENCIAS FÍSICO MATEMÁTICAS Y LAS INGENIERÍAS";
/// Signer printed when nothing better is known.
pub const DEFAULT_SIGNER: &str = "ING. JORGE ARTURO LOPEZ HERNANDEZ";
/// Period printed when no record carries a usable date.
pub const DEFAULT_PERIOD: &str = "2024-I";
/// Movement type used when a record has none.
pub const DEFAULT_MOVEMENT: &str = "A";

/// The table columns of a proposal form, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowField {
    Movement,
    Cause,
    Category,
    StartDay,
    StartMonth,
    StartYear,
    EndDay,
    EndMonth,
    EndYear,
    StudyPlan,
    SubjectCode,
    SubjectName,
    Group,
    Theoretical,
    Practical,
    Total,
    Schedule,
    Room,
}

impl RowField {
    pub const ALL: [RowField; 18] = [
        RowField::Movement,
        RowField::Cause,
        RowField::Category,
        RowField::StartDay,
        RowField::StartMonth,
        RowField::StartYear,
        RowField::EndDay,
        RowField::EndMonth,
        RowField::EndYear,
        RowField::StudyPlan,
        RowField::SubjectCode,
        RowField::SubjectName,
        RowField::Group,
        RowField::Theoretical,
        RowField::Practical,
        RowField::Total,
        RowField::Schedule,
        RowField::Room,
    ];

    /// Stable short key, used by column descriptors.
    pub fn key(self) -> &'static str {
        match self {
            RowField::Movement => "mov",
            RowField::Cause => "causa",
            RowField::Category => "cat",
            RowField::StartDay => "iD",
            RowField::StartMonth => "iM",
            RowField::StartYear => "iA",
            RowField::EndDay => "tD",
            RowField::EndMonth => "tM",
            RowField::EndYear => "tA",
            RowField::StudyPlan => "plan",
            RowField::SubjectCode => "cve",
            RowField::SubjectName => "asig",
            RowField::Group => "grupo",
            RowField::Theoretical => "teo",
            RowField::Practical => "pra",
            RowField::Total => "tot",
            RowField::Schedule => "hor",
            RowField::Room => "salon",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// One flattened table row: display strings plus the numeric hours used for
/// footer totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    pub movement: String,
    pub cause: String,
    pub category: String,
    pub start_day: String,
    pub start_month: String,
    pub start_year: String,
    pub end_day: String,
    pub end_month: String,
    pub end_year: String,
    pub study_plan: String,
    pub subject_code: String,
    pub subject_name: String,
    pub group: String,
    pub theoretical: i64,
    pub practical: i64,
    pub total: i64,
    pub schedule: String,
    pub room: String,
}

impl ReportRow {
    pub fn from_record(r: &AssignmentRecord) -> Self {
        let theoretical = r.theoretical();
        let practical = r.practical();
        Self {
            movement: r
                .movement_type
                .clone()
                .unwrap_or_else(|| DEFAULT_MOVEMENT.to_string()),
            cause: field(&r.cause).to_string(),
            category: field(&r.category).to_string(),
            start_day: zero_pad2(r.start_day.as_deref()),
            start_month: zero_pad2(r.start_month.as_deref()),
            start_year: zero_pad2(r.start_year.as_deref()),
            end_day: zero_pad2(r.end_day.as_deref()),
            end_month: zero_pad2(r.end_month.as_deref()),
            end_year: zero_pad2(r.end_year.as_deref()),
            study_plan: field(&r.study_plan).to_string(),
            subject_code: pad_subject_code(r.subject_code.as_deref()),
            subject_name: field(&r.subject_name).to_string(),
            group: field(&r.group).to_string(),
            theoretical,
            practical,
            total: r.total(),
            schedule: field(&r.schedule).to_string(),
            room: field(&r.room).to_string(),
        }
    }

    /// Display text of one column.
    pub fn cell(&self, f: RowField) -> String {
        match f {
            RowField::Movement => self.movement.clone(),
            RowField::Cause => self.cause.clone(),
            RowField::Category => self.category.clone(),
            RowField::StartDay => self.start_day.clone(),
            RowField::StartMonth => self.start_month.clone(),
            RowField::StartYear => self.start_year.clone(),
            RowField::EndDay => self.end_day.clone(),
            RowField::EndMonth => self.end_month.clone(),
            RowField::EndYear => self.end_year.clone(),
            RowField::StudyPlan => self.study_plan.clone(),
            RowField::SubjectCode => self.subject_code.clone(),
            RowField::SubjectName => self.subject_name.clone(),
            RowField::Group => self.group.clone(),
            RowField::Theoretical => self.theoretical.to_string(),
            RowField::Practical => self.practical.to_string(),
            RowField::Total => self.total.to_string(),
            RowField::Schedule => self.schedule.clone(),
            RowField::Room => self.room.clone(),
        }
    }
}

/// One career's page of a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    pub period: String,
    pub career: String,
    pub unit: String,
    pub signer: String,
    pub observations: String,
    pub rows: Vec<ReportRow>,
}

/// Caller-supplied metadata that replaces whatever the data says.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOverrides {
    pub period: Option<String>,
    pub unit: Option<String>,
    pub signer: Option<String>,
    pub observations: Option<String>,
}

impl PageOverrides {
    pub fn apply(&self, page: &mut ReportPage) {
        let set = |slot: &mut String, value: &Option<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                *slot = v.to_string();
            }
        };
        set(&mut page.period, &self.period);
        set(&mut page.unit, &self.unit);
        set(&mut page.signer, &self.signer);
        set(&mut page.observations, &self.observations);
    }
}

/// Meta values the roster holds for one career.
#[derive(Debug, Default)]
struct CareerMeta {
    unit: Option<String>,
    signer: Option<String>,
    observations: Option<String>,
}

fn career_of(r: &AssignmentRecord) -> Option<&str> {
    r.career.as_deref()
}

/// Rows of one career plus the records they came from.
struct Bucket<'a> {
    career: String,
    rows: Vec<ReportRow>,
    sources: Vec<&'a AssignmentRecord>,
}

impl<'a> Bucket<'a> {
    fn find_or_push<'b>(buckets: &'b mut Vec<Bucket<'a>>, career: &str) -> &'b mut Bucket<'a> {
        let pos = match buckets.iter().position(|b| b.career == career) {
            Some(pos) => pos,
            None => {
                buckets.push(Bucket {
                    career: career.to_string(),
                    rows: Vec::new(),
                    sources: Vec::new(),
                });
                buckets.len() - 1
            }
        };
        &mut buckets[pos]
    }
}

/// Group one holder's records into career pages.
///
/// - Careers come from the roster first, then from the records; a record
///   with a blank career goes to the most frequent roster career (else the
///   most frequent record career, else `unknown`).
/// - With no records at all, every roster career gets one template row
///   taken from the roster, so a known holder still yields pages.
/// - Unit, signer and observations: plurality within the page's records,
///   then plurality within the roster entries for that career, then the
///   defaults.
/// - Period: plurality of explicit period labels in the page, else inferred
///   from the first record carrying a year, else [`DEFAULT_PERIOD`].
///
/// Pages are sorted by career label.
pub fn group_by_career(records: &[AssignmentRecord], roster: &[RosterEntry]) -> Vec<ReportPage> {
    let roster_careers: Vec<&str> = roster.iter().filter_map(|p| career_of(p)).collect();
    let record_careers: Vec<&str> = records.iter().filter_map(career_of).collect();

    let default_career = most_frequent_non_empty(roster_careers.iter().copied())
        .or_else(|| most_frequent_non_empty(record_careers.iter().copied()))
        .unwrap_or_else(|| UNKNOWN_CAREER.to_string());

    let mut careers: Vec<String> = Vec::new();
    for c in roster_careers.iter().chain(record_careers.iter()) {
        if !careers.iter().any(|k| k == c) {
            careers.push(c.to_string());
        }
    }
    if careers.is_empty() {
        careers.push(default_career.clone());
    }

    let mut buckets: Vec<Bucket> = Vec::new();
    for r in records {
        let career = career_of(r).unwrap_or(&default_career);
        let bucket = Bucket::find_or_push(&mut buckets, career);
        bucket.rows.push(ReportRow::from_record(r));
        bucket.sources.push(r);
    }

    if records.is_empty() {
        if let Some(first) = roster.first() {
            for career in &careers {
                let template = roster
                    .iter()
                    .find(|p| career_of(p) == Some(career.as_str()))
                    .unwrap_or(first);
                Bucket::find_or_push(&mut buckets, career)
                    .rows
                    .push(ReportRow::from_record(template));
            }
        }
    }

    let inferred_period = records
        .iter()
        .find(|r| r.has_year())
        .map(|r| r.filing_period().to_string());

    let mut pages: Vec<ReportPage> = buckets
        .into_iter()
        .map(|Bucket { career, rows, sources }| {
            let meta = roster_meta(roster, &career);

            ReportPage {
                period: vote(&sources, |r| r.period.as_deref())
                    .or_else(|| inferred_period.clone())
                    .unwrap_or_else(|| DEFAULT_PERIOD.to_string()),
                unit: vote(&sources, |r| r.unit.as_deref())
                    .or(meta.unit)
                    .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
                signer: vote(&sources, |r| r.signer.as_deref())
                    .or(meta.signer)
                    .unwrap_or_else(|| DEFAULT_SIGNER.to_string()),
                observations: vote(&sources, |r| r.observations.as_deref())
                    .or(meta.observations)
                    .unwrap_or_default(),
                career,
                rows,
            }
        })
        .collect();

    pages.sort_by(|a, b| compare_es(&a.career, &b.career));
    pages
}

fn vote(sources: &[&AssignmentRecord], pick: fn(&AssignmentRecord) -> Option<&str>) -> Option<String> {
    most_frequent_non_empty(sources.iter().filter_map(|r| pick(r)))
}

fn roster_meta(roster: &[RosterEntry], career: &str) -> CareerMeta {
    let entries: Vec<&RosterEntry> = roster
        .iter()
        .filter(|p| career_of(p) == Some(career))
        .collect();
    CareerMeta {
        unit: most_frequent_non_empty(entries.iter().filter_map(|p| p.unit.as_deref())),
        signer: most_frequent_non_empty(entries.iter().filter_map(|p| p.signer.as_deref())),
        observations: most_frequent_non_empty(
            entries.iter().filter_map(|p| p.observations.as_deref()),
        ),
    }
}

/// Everything known about one worker number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerGroup {
    pub worker: i64,
    pub records: Vec<AssignmentRecord>,
    pub roster: Vec<RosterEntry>,
}

/// Group records and roster entries by integer worker number, ascending.
/// Entries whose worker number is blank, zero or not a number are left out.
pub fn group_by_worker(records: &[AssignmentRecord], roster: &[RosterEntry]) -> Vec<WorkerGroup> {
    fn entry(groups: &mut BTreeMap<i64, WorkerGroup>, worker: i64) -> &mut WorkerGroup {
        groups.entry(worker).or_insert_with(|| WorkerGroup {
            worker,
            ..Default::default()
        })
    }

    let mut groups: BTreeMap<i64, WorkerGroup> = BTreeMap::new();
    for r in records.iter().filter(|r| r.worker_id() != 0) {
        entry(&mut groups, r.worker_id()).records.push(r.clone());
    }
    for p in roster.iter().filter(|p| p.worker_id() != 0) {
        entry(&mut groups, p.worker_id()).roster.push(p.clone());
    }
    groups.into_values().collect()
}

/// The pages of one holder's proposal document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderProposal {
    pub worker: i64,
    pub display_name: String,
    pub pages: Vec<ReportPage>,
}

impl WorkerGroup {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.roster.is_empty()
    }

    /// Most frequent name across roster and records, else `Trabajador <n>`.
    pub fn display_name(&self) -> String {
        let names = self
            .roster
            .iter()
            .filter_map(|p| p.name.as_deref())
            .chain(self.records.iter().filter_map(|r| r.name.as_deref()));
        most_frequent_non_empty(names).unwrap_or_else(|| format!("Trabajador {}", self.worker))
    }

    pub fn proposal(&self) -> HolderProposal {
        HolderProposal {
            worker: self.worker,
            display_name: self.display_name(),
            pages: group_by_career(&self.records, &self.roster),
        }
    }
}

/// Proposal for one worker number, `None` when nothing at all is known
/// about it.
pub fn proposal_for_worker(
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    worker: i64,
) -> Option<HolderProposal> {
    let group = WorkerGroup {
        worker,
        records: records
            .iter()
            .filter(|r| r.worker_id() == worker)
            .cloned()
            .collect(),
        roster: roster
            .iter()
            .filter(|p| p.worker_id() == worker)
            .cloned()
            .collect(),
    };
    (!group.is_empty()).then(|| group.proposal())
}

/// Proposals for every worker number, ascending.
pub fn proposals_for_all(records: &[AssignmentRecord], roster: &[RosterEntry]) -> Vec<HolderProposal> {
    group_by_worker(records, roster)
        .iter()
        .map(WorkerGroup::proposal)
        .filter(|p| !p.pages.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(worker: &str, career: &str) -> AssignmentRecord {
        AssignmentRecord {
            worker_number: Some(worker.into()),
            career: (!career.is_empty()).then(|| career.into()),
            ..Default::default()
        }
    }

    fn roster(worker: &str, career: &str) -> RosterEntry {
        RosterEntry(rec(worker, career))
    }

    #[test]
    fn test_row_from_record_formats_cells() {
        let r = AssignmentRecord {
            start_day: Some("7".into()),
            subject_code: Some("17".into()),
            theoretical_hours: Some("3".into()),
            practical_hours: Some("2".into()),
            ..Default::default()
        };
        let row = ReportRow::from_record(&r);
        assert_eq!(row.movement, "A");
        assert_eq!(row.start_day, "07");
        assert_eq!(row.end_month, "00");
        assert_eq!(row.subject_code, "0017");
        assert_eq!(row.total, 5);
        assert_eq!(row.cell(RowField::Total), "5");
        assert_eq!(row.cell(RowField::SubjectCode), "0017");
    }

    #[test]
    fn test_row_field_keys_round_trip() {
        for f in RowField::ALL {
            assert_eq!(RowField::from_key(f.key()), Some(f));
        }
    }

    #[test]
    fn test_pages_sorted_by_career() {
        let records = vec![rec("1", "MECÁNICA"), rec("1", "ARQUITECTURA"), rec("1", "MECÁNICA")];
        let pages = group_by_career(&records, &[]);
        let careers: Vec<_> = pages.iter().map(|p| p.career.as_str()).collect();
        assert_eq!(careers, vec!["ARQUITECTURA", "MECÁNICA"]);
        assert_eq!(pages[1].rows.len(), 2);
    }

    #[test]
    fn test_blank_career_uses_roster_plurality() {
        let roster = vec![roster("1", "ICO"), roster("1", "IME"), roster("1", "ICO")];
        let pages = group_by_career(&[rec("1", "")], &roster);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].career, "ICO");
    }

    #[test]
    fn test_blank_career_without_any_label_is_unknown() {
        let pages = group_by_career(&[rec("1", "")], &[]);
        assert_eq!(pages[0].career, UNKNOWN_CAREER);
    }

    #[test]
    fn test_roster_only_holder_gets_one_row_per_career() {
        let roster = vec![roster("1", "ICO"), roster("1", "IME"), roster("1", "ICO")];
        let pages = group_by_career(&[], &roster);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.rows.len() == 1));
    }

    #[test]
    fn test_metadata_plurality_first_seen_wins() {
        let mut a = rec("1", "ICO");
        a.unit = Some("U1".into());
        let mut b = rec("1", "ICO");
        b.unit = Some("U2".into());
        let pages = group_by_career(&[a.clone(), b.clone()], &[]);
        assert_eq!(pages[0].unit, "U1");
        let pages = group_by_career(&[b, a], &[]);
        assert_eq!(pages[0].unit, "U2");
    }

    #[test]
    fn test_metadata_falls_back_to_roster_then_default() {
        let mut p = rec("1", "ICO");
        p.signer = Some("DR. X".into());
        let pages = group_by_career(&[rec("1", "ICO")], &[RosterEntry(p)]);
        assert_eq!(pages[0].signer, "DR. X");
        assert_eq!(pages[0].unit, DEFAULT_UNIT);
        assert_eq!(pages[0].observations, "");
    }

    #[test]
    fn test_period_from_label_then_inference_then_default() {
        let mut labelled = rec("1", "ICO");
        labelled.period = Some("2025-II".into());
        assert_eq!(group_by_career(&[labelled], &[])[0].period, "2025-II");

        let mut dated = rec("1", "ICO");
        dated.end_year = Some("25".into());
        dated.end_month = Some("3".into());
        assert_eq!(group_by_career(&[dated], &[])[0].period, "2025-I");

        assert_eq!(group_by_career(&[rec("1", "ICO")], &[])[0].period, DEFAULT_PERIOD);
    }

    #[test]
    fn test_overrides_win() {
        let mut pages = group_by_career(&[rec("1", "ICO")], &[]);
        let overrides = PageOverrides {
            period: Some("2026-I".into()),
            signer: Some("  ".into()),
            ..Default::default()
        };
        overrides.apply(&mut pages[0]);
        assert_eq!(pages[0].period, "2026-I");
        assert_eq!(pages[0].signer, DEFAULT_SIGNER);
    }

    #[test]
    fn test_group_by_worker_sorted_and_filtered() {
        let records = vec![rec("20", "A"), rec("3", "A"), rec("", "A"), rec("x", "A"), rec("20", "B")];
        let groups = group_by_worker(&records, &[roster("3", "A")]);
        let workers: Vec<_> = groups.iter().map(|g| g.worker).collect();
        assert_eq!(workers, vec![3, 20]);
        assert_eq!(groups[1].records.len(), 2);
        assert_eq!(groups[0].roster.len(), 1);
    }

    #[test]
    fn test_display_name() {
        let mut a = rec("5", "A");
        a.name = Some("ANA".into());
        let group = WorkerGroup {
            worker: 5,
            records: vec![a],
            roster: vec![],
        };
        assert_eq!(group.display_name(), "ANA");

        let group = WorkerGroup {
            worker: 5,
            records: vec![rec("5", "A")],
            roster: vec![],
        };
        assert_eq!(group.display_name(), "Trabajador 5");
    }

    #[test]
    fn test_proposal_for_missing_worker_is_none() {
        assert!(proposal_for_worker(&[rec("1", "A")], &[], 2).is_none());
        assert!(proposal_for_worker(&[], &[roster("2", "A")], 2).is_some());
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let records = vec![rec("1", "B"), rec("2", "A"), rec("1", "A")];
        assert_eq!(proposals_for_all(&records, &[]), proposals_for_all(&records, &[]));
    }
}
