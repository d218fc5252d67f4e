//! Per-holder hour aggregation for the hour-bank ledger.
//!
//! Every assignment is filed under its holder (exact name, tax id and worker
//! number), then under its appointment title, then under the period it
//! starts in. Career labels come from the roster through a priority chain.

use std::collections::HashMap;

use crate::normalize::fold_for_match;
use crate::period::PeriodList;
use crate::records::{AssignmentRecord, RosterEntry};
use crate::title::title_for;

/// Career label used when no roster entry matches.
pub const UNKNOWN_CAREER: &str = "unknown";
/// Holder name used when a record has none.
pub const UNNAMED_HOLDER: &str = "SIN NOMBRE";
/// Tax id / worker number placeholder.
pub const NOT_AVAILABLE: &str = "N/D";

/// Identity of one person across their assignments. Matching is exact after
/// trimming; two spellings of the same name are two holders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HolderKey {
    pub name: String,
    pub tax_id: String,
    pub worker: String,
}

impl HolderKey {
    pub fn of(record: &AssignmentRecord) -> Self {
        Self {
            name: record
                .name
                .clone()
                .unwrap_or_else(|| UNNAMED_HOLDER.to_string()),
            tax_id: record
                .tax_id
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            worker: record
                .worker_number
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// Roster lookup tables for career resolution.
#[derive(Debug, Clone, Default)]
pub struct CareerIndex {
    by_tax_id: HashMap<String, String>,
    by_worker: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl CareerIndex {
    /// Build the index. Later roster entries replace earlier ones with the
    /// same key; a blank roster career indexes as [`UNKNOWN_CAREER`].
    pub fn from_roster(roster: &[RosterEntry]) -> Self {
        let mut index = Self::default();
        for entry in roster {
            let career = entry
                .career
                .clone()
                .unwrap_or_else(|| UNKNOWN_CAREER.to_string());

            let tax_id = fold_for_match(entry.tax_id.as_deref().unwrap_or(""));
            if !tax_id.is_empty() {
                index.by_tax_id.insert(tax_id, career.clone());
            }
            if let Some(worker) = entry.worker_number.as_deref() {
                index.by_worker.insert(worker.to_string(), career.clone());
            }
            let name = fold_for_match(entry.name.as_deref().unwrap_or(""));
            if !name.is_empty() {
                index.by_name.insert(name, career);
            }
        }
        index
    }

    /// Resolve a holder's career: folded tax id, then worker number, then
    /// folded name, then [`UNKNOWN_CAREER`]. First match wins.
    pub fn resolve(&self, key: &HolderKey) -> &str {
        self.by_tax_id
            .get(&fold_for_match(&key.tax_id))
            .or_else(|| self.by_worker.get(&key.worker))
            .or_else(|| self.by_name.get(&fold_for_match(&key.name)))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CAREER)
    }
}

/// Theoretical and practical hours in one period slot. Hours may be
/// fractional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourPair {
    pub theoretical: f64,
    pub practical: f64,
}

impl HourPair {
    pub fn new(theoretical: f64, practical: f64) -> Self {
        Self {
            theoretical,
            practical,
        }
    }

    pub fn sum(&self) -> f64 {
        self.theoretical + self.practical
    }

    fn add(&mut self, other: HourPair) {
        self.theoretical += other.theoretical;
        self.practical += other.practical;
    }
}

/// Hours of one holder under one appointment title, one slot per configured
/// period.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectBucket {
    pub title: String,
    pub slots: Vec<HourPair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolderSummary {
    pub key: HolderKey,
    pub career: String,
    /// In order of first appearance.
    pub subjects: Vec<SubjectBucket>,
}

impl HolderSummary {
    /// Per-period sums across every bucket.
    pub fn totals(&self) -> Vec<HourPair> {
        let width = self.subjects.first().map_or(0, |s| s.slots.len());
        let mut totals = vec![HourPair::default(); width];
        for subject in &self.subjects {
            for (total, slot) in totals.iter_mut().zip(&subject.slots) {
                total.add(*slot);
            }
        }
        totals
    }

    fn bucket_mut(&mut self, title: String, slot_count: usize) -> &mut SubjectBucket {
        let pos = match self.subjects.iter().position(|s| s.title == title) {
            Some(pos) => pos,
            None => {
                self.subjects.push(SubjectBucket {
                    title,
                    slots: vec![HourPair::default(); slot_count],
                });
                self.subjects.len() - 1
            }
        };
        &mut self.subjects[pos]
    }
}

/// Aggregate assignments into holder summaries, in order of each holder's
/// first assignment.
pub fn summarize_holders(
    records: &[AssignmentRecord],
    roster: &[RosterEntry],
    periods: &PeriodList,
) -> Vec<HolderSummary> {
    let index = CareerIndex::from_roster(roster);
    let mut holders: Vec<HolderSummary> = Vec::new();
    let mut positions: HashMap<HolderKey, usize> = HashMap::new();

    for record in records {
        let key = HolderKey::of(record);
        let career = index.resolve(&key);

        let pos = match positions.get(&key) {
            Some(&pos) => {
                let holder = &mut holders[pos];
                if holder.career == UNKNOWN_CAREER && career != UNKNOWN_CAREER {
                    holder.career = career.to_string();
                }
                pos
            }
            None => {
                holders.push(HolderSummary {
                    key: key.clone(),
                    career: career.to_string(),
                    subjects: Vec::new(),
                });
                positions.insert(key, holders.len() - 1);
                holders.len() - 1
            }
        };

        let slot = periods.slot_of(&record.start_period());
        let bucket = holders[pos].bucket_mut(title_for(record), periods.len());
        bucket.slots[slot].add(HourPair::new(
            record.banked_theoretical(),
            record.banked_practical(),
        ));
    }

    holders
}
