//! Substitute ranking. Four independent signals are added into one raw score
//! used only for ordering.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::coverage::CoverageCandidate;
use crate::model::staff::StaffProfile;

/// Weight per criterion. Defaults reproduce the established policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub same_department: u32,
    pub same_specialization: u32,
    pub low_utilization: u32,
    pub medium_utilization: u32,
    pub high_utilization: u32,
    pub per_common_subject: u32,
    /// Utilization strictly below this percentage is "low".
    pub low_utilization_below_pct: f64,
    /// Utilization strictly above this percentage is "high".
    pub high_utilization_above_pct: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            same_department: 30,
            same_specialization: 20,
            low_utilization: 30,
            medium_utilization: 20,
            high_utilization: 10,
            per_common_subject: 10,
            low_utilization_below_pct: 50.0,
            high_utilization_above_pct: 75.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubstituteRanker {
    policy: ScoringPolicy,
}

impl SubstituteRanker {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Active, not the requester, has headroom, and not on overlapping approved leave.
    pub fn is_eligible(
        requester: &StaffProfile,
        candidate: &StaffProfile,
        on_leave: &HashSet<u64>,
    ) -> bool {
        candidate.id != requester.id
            && candidate.is_active()
            && candidate.has_headroom()
            && !on_leave.contains(&candidate.id)
    }

    /// Eligible candidates, highest score first, ties by staff id.
    pub fn rank(
        &self,
        requester: &StaffProfile,
        pool: &[StaffProfile],
        on_leave: &HashSet<u64>,
    ) -> Vec<CoverageCandidate> {
        let mut candidates: Vec<CoverageCandidate> = pool
            .iter()
            .filter(|candidate| Self::is_eligible(requester, candidate, on_leave))
            .map(|candidate| self.score(requester, candidate))
            .collect();

        candidates.sort_by(|a, b| b.score.cmp(&a.score).then(a.staff_id.cmp(&b.staff_id)));
        candidates
    }

    pub fn score(&self, requester: &StaffProfile, candidate: &StaffProfile) -> CoverageCandidate {
        let policy = &self.policy;
        let mut score = 0u32;
        let mut reasons = Vec::new();
        let mut add = |weight: u32, reason: String| {
            if weight > 0 {
                score = score.saturating_add(weight);
                reasons.push(reason);
            }
        };

        if candidate.department == requester.department {
            add(policy.same_department, "Same department".to_string());
        }

        if let (Some(mine), Some(theirs)) = (&requester.specialization, &candidate.specialization) {
            if mine == theirs {
                add(policy.same_specialization, "Same specialization".to_string());
            }
        }

        if let Some(pct) = candidate.utilization_pct() {
            if pct < policy.low_utilization_below_pct {
                add(policy.low_utilization, "Good workload capacity".to_string());
            } else if pct <= policy.high_utilization_above_pct {
                add(policy.medium_utilization, "Moderate workload capacity".to_string());
            } else {
                add(policy.high_utilization, "Limited workload capacity".to_string());
            }
        }

        let common = common_subjects(requester, candidate);
        if common > 0 {
            let noun = if common == 1 { "subject" } else { "subjects" };
            add(
                policy.per_common_subject.saturating_mul(common),
                format!("Teaches {common} common {noun}"),
            );
        }

        CoverageCandidate {
            staff_id: candidate.id,
            score,
            reasons,
        }
    }
}

fn common_subjects(requester: &StaffProfile, candidate: &StaffProfile) -> u32 {
    let mine: BTreeSet<&str> = requester.subjects.iter().map(String::as_str).collect();
    let theirs: BTreeSet<&str> = candidate.subjects.iter().map(String::as_str).collect();
    u32::try_from(mine.intersection(&theirs).count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::staff::StaffStatus;

    fn staff(
        id: u64,
        department: &str,
        specialization: Option<&str>,
        load: (u32, u32),
        subjects: &[&str],
    ) -> StaffProfile {
        StaffProfile {
            id,
            status: StaffStatus::Active,
            department: department.to_string(),
            specialization: specialization.map(str::to_string),
            current_load: load.0,
            max_load: load.1,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn requester() -> StaffProfile {
        staff(1, "Science", Some("Physics"), (8, 20), &["PHY-10", "PHY-11", "PHY-12", "MTH-10"])
    }

    #[test]
    fn reference_scenario_scores_and_order() {
        let b = staff(2, "Science", Some("Physics"), (6, 20), &["PHY-10", "PHY-11", "PHY-12"]);
        let c = staff(3, "Humanities", Some("History"), (12, 20), &["MTH-10"]);

        let ranked = SubstituteRanker::default().rank(&requester(), &[c, b], &HashSet::new());

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].staff_id, 2);
        assert_eq!(ranked[0].score, 110);
        assert_eq!(
            ranked[0].reasons,
            vec![
                "Same department",
                "Same specialization",
                "Good workload capacity",
                "Teaches 3 common subjects"
            ]
        );
        assert_eq!(ranked[1].staff_id, 3);
        assert_eq!(ranked[1].score, 30);
        assert_eq!(
            ranked[1].reasons,
            vec!["Moderate workload capacity", "Teaches 1 common subject"]
        );
    }

    #[test]
    fn ineligible_staff_are_filtered() {
        let mut inactive = staff(2, "Science", None, (1, 20), &[]);
        inactive.status = StaffStatus::Inactive;
        let full = staff(3, "Science", None, (20, 20), &[]);
        let no_capacity = staff(4, "Science", None, (0, 0), &[]);
        let on_leave = staff(5, "Science", None, (1, 20), &[]);
        let ok = staff(6, "Science", None, (1, 20), &[]);
        let me = requester();

        let pool = vec![me.clone(), inactive, full, no_capacity, on_leave, ok];
        let ranked = SubstituteRanker::default().rank(&me, &pool, &HashSet::from([5]));

        let ids: Vec<u64> = ranked.iter().map(|c| c.staff_id).collect();
        assert_eq!(ids, vec![6]);
    }

    #[test]
    fn ties_break_by_staff_id() {
        let pool = vec![
            staff(9, "Arts", None, (1, 10), &[]),
            staff(4, "Arts", None, (1, 10), &[]),
            staff(7, "Arts", None, (1, 10), &[]),
        ];
        let ranked = SubstituteRanker::default().rank(&requester(), &pool, &HashSet::new());
        let ids: Vec<u64> = ranked.iter().map(|c| c.staff_id).collect();
        assert_eq!(ids, vec![4, 7, 9]);
    }

    #[test]
    fn utilization_tier_boundaries() {
        let ranker = SubstituteRanker::default();
        let me = requester();
        let tier = |load: u32| ranker.score(&me, &staff(2, "Arts", None, (load, 100), &[])).score;

        assert_eq!(tier(49), 30);
        assert_eq!(tier(50), 20);
        assert_eq!(tier(75), 20);
        assert_eq!(tier(76), 10);
    }

    #[test]
    fn common_subjects_are_uncapped() {
        let subjects = ["A", "B", "C", "D", "E", "F", "G"];
        let me = staff(1, "Arts", None, (1, 10), &subjects);
        let them = staff(2, "Science", None, (9, 10), &subjects);
        let candidate = SubstituteRanker::default().score(&me, &them);
        assert_eq!(candidate.score, 10 + 70);
    }

    #[test]
    fn custom_policy_changes_weights() {
        let policy = ScoringPolicy {
            same_department: 5,
            same_specialization: 0,
            per_common_subject: 1,
            ..ScoringPolicy::default()
        };
        let b = staff(2, "Science", Some("Physics"), (6, 20), &["PHY-10"]);
        let candidate = SubstituteRanker::new(policy).score(&requester(), &b);
        assert_eq!(candidate.score, 5 + 30 + 1);
        assert!(!candidate.reasons.iter().any(|r| r == "Same specialization"));
    }
}
