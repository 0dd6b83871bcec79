//! Recommendation Heuristics: ordered rule table over aggregated metrics.
//!
//! Policy: every rule in `RULES` runs in priority order, then the list is
//! truncated to `MAX_RECOMMENDATIONS`. Rules are pure functions of
//! `RecommendationMetrics`, so identical metrics always give identical output.

use crate::analytics::durations::{DeadlineAdherence, TimeToOffer};
use crate::analytics::funnel::{ConversionRates, FunnelSnapshot};
use crate::analytics::normalize::JobStatus;
use crate::analytics::percent;
use crate::analytics::segmentation::Segment;

pub const MAX_RECOMMENDATIONS: usize = 5;

/// Applications needed before rate-based rules trust the numbers.
const MIN_APPLICATIONS_FOR_RATES: usize = 10;
const LOW_RESPONSE_RATE: u32 = 10;
const LOW_SCREEN_TO_INTERVIEW_RATE: u32 = 30;
const MIN_RESPONSES_FOR_SCREEN_RATE: usize = 3;
const MIN_INTERVIEWS_WITHOUT_OFFER: usize = 3;
const LOW_DEADLINE_ADHERENCE: f64 = 0.8;
const SLOW_TIME_TO_OFFER_DAYS: f64 = 45.0;
/// Minimum segment size before a segment is called out as the best channel.
pub const MIN_SEGMENT_SIZE: usize = 3;

/// Everything the rules may look at.
#[derive(Debug, Clone)]
pub struct RecommendationMetrics<'a> {
    pub total_records: usize,
    pub funnel: &'a FunnelSnapshot,
    pub conversion: &'a ConversionRates,
    pub deadline_adherence: &'a DeadlineAdherence,
    pub time_to_offer: &'a TimeToOffer,
    pub weekly_goal: u32,
    pub applications_this_week: usize,
    pub best_channel: Option<&'a Segment>,
}

pub struct Rule {
    pub name: &'static str,
    pub evaluate: fn(&RecommendationMetrics) -> Option<String>,
}

/// Priority order. Earlier rules survive truncation.
pub const RULES: &[Rule] = &[
    Rule {
        name: "start_tracking",
        evaluate: start_tracking,
    },
    Rule {
        name: "offer_received",
        evaluate: offer_received,
    },
    Rule {
        name: "weekly_goal",
        evaluate: weekly_goal,
    },
    Rule {
        name: "low_response_rate",
        evaluate: low_response_rate,
    },
    Rule {
        name: "screens_not_converting",
        evaluate: screens_not_converting,
    },
    Rule {
        name: "interviews_without_offer",
        evaluate: interviews_without_offer,
    },
    Rule {
        name: "missed_deadlines",
        evaluate: missed_deadlines,
    },
    Rule {
        name: "slow_time_to_offer",
        evaluate: slow_time_to_offer,
    },
    Rule {
        name: "best_channel",
        evaluate: best_channel,
    },
    Rule {
        name: "saved_not_applied",
        evaluate: saved_not_applied,
    },
];

/// Runs every rule and keeps the first `MAX_RECOMMENDATIONS` results.
pub fn recommend(metrics: &RecommendationMetrics) -> Vec<String> {
    let mut insights: Vec<String> = RULES
        .iter()
        .filter_map(|rule| {
            let insight = (rule.evaluate)(metrics);
            if insight.is_some() {
                tracing::trace!(rule = rule.name, "recommendation rule fired");
            }
            insight
        })
        .collect();
    insights.truncate(MAX_RECOMMENDATIONS);
    insights
}

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

fn start_tracking(m: &RecommendationMetrics) -> Option<String> {
    (m.total_records == 0).then(|| {
        "Start tracking your job search: add the roles you're interested in and log each application as you send it.".to_string()
    })
}

fn offer_received(m: &RecommendationMetrics) -> Option<String> {
    let offers = m.funnel.count(JobStatus::Offer);
    match offers {
        0 => None,
        1 => Some(
            "You have an offer! Review it carefully and use any active processes as leverage before deciding."
                .to_string(),
        ),
        n => Some(format!(
            "You have {n} offers. Compare them side by side on compensation, growth, and team before deciding."
        )),
    }
}

fn weekly_goal(m: &RecommendationMetrics) -> Option<String> {
    if m.total_records == 0 || m.weekly_goal == 0 {
        return None;
    }
    let goal = m.weekly_goal as usize;
    let done = m.applications_this_week;
    if done >= goal {
        Some(format!(
            "Weekly goal reached: {done} applications this week (goal {goal}). Keep the momentum going."
        ))
    } else {
        Some(format!(
            "You've sent {done} of {goal} applications this week. {} more to hit your weekly goal.",
            goal - done
        ))
    }
}

fn low_response_rate(m: &RecommendationMetrics) -> Option<String> {
    let c = m.conversion;
    (c.applications >= MIN_APPLICATIONS_FOR_RATES && c.response_rate < LOW_RESPONSE_RATE).then(|| {
        format!(
            "Only {}% of your {} applications got a response. Tailor your resume to each job description and lead with matching keywords.",
            c.response_rate, c.applications
        )
    })
}

fn screens_not_converting(m: &RecommendationMetrics) -> Option<String> {
    let responded = m.conversion.responded;
    if responded < MIN_RESPONSES_FOR_SCREEN_RATE {
        return None;
    }
    let interviews = m.funnel.count(JobStatus::Interview) + m.funnel.count(JobStatus::Offer);
    let rate = percent(interviews, responded);
    (rate < LOW_SCREEN_TO_INTERVIEW_RATE).then(|| {
        format!(
            "Only {rate}% of your responses moved on to interviews. Practice your phone-screen pitch and prepare questions about the role."
        )
    })
}

fn interviews_without_offer(m: &RecommendationMetrics) -> Option<String> {
    let interviews = m.funnel.count(JobStatus::Interview);
    (interviews >= MIN_INTERVIEWS_WITHOUT_OFFER && m.funnel.count(JobStatus::Offer) == 0).then(|| {
        format!(
            "You've reached {interviews} interviews without an offer yet. Run mock interviews and ask for feedback after each round."
        )
    })
}

fn missed_deadlines(m: &RecommendationMetrics) -> Option<String> {
    let d = m.deadline_adherence;
    (d.tracked() > 0 && d.ratio < LOW_DEADLINE_ADHERENCE).then(|| {
        format!(
            "You acted before the deadline on {} of {} jobs with deadlines. Set reminders a few days ahead of each application deadline.",
            d.met,
            d.tracked()
        )
    })
}

fn slow_time_to_offer(m: &RecommendationMetrics) -> Option<String> {
    let t = m.time_to_offer;
    (t.samples > 0 && t.avg_days > SLOW_TIME_TO_OFFER_DAYS).then(|| {
        format!(
            "Offers are taking {:.1} days on average. Keep applying in parallel so your pipeline never runs dry.",
            t.avg_days
        )
    })
}

fn best_channel(m: &RecommendationMetrics) -> Option<String> {
    let s = m.best_channel?;
    (s.response_rate > 0).then(|| {
        format!(
            "\"{}\" gets your best response rate ({}% over {} applications). Lean on it for your next applications.",
            s.value, s.response_rate, s.total
        )
    })
}

fn saved_not_applied(m: &RecommendationMetrics) -> Option<String> {
    let saved = m.funnel.count(JobStatus::Interested);
    (saved > 0 && saved > m.conversion.applications).then(|| {
        format!(
            "You have {saved} saved jobs you haven't applied to. Pick the best few and send those applications."
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::funnel::StageCount;
    use crate::analytics::normalize::Attribute;

    struct Fixture {
        funnel: FunnelSnapshot,
        conversion: ConversionRates,
        deadline_adherence: DeadlineAdherence,
        time_to_offer: TimeToOffer,
        best_channel: Option<Segment>,
    }

    impl Fixture {
        fn new(counts: &[(JobStatus, usize)]) -> Self {
            let stages: Vec<StageCount> = JobStatus::ALL
                .iter()
                .map(|s| StageCount {
                    stage: *s,
                    count: counts
                        .iter()
                        .find(|(st, _)| st == s)
                        .map(|(_, c)| *c)
                        .unwrap_or(0),
                })
                .collect();
            let total = stages.iter().map(|s| s.count).sum();
            Fixture {
                funnel: FunnelSnapshot { stages, total },
                conversion: ConversionRates {
                    applications: 0,
                    responded: 0,
                    response_rate: 0,
                    interview_rate: 0,
                    offer_rate: 0,
                },
                deadline_adherence: DeadlineAdherence {
                    met: 0,
                    missed: 0,
                    ratio: 0.0,
                },
                time_to_offer: TimeToOffer {
                    avg_days: 0.0,
                    samples: 0,
                },
                best_channel: None,
            }
        }

        fn metrics(&self, weekly_goal: u32, this_week: usize) -> RecommendationMetrics<'_> {
            RecommendationMetrics {
                total_records: self.funnel.total,
                funnel: &self.funnel,
                conversion: &self.conversion,
                deadline_adherence: &self.deadline_adherence,
                time_to_offer: &self.time_to_offer,
                weekly_goal,
                applications_this_week: this_week,
                best_channel: self.best_channel.as_ref(),
            }
        }
    }

    #[test]
    fn test_empty_input_prompts_to_start_tracking() {
        let f = Fixture::new(&[]);
        let recs = recommend(&f.metrics(5, 0));
        assert_eq!(recs.len(), 1);
        assert!(recs[0].starts_with("Start tracking"));
    }

    #[test]
    fn test_weekly_goal_progress() {
        let f = Fixture::new(&[(JobStatus::Applied, 2)]);
        let recs = recommend(&f.metrics(5, 2));
        assert!(recs.iter().any(|r| r.contains("2 of 5") && r.contains("3 more")));

        let recs = recommend(&f.metrics(2, 2));
        assert!(recs.iter().any(|r| r.starts_with("Weekly goal reached")));
    }

    #[test]
    fn test_zero_weekly_goal_disables_rule() {
        let f = Fixture::new(&[(JobStatus::Applied, 2)]);
        let recs = recommend(&f.metrics(0, 0));
        assert!(!recs.iter().any(|r| r.contains("weekly goal")));
    }

    #[test]
    fn test_low_response_rate_needs_enough_applications() {
        let mut f = Fixture::new(&[(JobStatus::Applied, 12)]);
        f.conversion.applications = 12;
        f.conversion.response_rate = 8;
        let recs = recommend(&f.metrics(0, 0));
        assert!(recs.iter().any(|r| r.contains("Only 8%")));

        f.conversion.applications = 5;
        let recs = recommend(&f.metrics(0, 0));
        assert!(!recs.iter().any(|r| r.contains("Only 8%")));
    }

    #[test]
    fn test_interviews_without_offer() {
        let f = Fixture::new(&[(JobStatus::Interview, 3)]);
        let recs = recommend(&f.metrics(0, 0));
        assert!(recs.iter().any(|r| r.contains("3 interviews without an offer")));
    }

    #[test]
    fn test_missed_deadlines() {
        let mut f = Fixture::new(&[(JobStatus::Applied, 4)]);
        f.deadline_adherence = DeadlineAdherence {
            met: 1,
            missed: 3,
            ratio: 0.25,
        };
        let recs = recommend(&f.metrics(0, 0));
        assert!(recs.iter().any(|r| r.contains("1 of 4 jobs with deadlines")));
    }

    #[test]
    fn test_best_channel() {
        let mut f = Fixture::new(&[(JobStatus::Applied, 4)]);
        f.best_channel = Some(Segment {
            category: Attribute::ApplicationMethod,
            value: "Referral".to_string(),
            total: 4,
            responded: 3,
            offers: 0,
            response_rate: 75,
            offer_rate: 0,
            avg_days_to_response: 2.0,
        });
        let recs = recommend(&f.metrics(0, 0));
        assert!(recs.iter().any(|r| r.contains("\"Referral\"") && r.contains("75%")));
    }

    #[test]
    fn test_truncated_to_max_in_priority_order() {
        let mut f = Fixture::new(&[
            (JobStatus::Interested, 30),
            (JobStatus::Interview, 4),
            (JobStatus::Applied, 10),
        ]);
        f.conversion = ConversionRates {
            applications: 14,
            responded: 4,
            response_rate: 5,
            interview_rate: 28,
            offer_rate: 0,
        };
        f.deadline_adherence = DeadlineAdherence {
            met: 0,
            missed: 2,
            ratio: 0.0,
        };
        f.time_to_offer = TimeToOffer {
            avg_days: 60.0,
            samples: 1,
        };
        let metrics = f.metrics(5, 1);
        let recs = recommend(&metrics);
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert!(recs[0].contains("1 of 5"));
        assert!(recs[1].contains("Only 5%"));
        assert!(recs[2].contains("interviews without an offer"));
        assert!(recs[3].contains("deadline"));
        assert!(recs[4].starts_with("Offers are taking 60.0 days"));
        // Lowest-priority rule fired but was truncated away.
        assert!(!recs.iter().any(|r| r.contains("saved jobs")));
    }

    #[test]
    fn test_idempotent() {
        let mut f = Fixture::new(&[(JobStatus::Applied, 3), (JobStatus::Offer, 2)]);
        f.time_to_offer = TimeToOffer {
            avg_days: 50.5,
            samples: 2,
        };
        let metrics = f.metrics(3, 1);
        assert_eq!(recommend(&metrics), recommend(&metrics));
    }

    #[test]
    fn test_rule_names_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }
}
