//! Ordered status rule tables.
//!
//! Status codes are assigned by walking a priority list of rules and taking
//! the first one whose condition holds. Each rule carries an identifier so
//! the rule that fired can be logged and audited.

use onco_model::{EventStatus, TtrStatus};

/// Response flags a status rule may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFlags {
    /// CR or PR observed.
    pub objective: bool,
    /// PD observed.
    pub any_pd: bool,
}

impl ResponseFlags {
    pub fn new(objective: bool, any_pd: bool) -> Self {
        Self { objective, any_pd }
    }

    /// Responder who later progressed.
    pub fn or_and_pd(&self) -> bool {
        self.objective && self.any_pd
    }

    /// Progression without a prior response.
    pub fn no_or_and_pd(&self) -> bool {
        !self.objective && self.any_pd
    }

    pub fn no_or_or_pd(&self) -> bool {
        !self.objective || self.any_pd
    }
}

/// One entry of a status rule table.
#[derive(Debug, Clone, Copy)]
pub struct StatusRule<S> {
    pub id: &'static str,
    pub description: &'static str,
    pub applies: fn(&ResponseFlags) -> bool,
    pub status: S,
}

/// Result of evaluating a rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome<S> {
    /// Identifier of the rule that fired, or `"fallback"`.
    pub rule_id: &'static str,
    pub status: S,
}

/// First-match-wins list of status rules with a fallback status.
#[derive(Debug, Clone, Copy)]
pub struct StatusRuleTable<S: 'static> {
    pub name: &'static str,
    pub rules: &'static [StatusRule<S>],
    pub fallback: S,
}

impl<S: Copy> StatusRuleTable<S> {
    pub fn evaluate(&self, flags: &ResponseFlags) -> RuleOutcome<S> {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(flags))
            .map(|rule| RuleOutcome {
                rule_id: rule.id,
                status: rule.status,
            })
            .unwrap_or(RuleOutcome {
                rule_id: "fallback",
                status: self.fallback,
            })
    }
}

/// Time-to-response status.
pub const TTR_STATUS_RULES: StatusRuleTable<TtrStatus> = StatusRuleTable {
    name: "ttr_status",
    rules: &[
        StatusRule {
            id: "TTR-1",
            description: "objective response observed",
            applies: |flags| flags.objective,
            status: TtrStatus::Response,
        },
        StatusRule {
            id: "TTR-2",
            description: "progression without prior response",
            applies: ResponseFlags::no_or_and_pd,
            status: TtrStatus::ProgressionWithoutResponse,
        },
    ],
    fallback: TtrStatus::Censored,
};

/// Time-in-response status.
///
/// A responder who later progresses is always an event. The remaining
/// non-responders and progressors are events too.
pub const TIR_STATUS_RULES: StatusRuleTable<EventStatus> = StatusRuleTable {
    name: "tir_status",
    rules: &[
        StatusRule {
            id: "TIR-1",
            description: "responder who later progressed",
            applies: ResponseFlags::or_and_pd,
            status: EventStatus::Event,
        },
        StatusRule {
            id: "TIR-2",
            description: "no objective response, or progression",
            applies: ResponseFlags::no_or_or_pd,
            status: EventStatus::Event,
        },
    ],
    fallback: EventStatus::Censored,
};

/// Time-to-progression status.
pub const TTP_STATUS_RULES: StatusRuleTable<EventStatus> = StatusRuleTable {
    name: "ttp_status",
    rules: &[StatusRule {
        id: "TTP-1",
        description: "progression observed",
        applies: |flags| flags.any_pd,
        status: EventStatus::Event,
    }],
    fallback: EventStatus::Censored,
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FLAGS: [ResponseFlags; 4] = [
        ResponseFlags {
            objective: false,
            any_pd: false,
        },
        ResponseFlags {
            objective: false,
            any_pd: true,
        },
        ResponseFlags {
            objective: true,
            any_pd: false,
        },
        ResponseFlags {
            objective: true,
            any_pd: true,
        },
    ];

    #[test]
    fn ttr_status_priority() {
        let statuses: Vec<_> = ALL_FLAGS
            .iter()
            .map(|flags| TTR_STATUS_RULES.evaluate(flags).status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                TtrStatus::Censored,
                TtrStatus::ProgressionWithoutResponse,
                TtrStatus::Response,
                TtrStatus::Response,
            ]
        );
    }

    #[test]
    fn tir_responder_with_progression_hits_first_rule() {
        let outcome = TIR_STATUS_RULES.evaluate(&ResponseFlags::new(true, true));
        assert_eq!(outcome.rule_id, "TIR-1");
        assert_eq!(outcome.status, EventStatus::Event);
    }

    #[test]
    fn tir_only_responder_without_progression_is_censored() {
        for flags in ALL_FLAGS {
            let expected = flags.objective && !flags.any_pd;
            let outcome = TIR_STATUS_RULES.evaluate(&flags);
            assert_eq!(outcome.status == EventStatus::Censored, expected, "{flags:?}");
        }
        let outcome = TIR_STATUS_RULES.evaluate(&ResponseFlags::new(true, false));
        assert_eq!(outcome.rule_id, "fallback");
    }

    #[test]
    fn ttp_status_follows_progression() {
        assert_eq!(
            TTP_STATUS_RULES.evaluate(&ResponseFlags::new(true, true)).status,
            EventStatus::Event
        );
        assert_eq!(
            TTP_STATUS_RULES.evaluate(&ResponseFlags::new(false, false)).status,
            EventStatus::Censored
        );
    }
}
