//! Quick-fix advisor — maps report issues to remediation suggestions.
//!
//! The advisor is a rule table (issue type → fix type). Rules are matched in
//! order; an issue with no matching rule produces no fix.
//!
//! ```
//! use softlock_logic::quickfix::{generate_quick_fixes, QuickFixType};
//! use softlock_logic::reachability::{Issue, IssueType, ValidationReport};
//! use softlock_logic::capability::{Ability, Polarity};
//!
//! let report = ValidationReport {
//!     issues: vec![Issue {
//!         issue_type: IssueType::UnreachableNode,
//!         node_id: 12,
//!         related_node_id: 1,
//!         required_polarity: Polarity::NONE,
//!         required_ability: Ability::NONE,
//!         profile: Some("NoAbilities".into()),
//!         description: String::new(),
//!     }],
//!     ..Default::default()
//! };
//! let fixes = generate_quick_fixes(&report);
//! assert_eq!(fixes.len(), 1);
//! assert_eq!(fixes[0].fix_type, QuickFixType::AddConnection);
//! assert_eq!(fixes[0].target_node_id, 12);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::graph::NodeId;
use crate::reachability::{Issue, IssueType, ValidationReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuickFixType {
    #[default]
    None,
    AddConnection,
    SoftenGate,
    ChangePolarity,
    AddAlternativePath,
}

/// A suggested remediation for one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFix {
    pub fix_type: QuickFixType,
    pub target_node_id: NodeId,
    pub related_node_id: NodeId,
    pub description: String,
}

/// One entry of the advisor's strategy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixRule {
    pub issue_type: IssueType,
    pub fix_type: QuickFixType,
}

const DEFAULT_RULES: &[FixRule] = &[
    FixRule {
        issue_type: IssueType::UnreachableNode,
        fix_type: QuickFixType::AddConnection,
    },
    FixRule {
        issue_type: IssueType::MissingConnection,
        fix_type: QuickFixType::AddConnection,
    },
    FixRule {
        issue_type: IssueType::IsolatedComponent,
        fix_type: QuickFixType::AddConnection,
    },
    FixRule {
        issue_type: IssueType::HardGateBlocking,
        fix_type: QuickFixType::SoftenGate,
    },
    FixRule {
        issue_type: IssueType::RequiresUnavailablePolarity,
        fix_type: QuickFixType::ChangePolarity,
    },
    FixRule {
        issue_type: IssueType::RequiresUnavailableAbility,
        fix_type: QuickFixType::AddAlternativePath,
    },
];

/// Rule-based issue → fix mapper.
#[derive(Debug, Clone)]
pub struct QuickFixAdvisor {
    rules: Vec<FixRule>,
}

impl Default for QuickFixAdvisor {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl QuickFixAdvisor {
    /// An advisor with no rules (every issue maps to nothing).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Replace the rule for `issue_type`, or append one if absent.
    /// Mapping to `QuickFixType::None` disables fixes for that issue type.
    pub fn with_rule(mut self, issue_type: IssueType, fix_type: QuickFixType) -> Self {
        match self.rules.iter_mut().find(|r| r.issue_type == issue_type) {
            Some(rule) => rule.fix_type = fix_type,
            None => self.rules.push(FixRule {
                issue_type,
                fix_type,
            }),
        }
        self
    }

    pub fn rules(&self) -> &[FixRule] {
        &self.rules
    }

    /// Fix type for an issue type, if a rule maps it to an actual fix.
    pub fn fix_type_for(&self, issue_type: IssueType) -> Option<QuickFixType> {
        self.rules
            .iter()
            .find(|r| r.issue_type == issue_type)
            .map(|r| r.fix_type)
            .filter(|&t| t != QuickFixType::None)
    }

    /// Suggest fixes for every issue in `report`, deduplicated by
    /// (type, target, related) in first-seen order.
    pub fn generate(&self, report: &ValidationReport) -> Vec<QuickFix> {
        let mut seen = HashSet::new();
        let mut fixes = Vec::new();
        for issue in &report.issues {
            let Some(fix_type) = self.fix_type_for(issue.issue_type) else {
                continue;
            };
            let fix = build_fix(fix_type, issue);
            if seen.insert((fix.fix_type, fix.target_node_id, fix.related_node_id)) {
                fixes.push(fix);
            }
        }
        fixes
    }
}

fn build_fix(fix_type: QuickFixType, issue: &Issue) -> QuickFix {
    let target = issue.node_id;
    let related = issue.related_node_id;
    let description = match fix_type {
        QuickFixType::AddConnection => {
            format!("Add a connection reaching node #{} (from near #{})", target, related)
        }
        QuickFixType::SoftenGate => format!(
            "Soften the gate on link #{}→#{} (polarity {}, ability {})",
            related, target, issue.required_polarity, issue.required_ability
        ),
        QuickFixType::ChangePolarity => format!(
            "Change the polarity requirement on link #{}→#{} (currently needs {})",
            related, target, issue.required_polarity
        ),
        QuickFixType::AddAlternativePath => format!(
            "Add an alternative path to node #{} bypassing ability {}",
            target, issue.required_ability
        ),
        QuickFixType::None => String::new(),
    };
    QuickFix {
        fix_type,
        target_node_id: target,
        related_node_id: related,
        description,
    }
}

/// Suggest fixes using the default rule table.
pub fn generate_quick_fixes(report: &ValidationReport) -> Vec<QuickFix> {
    QuickFixAdvisor::default().generate(report)
}
