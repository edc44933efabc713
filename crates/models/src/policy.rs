use serde::{Deserialize, Serialize};

/// Email domains a student address may belong to. An empty list means no
/// restriction is configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowedEmailDomains {
    pub domains: Vec<String>,
}

impl AllowedEmailDomains {
    pub fn permits(&self, email: &str) -> bool {
        if self.domains.is_empty() {
            return true;
        }

        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };

        self.domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }
}

/// A single permitted status change, by status name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub from: String,
    pub to: String,
}

/// Which student status changes are permitted. An empty rule set means any
/// change is allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTransitionRules {
    pub rules: Vec<TransitionRule>,
}

impl StatusTransitionRules {
    pub fn allows(&self, from: &str, to: &str) -> bool {
        if from == to || self.rules.is_empty() {
            return true;
        }

        self.rules.iter().any(|r| r.from == from && r.to == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(list: &[&str]) -> AllowedEmailDomains {
        AllowedEmailDomains {
            domains: list.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_domain_list_permits_everything() {
        assert!(domains(&[]).permits("anyone@example.com"));
    }

    #[test]
    fn test_domain_matching() {
        let allowed = domains(&["student.university.edu", "university.edu"]);

        assert!(allowed.permits("alice@student.university.edu"));
        assert!(allowed.permits("bob@University.EDU"));
        assert!(!allowed.permits("carol@gmail.com"));
        assert!(!allowed.permits("not-an-email"));
    }

    fn rules(list: &[(&str, &str)]) -> StatusTransitionRules {
        StatusTransitionRules {
            rules: list
                .iter()
                .map(|(from, to)| TransitionRule {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_rules_allow_everything() {
        assert!(rules(&[]).allows("Active", "Graduated"));
    }

    #[test]
    fn test_transition_rules() {
        let rules = rules(&[("Active", "Paused"), ("Paused", "Active")]);

        assert!(rules.allows("Active", "Paused"));
        assert!(rules.allows("Paused", "Active"));
        assert!(!rules.allows("Active", "Graduated"));

        // Keeping the same status is never a transition
        assert!(rules.allows("Graduated", "Graduated"));
    }
}
