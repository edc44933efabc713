use models::policy::{AllowedEmailDomains, StatusTransitionRules, TransitionRule};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailDomainsDto {
    pub domains: Vec<String>,
}

impl From<AllowedEmailDomains> for EmailDomainsDto {
    fn from(value: AllowedEmailDomains) -> Self {
        Self {
            domains: value.domains,
        }
    }
}

impl From<EmailDomainsDto> for AllowedEmailDomains {
    fn from(dto: EmailDomainsDto) -> Self {
        Self {
            domains: dto.domains,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRuleDto {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRulesDto {
    pub rules: Vec<StatusRuleDto>,
}

impl From<StatusTransitionRules> for StatusRulesDto {
    fn from(value: StatusTransitionRules) -> Self {
        Self {
            rules: value
                .rules
                .into_iter()
                .map(|r| StatusRuleDto {
                    from: r.from,
                    to: r.to,
                })
                .collect(),
        }
    }
}

impl From<StatusRulesDto> for StatusTransitionRules {
    fn from(dto: StatusRulesDto) -> Self {
        Self {
            rules: dto
                .rules
                .into_iter()
                .map(|r| TransitionRule {
                    from: r.from,
                    to: r.to,
                })
                .collect(),
        }
    }
}
