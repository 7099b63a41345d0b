use serde::{Deserialize, Serialize};

/// Identifier of the first generated rule.
pub const RULE_ID_BASE: u32 = 2000;
/// Priority assigned to every generated rule.
pub const RULE_PRIORITY: u32 = 1;
/// Request types every generated rule applies to.
pub const RESOURCE_TYPES: [&str; 4] = ["script", "image", "xmlhttprequest", "sub_frame"];

/// A declarative block rule, as understood by the browser's rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier of the rule
    pub id: u32,
    /// Precedence among matching rules
    pub priority: u32,
    /// What to do with a matching request
    pub action: Action,
    /// Which requests the rule matches
    pub condition: Condition,
}

/// The action taken by a [`Rule`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    /// Always `block` for generated rules
    pub kind: String,
}

/// The match condition of a [`Rule`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Substring filter applied to the request URL
    pub url_filter: String,
    /// Request types the rule applies to
    pub resource_types: Vec<String>,
}

impl Rule {
    /// Create a block rule for `domain` with the given identifier
    #[must_use]
    pub fn block(id: u32, domain: &str) -> Self {
        Rule {
            id,
            priority: RULE_PRIORITY,
            action: Action {
                kind: "block".to_string(),
            },
            condition: Condition {
                url_filter: domain.to_string(),
                resource_types: RESOURCE_TYPES.iter().map(ToString::to_string).collect(),
            },
        }
    }
}

/// Turn an ordered sequence of domains into block rules.
///
/// Identifiers start at [`RULE_ID_BASE`] and increase by one per domain, in
/// sequence order.
#[must_use]
pub fn build_rules<S: AsRef<str>>(domains: &[S]) -> Vec<Rule> {
    (RULE_ID_BASE..)
        .zip(domains)
        .map(|(id, domain)| Rule::block(id, domain.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let rules = build_rules(&["ads.example.com", "track.example.org", "cdn.example.net"]);
        let ids: Vec<u32> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2000, 2001, 2002]);
        assert_eq!(rules[1].condition.url_filter, "track.example.org");
    }

    #[test]
    fn test_no_domains_no_rules() {
        let domains: Vec<String> = Vec::new();
        assert!(build_rules(&domains).is_empty());
    }

    #[test]
    fn test_rule_serialization() {
        let rule = Rule::block(2000, "ads.example.com");
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "id": 2000,
                "priority": 1,
                "action": { "type": "block" },
                "condition": {
                    "urlFilter": "ads.example.com",
                    "resourceTypes": ["script", "image", "xmlhttprequest", "sub_frame"]
                }
            })
        );
    }
}
