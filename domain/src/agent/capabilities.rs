//! Capability inference from role and specialization strings.

/// (keyword, capability) pairs matched against type + specialization text
const CAPABILITY_KEYWORDS: &[(&str, &str)] = &[
    ("architect", "system_design"),
    ("design", "system_design"),
    ("research", "research"),
    ("analy", "analysis"),
    ("data", "data_analysis"),
    ("develop", "code_generation"),
    ("code", "code_generation"),
    ("implement", "code_generation"),
    ("engineer", "code_generation"),
    ("test", "testing"),
    ("qa", "testing"),
    ("quality", "testing"),
    ("security", "security_review"),
    ("threat", "security_review"),
    ("document", "documentation"),
    ("writ", "documentation"),
    ("strateg", "strategic_planning"),
    ("plan", "strategic_planning"),
    ("coordinat", "coordination"),
    ("lead", "coordination"),
    ("reason", "reasoning"),
    ("logic", "reasoning"),
    ("deploy", "deployment"),
    ("devops", "deployment"),
    ("infra", "deployment"),
    ("ux", "user_experience"),
    ("user", "user_experience"),
    ("performance", "optimization"),
    ("optimi", "optimization"),
    ("integrat", "integration"),
    ("api", "integration"),
];

/// Infer capabilities by keyword matching on type and specialization.
///
/// Always returns at least `general_assistance`; order follows the keyword
/// table and has no duplicates.
///
/// # Example
///
/// ```
/// use council_domain::agent::capabilities::infer_capabilities;
///
/// let caps = infer_capabilities("developer", "API integration tests");
/// assert!(caps.contains(&"code_generation".to_string()));
/// assert!(caps.contains(&"integration".to_string()));
/// assert!(caps.contains(&"testing".to_string()));
/// ```
pub fn infer_capabilities(agent_type: &str, specialization: &str) -> Vec<String> {
    let haystack = format!("{} {}", agent_type, specialization).to_lowercase();
    let mut capabilities: Vec<String> = Vec::new();

    for (keyword, capability) in CAPABILITY_KEYWORDS {
        if haystack.contains(keyword) && !capabilities.iter().any(|c| c == capability) {
            capabilities.push((*capability).to_string());
        }
    }

    if capabilities.is_empty() {
        capabilities.push("general_assistance".to_string());
    }
    capabilities
}
