//! Route template compilation.
//!
//! `/api/users/{id}` compiles to the anchored, case-insensitive pattern
//! `(?i)^/api/users/([^/]+)$` with the placeholder names `["id"]`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RouteError;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex should be valid"));

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub matcher: Regex,
    pub param_names: Vec<String>,
    pub segment_count: usize,
}

/// Joins a prefix and a template into one normalized path: a single leading `/`, no
/// trailing `/`, and `/` for an empty result.
pub fn normalize_path(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let template = template.trim_matches('/');

    match (prefix.is_empty(), template.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{template}"),
        (false, true) => format!("/{prefix}"),
        (false, false) => format!("/{prefix}/{template}"),
    }
}

/// Number of non-empty `/`-separated segments, the specificity of a template.
pub fn segment_count(template: &str) -> usize {
    template.split('/').filter(|segment| !segment.is_empty()).count()
}

/// Compiles a normalized template into its matcher.
pub fn compile(template: &str) -> Result<CompiledTemplate, RouteError> {
    let invalid = |reason: String| RouteError::InvalidTemplate { template: template.to_string(), reason };

    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push_str("(?i)^");
    let mut param_names = Vec::new();
    let mut literal_start = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        push_literal(&mut pattern, &template[literal_start..whole.start()]).map_err(&invalid)?;
        pattern.push_str("([^/]+)");

        let name = name.as_str();
        if param_names.iter().any(|existing: &String| existing.eq_ignore_ascii_case(name)) {
            return Err(invalid(format!("placeholder '{name}' appears more than once")));
        }
        param_names.push(name.to_string());
        literal_start = whole.end();
    }

    push_literal(&mut pattern, &template[literal_start..]).map_err(&invalid)?;
    pattern.push('$');

    let matcher = Regex::new(&pattern).map_err(|e| invalid(e.to_string()))?;
    Ok(CompiledTemplate { matcher, param_names, segment_count: segment_count(template) })
}

fn push_literal(pattern: &mut String, literal: &str) -> Result<(), String> {
    if literal.contains(['{', '}']) {
        return Err(format!("malformed placeholder in '{literal}'"));
    }
    pattern.push_str(&regex::escape(literal));
    Ok(())
}
