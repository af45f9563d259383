//! Scope to highlight group resolution
//!
//! Rules map a scope prefix (e.g. `string.quoted`) to a highlight group
//! (e.g. `String`). User rules are merged over [`DEFAULT_RULES`]; the longest
//! matching prefix on the deepest scope wins.

use std::collections::HashMap;

/// Built-in scope prefix → highlight group rules
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    ("comment", "Comment"),
    ("comment.block.documentation", "SpecialComment"),
    ("constant", "Constant"),
    ("constant.character", "Character"),
    ("constant.character.escape", "SpecialChar"),
    ("constant.language", "Constant"),
    ("constant.language.boolean", "Boolean"),
    ("constant.numeric", "Number"),
    ("constant.numeric.float", "Float"),
    ("entity.name", "Identifier"),
    ("entity.name.class", "Type"),
    ("entity.name.function", "Function"),
    ("entity.name.section", "Title"),
    ("entity.name.tag", "Tag"),
    ("entity.name.type", "Type"),
    ("entity.other.attribute-name", "Label"),
    ("invalid", "Error"),
    ("keyword", "Keyword"),
    ("keyword.control", "Statement"),
    ("keyword.control.conditional", "Conditional"),
    ("keyword.control.import", "Include"),
    ("keyword.control.loop", "Repeat"),
    ("keyword.operator", "Operator"),
    ("markup.bold", "Bold"),
    ("markup.heading", "Title"),
    ("markup.italic", "Italic"),
    ("markup.underline.link", "Underlined"),
    ("meta.preprocessor", "PreProc"),
    ("punctuation", "Delimiter"),
    ("punctuation.definition.comment", "Comment"),
    ("punctuation.definition.string", "String"),
    ("storage", "StorageClass"),
    ("storage.type", "Type"),
    ("string", "String"),
    ("string.regexp", "SpecialChar"),
    ("support.class", "Type"),
    ("support.constant", "Constant"),
    ("support.function", "Function"),
    ("support.type", "Type"),
    ("support.type.property-name", "Label"),
    ("variable", "Identifier"),
    ("variable.language", "Special"),
    ("variable.parameter", "Identifier"),
];

/// Merge user rules over the defaults; user rules win on identical keys.
pub fn merge_rules(overrides: &HashMap<String, String>) -> HashMap<String, String> {
    let mut merged: HashMap<String, String> = DEFAULT_RULES
        .iter()
        .map(|(scope, group)| (scope.to_string(), group.to_string()))
        .collect();

    for (scope, group) in overrides {
        merged.insert(scope.clone(), group.clone());
    }

    merged
}

/// Precompiled rule list for repeated lookups
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    /// Sorted by key length, longest first
    rules: Vec<(String, String)>,
}

impl ScopeResolver {
    /// Build a resolver from user rules merged over the defaults
    pub fn new(overrides: &HashMap<String, String>) -> Self {
        Self::from_rules(merge_rules(overrides))
    }

    /// Build a resolver from an already merged mapping
    pub fn from_rules(rules: HashMap<String, String>) -> Self {
        let mut rules: Vec<(String, String)> = rules.into_iter().collect();
        // Equal-length keys cannot both prefix the same scope; the secondary
        // key only makes the order deterministic.
        rules.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { rules }
    }

    /// Highlight group for a token's scopes, if any rule applies.
    ///
    /// Scopes are searched from the innermost outward. The first scope is the
    /// grammar's root and never takes part in matching.
    pub fn resolve<S: AsRef<str>>(&self, scopes: &[S]) -> Option<&str> {
        scopes.iter().skip(1).rev().find_map(|scope| {
            let scope = scope.as_ref();
            self.rules
                .iter()
                .find(|(prefix, _)| scope.starts_with(prefix.as_str()))
                .map(|(_, group)| group.as_str())
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

/// One-shot resolution: merge, sort and match in a single call.
pub fn resolve_scopes<S: AsRef<str>>(
    scopes: &[S],
    overrides: &HashMap<String, String>,
) -> Option<String> {
    ScopeResolver::new(overrides)
        .resolve(scopes)
        .map(str::to_string)
}
