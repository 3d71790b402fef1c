//! Resolve concrete request paths to contract path templates
//!
//! Templates are compiled once into anchored regexes. More specific
//! templates (more literal segments) are tried first, so `/projects/templates`
//! wins over `/projects/{id}` for the request `/projects/templates`.

use regex::Regex;

/// One compiled contract path template.
#[derive(Debug, Clone)]
struct PathTemplate {
    template: String,
    pattern: Regex,
    literal_segments: usize,
}

/// Matches request paths against a fixed set of contract path templates.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    templates: Vec<PathTemplate>,
    strip_prefixes: Vec<String>,
}

impl PathMatcher {
    /// Compile `templates`, keeping declaration order among equally specific entries.
    ///
    /// `strip_prefixes` are tried in order; at most one is removed from a request path.
    #[must_use]
    pub fn new<I, S>(templates: I, strip_prefixes: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled: Vec<PathTemplate> = templates
            .into_iter()
            .filter_map(|t| compile(t.as_ref()))
            .collect();

        // Stable: ties keep declaration order
        compiled.sort_by(|a, b| b.literal_segments.cmp(&a.literal_segments));

        Self {
            templates: compiled,
            strip_prefixes: strip_prefixes.to_vec(),
        }
    }

    /// Return the template matching `request_path`, if any.
    #[must_use]
    pub fn find(&self, request_path: &str) -> Option<&str> {
        let normalized = self.normalize(request_path);
        self.templates
            .iter()
            .find(|t| t.pattern.is_match(normalized))
            .map(|t| t.template.as_str())
    }

    /// Number of compiled templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Strip the first matching prefix, then trailing slashes (root `/` is kept).
    fn normalize<'p>(&self, request_path: &'p str) -> &'p str {
        let stripped = self
            .strip_prefixes
            .iter()
            .find_map(|prefix| request_path.strip_prefix(prefix.as_str()))
            .unwrap_or(request_path);

        if stripped != "/" && stripped.ends_with('/') {
            stripped.trim_end_matches('/')
        } else {
            stripped
        }
    }
}

fn compile(template: &str) -> Option<PathTemplate> {
    let mut literal_segments = 0;
    let segments: Vec<String> = template
        .trim_matches('/')
        .split('/')
        .map(|segment| {
            if is_placeholder(segment) {
                "[^/]+".to_string()
            } else {
                literal_segments += 1;
                regex::escape(segment)
            }
        })
        .collect();

    let source = format!("^/{}$", segments.join("/"));
    match Regex::new(&source) {
        Ok(pattern) => Some(PathTemplate {
            template: template.to_string(),
            pattern,
            literal_segments,
        }),
        Err(e) => {
            tracing::warn!(template, error = %e, "skipping uncompilable path template");
            None
        }
    }
}

/// `{name}` with at least one character between the braces.
fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}
