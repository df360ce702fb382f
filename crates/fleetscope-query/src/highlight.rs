use regex::Regex;

/// Highlights occurrences of the log search text in displayed messages.
///
/// The backend applies the search as a case-sensitive regex; this mirrors it
/// locally for display only.
#[derive(Clone)]
pub struct SearchHighlighter {
    regex: Option<Regex>,
    pattern: String,
}

impl SearchHighlighter {
    /// Compile a pattern; an empty pattern highlights nothing
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = if pattern.is_empty() {
            None
        } else {
            Some(Regex::new(pattern)?)
        };

        Ok(Self {
            regex,
            pattern: pattern.to_string(),
        })
    }

    /// Byte ranges of all non-empty matches
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }
}

impl std::fmt::Debug for SearchHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHighlighter")
            .field("pattern", &self.pattern)
            .finish()
    }
}
