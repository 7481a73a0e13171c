/// Include / exclude name filtering for extraction
use regex::Regex;

use std::fmt::{Debug, Formatter};

use crate::error::{Error, Result};

/// Something that can decide whether an entry name matches
pub trait NameMatcher {
    /// Return true if `name` matches
    fn is_match(&self, name: &str) -> bool;
}

impl NameMatcher for Regex {
    fn is_match(&self, name: &str) -> bool {
        Regex::is_match(self, name)
    }
}

/// A shell-style wildcard pattern matched against the whole name.
/// `*` matches any run of characters, `?` matches exactly one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wildcard {
    pattern: Vec<char>,
}

impl Wildcard {
    /// Create a wildcard pattern
    pub fn new(pattern: &str) -> Self {
        Wildcard {
            pattern: pattern.chars().collect(),
        }
    }
}

impl NameMatcher for Wildcard {
    fn is_match(&self, name: &str) -> bool {
        fn do_match(pattern: &[char], text: &[char]) -> bool {
            match (pattern.first(), text.first()) {
                (None, None) => true,
                // Either the star matches nothing, or it eats one more character
                (Some('*'), _) => {
                    do_match(&pattern[1..], text)
                        || (!text.is_empty() && do_match(pattern, &text[1..]))
                }
                (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
                (Some(p), Some(t)) if p == t => do_match(&pattern[1..], &text[1..]),
                _ => false,
            }
        }

        let text: Vec<char> = name.chars().collect();
        do_match(&self.pattern, &text)
    }
}

/// An ordered collection of name matchers
#[derive(Default)]
pub struct PatternSet {
    matchers: Vec<Box<dyn NameMatcher>>,
}

impl Debug for PatternSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PatternSet({} patterns)", self.matchers.len())
    }
}

impl PatternSet {
    /// An empty set, matches nothing
    pub fn new() -> Self {
        PatternSet::default()
    }

    /// Build a set of wildcard patterns
    pub fn wildcards<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut set = PatternSet::new();
        for pattern in patterns {
            set.push(Wildcard::new(pattern.as_ref()));
        }
        set
    }

    /// Build a set of regular expressions.
    /// Fails with [`Error::Pattern`] on the first pattern that doesn't compile.
    pub fn regexes<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut set = PatternSet::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|source| Error::Pattern {
                pattern: String::from(pattern),
                source,
            })?;
            set.push(regex);
        }
        Ok(set)
    }

    /// Add a matcher to the set
    pub fn push<M: NameMatcher + 'static>(&mut self, matcher: M) {
        self.matchers.push(Box::new(matcher));
    }

    /// Number of matchers in the set
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// True if the set has no matchers
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True if any matcher in the set matches `name`
    pub fn matches_any(&self, name: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(name))
    }
}

/// Decides which entries get extracted
///
/// # Examples
///
/// ```
/// use mix_fat::filter::{EntryFilter, PatternSet};
///
/// let filter = EntryFilter::new(PatternSet::wildcards(&["*.XA"]), PatternSet::new());
/// assert!(filter.selects("TRACK.XA"));
///
/// let filter = EntryFilter::new(
///     PatternSet::wildcards(&["*.XA"]),
///     PatternSet::wildcards(&["TRACK.*"]),
/// );
/// assert!(!filter.selects("TRACK.XA"));
/// ```
#[derive(Debug, Default)]
pub struct EntryFilter {
    include: PatternSet,
    exclude: PatternSet,
}

impl EntryFilter {
    /// Select names matching any include pattern and no exclude pattern
    pub fn new(include: PatternSet, exclude: PatternSet) -> Self {
        EntryFilter { include, exclude }
    }

    /// A filter that selects every entry
    pub fn all() -> Self {
        EntryFilter::new(PatternSet::wildcards(&["*"]), PatternSet::new())
    }

    /// Decide whether `name` should be extracted.
    /// Callers pass the name as stored in the index, not the display key.
    pub fn selects(&self, name: &str) -> bool {
        self.include.matches_any(name) && !self.exclude.matches_any(name)
    }
}
