//! Domain name normalization and name sets.
//!
//! Provides wildcard-label stripping for certificate names and `NameSet`, the
//! case-insensitive, insertion-ordered set of names built for each hostname.

use std::collections::HashSet;

/// Removes wildcard labels from a certificate name.
///
/// Labels are scanned from the rightmost toward the leftmost, and the scan
/// stops at the first label equal to `*`. The result is the suffix starting
/// at the last label visited before that stop. An empty string is returned
/// when that suffix would be only the rightmost label, which covers
/// single-label names, a lone `*`, `*.com` and `a.*.com`. A name whose
/// rightmost label is `*` (`example.*`) stops the scan immediately and comes
/// back unchanged.
///
/// # Examples
///
/// ```
/// use cert_harvest::domain::strip_wildcard_label;
///
/// assert_eq!(strip_wildcard_label("*.example.com"), "example.com");
/// assert_eq!(strip_wildcard_label("www.example.com"), "www.example.com");
/// assert_eq!(strip_wildcard_label("*"), "");
/// assert_eq!(strip_wildcard_label("localhost"), "");
/// assert_eq!(strip_wildcard_label("example.*"), "example.*");
/// ```
pub fn strip_wildcard_label(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    let last = labels.len() - 1;

    let mut index = 0;
    for i in (0..labels.len()).rev() {
        if labels[i].trim() == "*" {
            break;
        }
        index = i;
    }

    if index == last {
        return String::new();
    }
    labels[index..].join(".")
}

/// Ordered set of hostnames, unique under case-insensitive comparison.
///
/// Names keep the order in which they were first accepted and are never
/// removed. Names accepted through `insert`/`merge` are stored lower-cased;
/// `insert_verbatim` and `from_existing` keep the spelling they are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl NameSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set over names that were already accepted, keeping their case.
    ///
    /// Later duplicates (case-insensitive) of an earlier entry are dropped.
    pub fn from_existing<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for name in existing {
            let name = name.into();
            if set.seen.insert(name.to_lowercase()) {
                set.names.push(name);
            }
        }
        set
    }

    /// Inserts `name` lower-cased unless it is empty or already present.
    ///
    /// Returns `true` if the name was added.
    pub fn insert(&mut self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let lowered = name.to_lowercase();
        if !self.seen.insert(lowered.clone()) {
            return false;
        }
        self.names.push(lowered);
        true
    }

    /// Inserts `name` as spelled unless it is empty or already present.
    ///
    /// Only the duplicate check ignores case. Returns `true` if the name was
    /// added.
    pub fn insert_verbatim(&mut self, name: &str) -> bool {
        if name.is_empty() || !self.seen.insert(name.to_lowercase()) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Appends the names of `other` not already present, keeping their
    /// stored spelling.
    ///
    /// Returns the number of names added.
    pub fn append(&mut self, other: NameSet) -> usize {
        other
            .names
            .into_iter()
            .filter(|name| self.insert_verbatim(name))
            .count()
    }

    /// Appends every candidate not already present, in order.
    ///
    /// Returns the number of names added.
    pub fn merge<I, S>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .filter(|candidate| self.insert(candidate.as_ref()))
            .count()
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(&name.to_lowercase())
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name was accepted.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The names in first-seen order.
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// Iterates over the names in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    /// Consumes the set, returning the names in first-seen order.
    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl IntoIterator for NameSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl<'a> IntoIterator for &'a NameSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Returns `existing` followed by every candidate not yet seen.
///
/// A candidate is a duplicate when it matches an entry of `existing`, or a
/// candidate accepted earlier in the same call, ignoring case. Accepted
/// candidates are lower-cased. Entries of `existing` are kept as they are.
///
/// ```
/// use cert_harvest::domain::merge;
///
/// let merged = merge(vec!["x.com".to_string()], ["X.com", "y.com"]);
/// assert_eq!(merged, vec!["x.com", "y.com"]);
/// ```
pub fn merge<I, S>(existing: Vec<String>, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = NameSet::from_existing(existing);
    set.merge(candidates);
    set.into_vec()
}

#[cfg(test)]
mod tests;
