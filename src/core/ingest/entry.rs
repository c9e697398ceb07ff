//! Modern Entry Model

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Share of one form's tags that must occur in another's for two forms
/// with the same text to count as one.
pub const TAG_OVERLAP_THRESHOLD: f64 = 0.7;

/// Tags that mark non-paradigm rows (transliterations, table headers).
pub const JUNK_TAGS: &[&str] = &["romanization", "table-tags"];

/// One inflected form with its grammatical tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadigmForm {
    pub form: String,
    /// Lowercased, deduplicated, sorted
    pub tags: Vec<String>,
}

impl ParadigmForm {
    pub fn new<S: AsRef<str>>(form: &str, tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            form: form.trim().to_string(),
            tags: normalize_tags(tags),
        }
    }

    /// Same text and overlapping tags.
    pub fn same_form(&self, other: &ParadigmForm) -> bool {
        self.form == other.form && tags_match(&self.tags, &other.tags)
    }

    fn absorb_tags(&mut self, other: &ParadigmForm) {
        let merged: BTreeSet<String> = self.tags.drain(..).chain(other.tags.iter().cloned()).collect();
        self.tags = merged.into_iter().collect();
    }
}

/// Lowercase and deduplicate tags. Junk tags are kept so the caller can
/// reject the form; see [`is_junk`].
pub fn normalize_tags<S: AsRef<str>>(tags: impl IntoIterator<Item = S>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn is_junk(tags: &[String]) -> bool {
    tags.iter().any(|t| JUNK_TAGS.contains(&t.as_str()))
}

/// At least [`TAG_OVERLAP_THRESHOLD`] of either side's tags occur in the
/// other. A tagless form matches any tag set.
pub fn tags_match(a: &[String], b: &[String]) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }
    let shared = a.iter().filter(|t| b.contains(t)).count() as f64;
    let ratio = (shared / a.len() as f64).max(shared / b.len() as f64);
    ratio >= TAG_OVERLAP_THRESHOLD
}

/// A Modern Greek headword as ingested from the wiktionary dumps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModernEntry {
    pub lemma: String,
    #[serde(default)]
    pub pos: String,
    #[serde(default)]
    pub paradigm: Vec<ParadigmForm>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub senses: Vec<String>,
    /// English glosses from the gloss-only sources
    #[serde(default)]
    pub glosses: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etymology: Option<String>,
    /// Modern word this one was derived from, when the source names it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Set when the etymology text names the word a compound
    #[serde(default)]
    pub compound: bool,
}

impl ModernEntry {
    pub fn new(lemma: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            ..Default::default()
        }
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = pos.into();
        self
    }

    pub fn with_etymology(mut self, etymology: impl Into<String>) -> Self {
        self.etymology = Some(etymology.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_compound(mut self, compound: bool) -> Self {
        self.compound = compound;
        self
    }

    /// Add a form unless an equivalent one is present; equivalent forms
    /// pool their tags. Returns whether a new form was added.
    pub fn add_form(&mut self, form: ParadigmForm) -> bool {
        if form.form.is_empty() || is_junk(&form.tags) {
            return false;
        }
        match self.paradigm.iter_mut().find(|f| f.same_form(&form)) {
            Some(existing) => {
                existing.absorb_tags(&form);
                false
            }
            None => {
                self.paradigm.push(form);
                true
            }
        }
    }

    pub fn add_sense(&mut self, gloss: &str) {
        let gloss = gloss.trim();
        if !gloss.is_empty() && !self.senses.iter().any(|s| s == gloss) {
            self.senses.push(gloss.to_string());
        }
    }

    pub fn add_example(&mut self, example: &str) {
        let example = example.replace("'''", "");
        let example = example.trim();
        if !example.is_empty() && !self.examples.iter().any(|e| e == example) {
            self.examples.push(example.to_string());
        }
    }

    pub fn add_gloss(&mut self, gloss: &str) {
        let gloss = gloss.trim();
        if !gloss.is_empty() && !self.glosses.iter().any(|g| g == gloss) {
            self.glosses.push(gloss.to_string());
        }
    }

    pub fn add_synonym(&mut self, synonym: &str) {
        let synonym = synonym.trim();
        if !synonym.is_empty() && !self.synonyms.iter().any(|s| s == synonym) {
            self.synonyms.push(synonym.to_string());
        }
    }

    pub fn etymology_text(&self) -> &str {
        self.etymology.as_deref().unwrap_or_default()
    }
}
