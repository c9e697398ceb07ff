//! Entry Extraction
//!
//! Turns one `<entryFree>` container of the typed markup tree into a
//! [`DictionaryEntry`]: definition, aorist and scored citations.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::canon::{is_greek, LexicalKey};
use super::config::OracleConfig;
use super::index::{Citation, DictionaryEntry};
use super::markup::{
    collapse_whitespace, scan_siblings, ContainerNode, Direction, Node, TextRole, Visit,
};
use super::scoring::{AuthorTier, CitationScorer};
use super::translit::to_native;

/// Why an entry produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingKey,
    /// The key canonicalizes to nothing (digits or punctuation only)
    EmptyKey,
    /// No definition, aorist or citation
    NoContent,
}

const FILLERS: &[&str] = &["ib", "id", "ibid", "op. cit.", "loc. cit."];

static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.])").expect("valid regex"));

/// Article left hanging at the end of a trimmed definition
static DANGLING_ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(?:the|a)$").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct EntryExtractor {
    scorer: CitationScorer,
    sense_tag: String,
    window: usize,
}

impl EntryExtractor {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            scorer: CitationScorer::new(config.tiers.clone()),
            sense_tag: config.sense_tag.clone(),
            window: config.scan_window,
        }
    }

    pub fn extract(&self, entry: &ContainerNode) -> Result<DictionaryEntry, SkipReason> {
        let raw_key = entry.key.as_deref().ok_or(SkipReason::MissingKey)?;
        let key = LexicalKey::derive(raw_key);
        if key.is_empty() {
            return Err(SkipReason::EmptyKey);
        }

        let headword = headword(raw_key);
        let definition = clean_definition(&self.definition_flow(entry));
        let aorist = self.aorist(entry);
        let citations = self.citations(entry, &headword, &definition);

        let mut out = DictionaryEntry::new(key, headword);
        out.add_definition(&definition);
        if let Some(aorist) = aorist {
            out.add_aorist(&aorist);
        }
        out.add_citations(citations);

        if out.is_empty() {
            return Err(SkipReason::NoContent);
        }
        Ok(out)
    }

    fn senses<'a>(&self, entry: &'a ContainerNode) -> Vec<&'a ContainerNode> {
        entry.find_all(&self.sense_tag)
    }

    /// Translations and short glosses of the first sense that has any,
    /// up to its first reference.
    fn definition_flow(&self, entry: &ContainerNode) -> String {
        for sense in self.senses(entry) {
            let mut parts = Vec::new();
            for child in &sense.children {
                match child {
                    Node::Text(t) if t.role == TextRole::Translation => {
                        let text = t.text.trim().trim_matches(|c| c == ',' || c == ';');
                        if !text.is_empty() {
                            parts.push(text.to_string());
                        }
                    }
                    Node::Text(t) if t.role == TextRole::Foreign => {
                        let greek = to_native(&t.text);
                        if greek.split_whitespace().count() < 4 && !greek.is_empty() {
                            parts.push(greek);
                        }
                    }
                    Node::Text(t) if t.role == TextRole::Bibliography => break,
                    Node::Citation(_) => break,
                    _ => {}
                }
            }
            if !parts.is_empty() {
                return parts.join("; ");
            }
        }
        String::new()
    }

    /// First Greek quotation after an aorist tense label, before the next
    /// reference or sense.
    fn aorist(&self, entry: &ContainerNode) -> Option<String> {
        let mut armed = false;
        for visit in entry.walk() {
            match visit {
                Visit::Text(t) if t.role == TextRole::Tense && t.text.contains("aor") => {
                    armed = true;
                }
                Visit::Text(t) if armed && t.role == TextRole::Quote => {
                    let greek = to_native(&t.text);
                    if is_greek(&greek) {
                        return Some(greek);
                    }
                }
                Visit::Citation(c) if armed => {
                    if let Some(quote) = &c.quote {
                        let greek = to_native(quote);
                        if is_greek(&greek) {
                            return Some(greek);
                        }
                    }
                    if c.bibliography.is_some() {
                        armed = false;
                    }
                }
                Visit::Text(t) if t.role == TextRole::Bibliography => armed = false,
                Visit::Enter(c) if c.tag == self.sense_tag => armed = false,
                _ => {}
            }
        }
        None
    }

    fn citations(&self, entry: &ContainerNode, headword: &str, definition: &str) -> Vec<Citation> {
        let mut out = Vec::new();

        for cit in entry.citations() {
            let Some(quote) = cit.quote.as_deref() else {
                continue;
            };
            let translation = cit
                .translation
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            out.extend(self.candidate(
                excerpt(quote),
                cit.bibliography.as_deref().unwrap_or_default(),
                translation,
            ));
        }

        let mut last_translation = definition.to_string();
        for sense in self.senses(entry) {
            let children = &sense.children;
            let mut claimed = HashSet::new();

            for (i, child) in children.iter().enumerate() {
                let Node::Text(text) = child else {
                    continue;
                };
                match text.role {
                    TextRole::Translation if !text.text.is_empty() => {
                        last_translation = text.text.trim().to_string();
                    }
                    TextRole::Foreign if !text.text.is_empty() => {
                        let is_foreign = |n: &Node| n.has_role(TextRole::Foreign);
                        let Some(j) = scan_siblings(
                            children,
                            i,
                            Direction::Forward,
                            self.window,
                            |n| n.has_role(TextRole::Bibliography),
                            is_foreign,
                        ) else {
                            continue;
                        };
                        claimed.insert(j);

                        let mut translation = between(&children[i + 1..j]);
                        if translation.is_empty() {
                            translation = scan_siblings(
                                children,
                                i,
                                Direction::Backward,
                                self.window,
                                |n| n.has_role(TextRole::Translation),
                                is_foreign,
                            )
                            .and_then(|k| children[k].as_text())
                            .map(|t| clean_rich_translation(&t.text))
                            .unwrap_or_default();
                        }
                        let bibl = children[j].as_text().map(|t| t.text.as_str()).unwrap_or_default();
                        out.extend(self.candidate(
                            excerpt(&text.text),
                            bibl,
                            Some(translation).filter(|t| !t.is_empty()),
                        ));
                    }
                    TextRole::Bibliography if !claimed.contains(&i) => {
                        let tier = self.scorer.tier(&text.text);
                        if tier.is_canonical() && !last_translation.is_empty() && !headword.is_empty() {
                            out.extend(self.candidate(
                                headword.to_string(),
                                &text.text,
                                Some(last_translation.clone()),
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }

        out
    }

    fn candidate(&self, excerpt: String, bibliography: &str, translation: Option<String>) -> Option<Citation> {
        if excerpt.split_whitespace().next().is_none() {
            return None;
        }
        let author = bibliography.trim().to_string();
        let tier = self.scorer.tier(&author);
        if tier == AuthorTier::Noise {
            return None;
        }
        let score = self.scorer.score(tier, translation.is_some());
        Some(Citation {
            excerpt,
            author,
            translation,
            tier,
            score,
        })
    }
}

/// Native-script headword with homonym digits and stray breves removed.
fn headword(raw_key: &str) -> String {
    to_native(&raw_key.replace('^', ""))
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .trim()
        .to_string()
}

fn excerpt(beta: &str) -> String {
    to_native(beta)
        .replace(['[', ']'], "")
        .trim()
        .to_string()
}

fn between(nodes: &[Node]) -> String {
    let joined = nodes
        .iter()
        .map(Node::text_content)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let joined = SPACE_BEFORE_PUNCT_RE.replace_all(&joined, "$1");
    clean_rich_translation(&collapse_whitespace(&joined))
}

/// Trim an inline translation; drop fillers and fragments.
pub fn clean_rich_translation(text: &str) -> String {
    let text = text.trim_matches(|c: char| c.is_whitespace() || "[](),;.".contains(c));
    if text.chars().count() < 2 || FILLERS.contains(&text.to_lowercase().as_str()) {
        return String::new();
    }
    text.to_string()
}

/// Drop abbreviation fragments, bracketed notes and bibliography noise from
/// a `;`-separated definition, then any trailing dangling article.
pub fn clean_definition(text: &str) -> String {
    let parts: Vec<&str> = text
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| {
            let abbreviation = part.chars().next().is_some_and(char::is_uppercase)
                && part.ends_with('.')
                && part.chars().count() < 20;
            let reference = part.contains("Études") || part.contains("Rev.");
            let bracketed = part.contains('[') && part.contains(']');
            !(abbreviation || reference || bracketed)
        })
        .collect();

    DANGLING_ARTICLE_RE.replace(&parts.join("; "), "").into_owned()
}
