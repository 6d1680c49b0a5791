use std::borrow::Cow;

use anyhow::{Context, Result};
use regex::Regex;


/// Report code and version stamp printed on every page, e.g. `PVLE.007.853883 - Versão 1.0`.
const REPORT_CODE_PATTERN: &str = r"\p{Lu}+\.\d{3}\.\d{6} - Versão \d\.\d[^\S\r\n]*";
const TEMPLATE_MARKER_PATTERN: &str = r"\$\w+_\d+\$[^\S\r\n]*";
const RUBRIC_MARKER_PATTERN: &str = r"Rub\d+[^\S\r\n]*";
const PAGINATION_LINE_PATTERN: &str =
    r"(?m)^[^\S\r\n]*\d+[^\S\r\n]+/[^\S\r\n]+\d+[^\S\r\n]*(?:\r?\n|\z)";
const SIGNATURE_BLOCK_PATTERN: &str = r"(?s)\bAssinaturas\b.*\z";
/// Two or more line breaks, counting whitespace-only lines and the
/// horizontal whitespace around the run.
const BLANK_RUN_PATTERN: &str = r"[^\S\r\n]*(?:\r?\n[^\S\r\n]*){2,}";

const BLANK_LINE: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    Remove,
    Literal(&'static str),
}

impl Replacement {
    fn as_str(self) -> &'static str {
        match self {
            Self::Remove => "",
            Self::Literal(value) => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizationRule {
    name: &'static str,
    matcher: Regex,
    replacement: Replacement,
}

impl NormalizationRule {
    pub fn new(name: &'static str, pattern: &str, replacement: Replacement) -> Result<Self> {
        let matcher = Regex::new(pattern)
            .with_context(|| format!("failed to compile normalization rule '{name}'"))?;
        Ok(Self {
            name,
            matcher,
            replacement,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replaces every match; borrows the input when nothing matched.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.matcher
            .replace_all(text, regex::NoExpand(self.replacement.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerOptions {
    pub strip_signature_block: bool,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            strip_signature_block: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    rules: Vec<NormalizationRule>,
}

impl TextNormalizer {
    #[cfg(test)]
    pub fn new() -> Result<Self> {
        Self::with_options(NormalizerOptions::default())
    }

    pub fn with_options(options: NormalizerOptions) -> Result<Self> {
        let mut rules = vec![
            NormalizationRule::new("report_code", REPORT_CODE_PATTERN, Replacement::Remove)?,
            NormalizationRule::new(
                "template_marker",
                TEMPLATE_MARKER_PATTERN,
                Replacement::Remove,
            )?,
            NormalizationRule::new("rubric_marker", RUBRIC_MARKER_PATTERN, Replacement::Remove)?,
            NormalizationRule::new(
                "pagination_line",
                PAGINATION_LINE_PATTERN,
                Replacement::Remove,
            )?,
        ];
        if options.strip_signature_block {
            rules.push(NormalizationRule::new(
                "signature_block",
                SIGNATURE_BLOCK_PATTERN,
                Replacement::Remove,
            )?);
        }
        // Must stay last: earlier removals leave blank runs behind.
        rules.push(NormalizationRule::new(
            "blank_runs",
            BLANK_RUN_PATTERN,
            Replacement::Literal(BLANK_LINE),
        )?);

        Ok(Self::with_rules(rules))
    }

    pub fn with_rules(rules: Vec<NormalizationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }

    /// Runs the rule sequence until the text stops changing.
    ///
    /// A removal can splice two halves into a fresh match (`RuRub1b2`), so a
    /// single pass is not idempotent. Each pass that changes the text makes it
    /// strictly shorter, which bounds the loop.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.normalize_once(raw);
        loop {
            let next = self.normalize_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn normalize_once(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for rule in &self.rules {
            let replaced = match rule.apply(&text) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(replaced) => replaced,
            };
            text = replaced;
        }
        text.trim().to_string()
    }
}
