//! Report description → (ordinal, title)
//!
//! Committee report descriptions usually lead with their ordinal, either
//! numeric with a divider (`"58th Report - Annual Review"`) or spelled out
//! (`"First Special Report Government Response"`). The accepted shapes are
//! an ordered list of rules, tried in turn; the first that accepts wins.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Hyphen, en-dash, em-dash or colon with optional surrounding whitespace
const DIVIDER: &str = "\\s*[-\u{2013}\u{2014}:]\\s*";

/// How a rule locates the ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdinalKind {
    /// Split on the first divider; the left side must match the pattern.
    Divided,
    /// The pattern must match at the start, followed by whitespace or a divider.
    Prefix,
}

/// One configurable ordinal rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalSpec {
    pub kind: OrdinalKind,
    pub pattern: String,
}

impl OrdinalSpec {
    pub fn divided(pattern: impl Into<String>) -> Self {
        Self {
            kind: OrdinalKind::Divided,
            pattern: pattern.into(),
        }
    }

    pub fn prefix(pattern: impl Into<String>) -> Self {
        Self {
            kind: OrdinalKind::Prefix,
            pattern: pattern.into(),
        }
    }

    /// Numeric ordinals with a divider, then spelled-out ordinals
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::divided(r"\d+(?:st|nd|rd|th)\s+(?:Special\s+)?Report"),
            Self::prefix(
                r"(?:(?:First|Second|Third|Fourth|Fifth|Sixth|Seventh|Eighth|Ninth|Tenth)\s+(?:Special\s+)?Report|Special\s+Report)",
            ),
        ]
    }
}

/// Result of splitting a description
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitleSplit {
    /// Empty when no rule accepted
    pub ordinal: String,
    pub title: String,
}

#[derive(Debug, Clone)]
enum Rule {
    Divided { divider: Regex, left: Regex },
    Prefix(Regex),
}

impl Rule {
    fn compile(spec: &OrdinalSpec) -> Result<Self, regex_lite::Error> {
        match spec.kind {
            OrdinalKind::Divided => Ok(Self::Divided {
                divider: Regex::new(DIVIDER)?,
                left: Regex::new(&format!("(?i)^(?:{})$", spec.pattern))?,
            }),
            OrdinalKind::Prefix => Ok(Self::Prefix(Regex::new(&format!(
                r"(?is)^(?P<ordinal>{})(?:{}|\s+)(?P<title>\S.*)$",
                spec.pattern, DIVIDER
            ))?)),
        }
    }

    fn apply(&self, input: &str) -> Option<TitleSplit> {
        match self {
            Self::Divided { divider, left } => {
                let found = divider.find(input)?;
                let head = input[..found.start()].trim();
                let tail = input[found.end()..].trim();
                left.is_match(head).then(|| TitleSplit {
                    ordinal: head.to_string(),
                    title: tail.to_string(),
                })
            }
            Self::Prefix(re) => {
                let caps = re.captures(input.trim())?;
                Some(TitleSplit {
                    ordinal: caps.name("ordinal")?.as_str().trim().to_string(),
                    title: caps.name("title")?.as_str().trim().to_string(),
                })
            }
        }
    }
}

/// Ordered set of ordinal rules
#[derive(Debug, Clone)]
pub struct OrdinalGrammar {
    rules: Vec<Rule>,
}

impl OrdinalGrammar {
    /// Compile rules from configuration. Fails on an invalid pattern.
    pub fn from_specs(specs: &[OrdinalSpec]) -> Result<Self, regex_lite::Error> {
        let rules = specs.iter().map(Rule::compile).collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Split `input` into ordinal and title.
    ///
    /// When no rule accepts, the ordinal is empty and the title is the
    /// input unchanged.
    pub fn split(&self, input: &str) -> TitleSplit {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(input))
            .unwrap_or_else(|| TitleSplit {
                ordinal: String::new(),
                title: input.to_string(),
            })
    }
}

impl Default for OrdinalGrammar {
    fn default() -> Self {
        Self::from_specs(&OrdinalSpec::defaults()).expect("built-in ordinal rules compile")
    }
}
