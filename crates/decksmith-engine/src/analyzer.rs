//! Regex-based content analysis.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use decksmith_core::analysis::{
    ActionItem, Comparison, ContentAnalysis, ContentAnalyzer, Feature, Quote, Statistic,
};
use regex::Regex;

/// Tracing target for content analysis.
const TRACING_TARGET: &str = "decksmith_engine::analyzer";

/// Upper bounds on extracted signals.
const MAX_TOPICS: usize = 8;
const MAX_ITEMS: usize = 12;

static STAT_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)((?:[$€£]\s?)?\d+(?:[.,]\d+)?\s?(?:%|prosent\b|percent\b|kr\b|nok\b|usd\b|eur\b|mnok\b|millioner\b|milliarder\b|million\b|billion\b|mill\b\.?)|[$€£]\s?\d+(?:[.,]\d+)?)[ \t]*((?:[\p{L}-]+[ \t]?){0,4})",
    )
    .expect("valid regex")
});
static STAT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+(?:[.,]\d+)?)\s+(users|customers|clients|employees|downloads|orders|projects|participants|brukere|kunder|ansatte|nedlastinger|ordre|prosjekter|deltakere)\b",
    )
    .expect("valid regex")
});
static QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"["“«]([^"”»\n]{10,300})["”»](?:\s*[-\x{2013}\x{2014}]\s*([\p{L}][\p{L}. ]{1,40}))?"#,
    )
    .expect("valid regex")
});
static DECISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(decided|decision|agreed|approved|besluttet|beslutning|vedtatt|vedtak|enige om|godkjent)\b",
    )
    .expect("valid regex")
});
static ACTION_CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*]\s*\[ \]\s*(.+)$").expect("valid regex"));
static ACTION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*•]\s*)?(?:todo|action|tiltak|oppgave)\s*:\s*(.+)$",
    )
    .expect("valid regex")
});
static ACTION_OWNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:ansvarlig|responsible|owner|eier)\b\s*:?\s*(\p{Lu}[\p{L}-]+)|@([\p{L}][\p{L}\d_-]*)",
    )
    .expect("valid regex")
});
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#{1,3}\s+(.+?)\s*#*\s*$").expect("valid regex"));
static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([\p{Lu}][^:.!?]{2,50}):\s*$").expect("valid regex"));
static CAPITALISED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{Lu}\p{Ll}{3,}\b").expect("valid regex"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})[.)]\s+(.+)$").expect("valid regex"));
static SEQUENCE_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*•]\s*)?(?:first|then|next|finally|først|deretter|så|til slutt|(?:step|phase|steg|fase)\s+\d+)\b[,:]?\s*(.+)$",
    )
    .expect("valid regex")
});
static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)((?:[\p{L}-]+\s){0,2}[\p{L}-]+)\s+(?:vs\.?|versus|compared (?:to|with)|sammenlignet med|kontra)\s+((?:[\p{L}-]+\s?){1,3})",
    )
    .expect("valid regex")
});
static FEATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*•]\s*([^:\n]{2,40}):\s*(.{5,})$").expect("valid regex"));
static ROADMAP_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(roadmap|veikart|milestones?|milepæl(?:er)?)\b",
    )
    .expect("valid regex")
});
static PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(Q[1-4]|H[12]|januar|january|februar|february|april|juni|june|juli|july|august|september|oktober|october|november|desember|december)\b",
    )
    .expect("valid regex")
});
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s|$)").expect("valid regex"));

/// Language-agnostic heuristic analyzer for English and Norwegian input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl ContentAnalyzer for HeuristicAnalyzer {
    fn analyze(&self, text: &str) -> ContentAnalysis {
        let lines: Vec<&str> = text.lines().collect();

        let analysis = ContentAnalysis {
            statistics: statistics(text),
            quotes: quotes(text),
            decisions: decisions(text),
            action_items: action_items(&lines),
            topics: topics(text, &lines),
            sequential_steps: sequential_steps(&lines),
            comparisons: comparisons(text),
            features: features(&lines),
            has_roadmap: has_roadmap(text),
            word_count: text.split_whitespace().count(),
            sentence_count: sentence_count(text),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            words = analysis.word_count,
            statistics = analysis.statistics.len(),
            quotes = analysis.quotes.len(),
            decisions = analysis.decisions.len(),
            action_items = analysis.action_items.len(),
            topics = analysis.topics.len(),
            steps = analysis.sequential_steps.len(),
            features = analysis.features.len(),
            has_roadmap = analysis.has_roadmap,
            "Content analyzed"
        );

        analysis
    }
}

fn clean(text: &str) -> String {
    text.trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .trim_end_matches(['.', ',', ';', ':'])
        .to_string()
}

fn push_unique(list: &mut Vec<String>, seen: &mut HashSet<String>, value: String) {
    if !value.is_empty() && list.len() < MAX_ITEMS && seen.insert(value.to_lowercase()) {
        list.push(value);
    }
}

fn statistics(text: &str) -> Vec<Statistic> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for caps in STAT_UNIT.captures_iter(text) {
        let value = caps[1].trim().to_string();
        let label = caps.get(2).map(|m| clean(m.as_str())).unwrap_or_default();
        if seen.insert(value.clone()) {
            out.push(Statistic { value, label });
        }
    }
    for caps in STAT_COUNT.captures_iter(text) {
        let value = caps[1].to_string();
        if seen.insert(value.clone()) {
            out.push(Statistic {
                value,
                label: caps[2].to_lowercase(),
            });
        }
    }

    out.truncate(MAX_ITEMS);
    out
}

fn quotes(text: &str) -> Vec<Quote> {
    QUOTE
        .captures_iter(text)
        .take(MAX_ITEMS)
        .map(|caps| Quote {
            text: caps[1].trim().to_string(),
            attribution: caps.get(2).map(|m| m.as_str().trim().to_string()),
        })
        .collect()
}

/// Sentences and lines, split on terminal punctuation and line breaks.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .flat_map(|line| SENTENCE_END.split(line))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn sentence_count(text: &str) -> usize {
    sentences(text)
        .filter(|s| s.chars().any(char::is_alphabetic))
        .count()
}

fn decisions(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for sentence in sentences(text).filter(|s| DECISION.is_match(s)) {
        push_unique(&mut out, &mut seen, clean(sentence));
    }
    out
}

fn action_items(lines: &[&str]) -> Vec<ActionItem> {
    let mut out = Vec::new();

    for line in lines {
        let task = ACTION_CHECKBOX
            .captures(line)
            .or_else(|| ACTION_PREFIX.captures(line))
            .map(|caps| caps[1].to_string())
            .or_else(|| ACTION_OWNER.is_match(line).then(|| line.to_string()));
        let Some(task) = task else {
            continue;
        };

        let owner = ACTION_OWNER.captures(line).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        });
        out.push(ActionItem {
            task: clean(&task),
            owner,
        });
        if out.len() == MAX_ITEMS {
            break;
        }
    }
    out
}

fn topics(text: &str, lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    for line in lines {
        if let Some(caps) = HEADING.captures(line).or_else(|| LABEL_LINE.captures(line)) {
            push_unique(&mut out, &mut seen, clean(&caps[1]));
        }
    }

    // Capitalised terms that recur away from the start of a sentence.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for sentence in sentences(text) {
        for found in CAPITALISED.find_iter(sentence).filter(|m| m.start() > 0) {
            let term = found.as_str();
            let count = counts.entry(term).or_default();
            if *count == 0 {
                order.push(term);
            }
            *count += 1;
        }
    }
    for term in order {
        if counts.get(term).copied().unwrap_or_default() >= 2 {
            push_unique(&mut out, &mut seen, term.to_string());
        }
    }

    out.truncate(MAX_TOPICS);
    out
}

fn sequential_steps(lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for line in lines {
        let step = NUMBERED
            .captures(line)
            .map(|caps| caps[2].to_string())
            .or_else(|| SEQUENCE_WORD.captures(line).map(|caps| caps[1].to_string()));
        if let Some(step) = step {
            push_unique(&mut out, &mut seen, clean(&step));
        }
    }
    out
}

fn comparisons(text: &str) -> Vec<Comparison> {
    COMPARISON
        .captures_iter(text)
        .take(MAX_ITEMS)
        .map(|caps| Comparison {
            left: clean(&caps[1]),
            right: clean(&caps[2]),
        })
        .filter(|c| !c.left.is_empty() && !c.right.is_empty())
        .collect()
}

fn features(lines: &[&str]) -> Vec<Feature> {
    lines
        .iter()
        .filter(|line| !ACTION_PREFIX.is_match(line) && !ACTION_OWNER.is_match(line))
        .filter_map(|line| FEATURE.captures(line))
        .take(MAX_ITEMS)
        .map(|caps| Feature {
            title: clean(&caps[1]),
            description: caps[2].trim().to_string(),
        })
        .collect()
}

fn has_roadmap(text: &str) -> bool {
    if ROADMAP_WORD.is_match(text) {
        return true;
    }
    let periods: HashSet<String> = PERIOD
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();
    periods.len() >= 2
}
