//! Copy banks and per-template headline/support formatting.

use rand::Rng;
use serde::Serialize;
use shared::VisualTemplate;

use super::brand;
use super::context::{Emotion, PositiveContext, Situation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Autonomy,
    Competence,
    Relatedness,
    SelfAffirmation,
    Mindset,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Autonomy,
        Category::Competence,
        Category::Relatedness,
        Category::SelfAffirmation,
        Category::Mindset,
    ];

    pub fn bank(&self) -> &'static [&'static str] {
        match self {
            Category::Autonomy => &[
                "Pick your next 1%.",
                "Choose effort you control.",
                "Your choices, your power.",
                "Own your process.",
                "Control what matters.",
            ],
            Category::Competence => &[
                "Skills grow under reps.",
                "Evidence beats doubt.",
                "Progress over perfection.",
                "You're getting stronger.",
                "Small wins add up.",
            ],
            Category::Relatedness => &[
                "Your team, your scaffold.",
                "We train together.",
                "Ask. Learn. Level up.",
                "Community over competition.",
                "We got us.",
            ],
            Category::SelfAffirmation => &[
                "You are bigger than one result.",
                "Values travel with you.",
                "Character shows in challenges.",
                "Your worth isn't your score.",
                "Identity beyond outcomes.",
            ],
            Category::Mindset => &[
                "Mistakes = data.",
                "Effort + strategy + help.",
                "Not yet ≠ no.",
                "Try new strategy.",
                "Growth through struggle.",
            ],
        }
    }

    /// Dominant need first; a low mood without a named need gets mindset copy.
    pub fn for_context(ctx: &PositiveContext) -> Self {
        if ctx.needs.autonomy {
            Category::Autonomy
        } else if ctx.needs.competence {
            Category::Competence
        } else if ctx.needs.relatedness {
            Category::Relatedness
        } else if matches!(ctx.emotion, Emotion::Struggling | Emotion::Unmotivated) {
            Category::Mindset
        } else {
            Category::SelfAffirmation
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCopy {
    pub h1: String,
    pub support: String,
}

impl CardCopy {
    fn new(h1: impl Into<String>, support: impl Into<String>) -> Self {
        Self {
            h1: h1.into(),
            support: support.into(),
        }
    }

    pub fn word_count(&self) -> usize {
        words(&self.h1).len() + words(&self.support).len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub copy: CardCopy,
    pub category: Category,
    pub template: VisualTemplate,
}

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Pick a bank line for the context and shape it for the template.
pub fn select<R: Rng + ?Sized>(
    template: VisualTemplate,
    ctx: &PositiveContext,
    rng: &mut R,
) -> Selection {
    let category = Category::for_context(ctx);
    let bank = category.bank();
    let line = bank[rng.gen_range(0..bank.len())];
    Selection {
        copy: fit_budget(template, format(template, line, ctx.situation)),
        category,
        template,
    }
}

pub fn format(template: VisualTemplate, line: &str, situation: Situation) -> CardCopy {
    match template {
        VisualTemplate::AffirmationCard => {
            let w = words(line);
            if w.len() <= 4 {
                CardCopy::new(line, "You've got this.")
            } else {
                let rest = w[3..].join(" ");
                CardCopy::new(w[..3].join(" "), format!("{}.", rest.trim_end_matches('.')))
            }
        }
        VisualTemplate::ConfidenceBoost => {
            if situation == Situation::PostGame {
                CardCopy::new("Found a Way", "We adjust, we improve.")
            } else {
                CardCopy::new(truncate_words(line, 2), "Evidence beats doubt.")
            }
        }
        VisualTemplate::ProcessCue => {
            if situation == Situation::Practice {
                CardCopy::new("Form, Then Force", "Footwork first, speed later.")
            } else {
                CardCopy::new("Progress Over Perfect", line)
            }
        }
        VisualTemplate::BelongingTile => CardCopy::new("We Got Us", line),
        VisualTemplate::AutonomyChoice => CardCopy::new("Choose Your Win", "Film / Form / Fuel"),
        VisualTemplate::MindsetMicro => match line.split_once('=') {
            Some((head, tail)) => CardCopy::new(format!("{} =", head.trim()), tail.trim()),
            None => CardCopy::new("Not Yet ≠ No", line),
        },
    }
}

fn truncate_words(text: &str, max: usize) -> String {
    words(text).into_iter().take(max).collect::<Vec<_>>().join(" ")
}

/// Clamp headline and support to the template's word limits.
pub fn fit_budget(template: VisualTemplate, copy: CardCopy) -> CardCopy {
    let spec = brand::spec(template);
    let h1 = truncate_words(&copy.h1, spec.h1_words);
    let room = spec.max_words.saturating_sub(words(&h1).len());
    let support = truncate_words(&copy.support, spec.support_words.min(room));
    CardCopy { h1, support }
}

/// Problems with a headline/support pair against the card word limits.
pub fn validate_copy(h1: &str, support: &str) -> Vec<String> {
    let mut issues = Vec::new();
    let total = words(h1).len() + words(support).len();
    if total > brand::MAX_WORDS {
        issues.push(format!(
            "Total word count ({}) exceeds {}-word limit",
            total,
            brand::MAX_WORDS
        ));
    }
    if words(h1).len() > 4 {
        issues.push("H1 should be 4 words or fewer".to_string());
    }
    if words(support).len() > 8 {
        issues.push("Support text should be 8 words or fewer".to_string());
    }
    issues
}

/// Bank lines containing any keyword (case-insensitive), grouped by category.
pub fn suggest(keywords: &[&str]) -> Vec<(Category, Vec<&'static str>)> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let matches: Vec<&'static str> = category
                .bank()
                .iter()
                .copied()
                .filter(|line| {
                    let line = line.to_lowercase();
                    keywords.iter().any(|k| line.contains(k.as_str()))
                })
                .collect();
            (!matches.is_empty()).then_some((category, matches))
        })
        .collect()
}
