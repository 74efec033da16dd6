//! Emotion, situation and psychological-need signals read from a
//! conversation, and the template choice that follows from them.

use regex::Regex;
use shared::{ChatMessage, VisualTemplate};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emotion {
    Struggling,
    Confident,
    Unmotivated,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Situation {
    PostGame,
    Practice,
    Studying,
    #[default]
    General,
}

/// Self-determination needs surfaced by the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Needs {
    pub autonomy: bool,
    pub competence: bool,
    pub relatedness: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositiveContext {
    pub emotion: Emotion,
    pub situation: Situation,
    pub needs: Needs,
}

struct Patterns {
    struggling: Regex,
    confident: Regex,
    unmotivated: Regex,
    post_game: Regex,
    practice: Regex,
    studying: Regex,
    autonomy: Regex,
    competence: Regex,
    relatedness: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid context regex");
        Patterns {
            struggling: re("struggling|difficult|hard|frustrated|stuck|failing|can't|unable"),
            confident: re("good|great|awesome|nailed|crushed|killed it|confident|strong"),
            unmotivated: re("tired|exhausted|unmotivated|don't want|can't do|giving up"),
            post_game: re("game|match|competition|played|lost|won|scored|performance"),
            practice: re("practice|training|drill|workout|session|exercise"),
            studying: re("study|exam|test|homework|class|assignment|grade"),
            autonomy: re("choice|control|decide|pick|choose|freedom|independence|own"),
            competence: re("improve|better|skill|progress|growth|learn|master|achieve"),
            relatedness: re("team|together|support|help|alone|friends|community|belong"),
        }
    })
}

impl PositiveContext {
    /// Signals over the lower-cased contents of `messages`, newline-joined.
    pub fn extract<'a, I>(messages: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let joined = messages
            .into_iter()
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase();
        let p = patterns();

        let emotion = if p.struggling.is_match(&joined) {
            Emotion::Struggling
        } else if p.confident.is_match(&joined) {
            Emotion::Confident
        } else if p.unmotivated.is_match(&joined) {
            Emotion::Unmotivated
        } else {
            Emotion::Neutral
        };

        let situation = if p.post_game.is_match(&joined) {
            Situation::PostGame
        } else if p.practice.is_match(&joined) {
            Situation::Practice
        } else if p.studying.is_match(&joined) {
            Situation::Studying
        } else {
            Situation::General
        };

        Self {
            emotion,
            situation,
            needs: Needs {
                autonomy: p.autonomy.is_match(&joined),
                competence: p.competence.is_match(&joined),
                relatedness: p.relatedness.is_match(&joined),
            },
        }
    }

    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        Self::extract(messages.iter().map(|m| m.content.as_str()))
    }
}

pub fn choose_template(ctx: &PositiveContext) -> VisualTemplate {
    match ctx.situation {
        Situation::PostGame if ctx.emotion == Emotion::Struggling => VisualTemplate::ConfidenceBoost,
        Situation::PostGame => VisualTemplate::AffirmationCard,
        Situation::Practice => VisualTemplate::ProcessCue,
        Situation::Studying => VisualTemplate::MindsetMicro,
        Situation::General if ctx.needs.autonomy => VisualTemplate::AutonomyChoice,
        Situation::General if ctx.needs.relatedness => VisualTemplate::BelongingTile,
        Situation::General if ctx.needs.competence => VisualTemplate::ConfidenceBoost,
        Situation::General => VisualTemplate::AffirmationCard,
    }
}
