//! Brand palette, type scale and per-template layout rules.

use shared::VisualTemplate;

pub const PRIMARY: &str = "#0FA958"; // Kelly Green
pub const GRAPHITE: &str = "#1A1D1E";
pub const OFFWHITE: &str = "#F7F7F7";
pub const ACCENT: &str = "#B5FF3D"; // Electric Lime

pub const MIN_CONTRAST: f64 = 4.5;
pub const H1_MIN_PX: u32 = 24;
pub const BODY_MIN_PX: u32 = 16;

/// Every card carries at most this many words of copy.
pub const MAX_WORDS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Square,
    Portrait,
}

impl Aspect {
    /// Image size requested from the generator.
    pub fn size(&self) -> &'static str {
        match self {
            Aspect::Square => "1024x1024",
            Aspect::Portrait => "1024x1792",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateSpec {
    pub aspect: Aspect,
    pub max_words: usize,
    pub h1_words: usize,
    pub support_words: usize,
    pub layout: &'static str,
}

pub fn spec(template: VisualTemplate) -> TemplateSpec {
    use VisualTemplate::*;
    let (aspect, h1_words, support_words, layout) = match template {
        AffirmationCard => (
            Aspect::Square,
            4,
            8,
            "Square card: H1 top-left with Electric Lime accent bar underneath, support line below, optional badge top-right.",
        ),
        ConfidenceBoost => (
            Aspect::Square,
            3,
            6,
            "Square card: centered H1 with support below, subtle Kelly Green accent elements.",
        ),
        ProcessCue => (
            Aspect::Square,
            3,
            6,
            "Square card: H1 with process-focused layout, support text emphasizing technique progression.",
        ),
        BelongingTile => (
            Aspect::Portrait,
            3,
            6,
            "Portrait format: H1 center-aligned, support below, community-focused visual elements.",
        ),
        AutonomyChoice => (
            Aspect::Square,
            3,
            9,
            "Square card: H1 with three pill-shaped CTA chips below showing choices.",
        ),
        MindsetMicro => (
            Aspect::Portrait,
            4,
            4,
            "Portrait format: H1 center-aligned, concise support line, growth-focused accent.",
        ),
    };
    TemplateSpec {
        aspect,
        max_words: MAX_WORDS,
        h1_words,
        support_words,
        layout,
    }
}

pub const STYLE: &[&str] = &[
    "Athletic Balance Positive Messaging style:",
    "Kelly Green (#0FA958) and Dark Graphite (#1A1D1E) palette;",
    "high-contrast text on solid message plate (90-95% opacity);",
    "clean geometric sans-serif typography (Inter/Manrope style);",
    "flat or subtle grain backgrounds; no busy photos;",
    "6-8% safe margins; plenty of negative space;",
    "accessibility-first: 4.5:1 contrast minimum;",
    "mobile-optimized: 24px+ headlines, 16px+ body text;",
    "evidence-based motivation; youth-appropriate; inclusive.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_templates() {
        let portrait: Vec<_> = VisualTemplate::ALL
            .into_iter()
            .filter(|t| spec(*t).aspect == Aspect::Portrait)
            .collect();
        assert_eq!(
            portrait,
            vec![VisualTemplate::BelongingTile, VisualTemplate::MindsetMicro]
        );
        assert_eq!(spec(VisualTemplate::MindsetMicro).aspect.size(), "1024x1792");
        assert_eq!(spec(VisualTemplate::ProcessCue).aspect.size(), "1024x1024");
    }

    #[test]
    fn test_word_limits_fit_card_budget() {
        for template in VisualTemplate::ALL {
            let s = spec(template);
            assert_eq!(s.max_words, 12);
            assert!(s.h1_words + s.support_words <= s.max_words, "{}", template);
        }
    }
}
