//! WCAG contrast, type-size and readability checks for generated cards.

use regex::Regex;
use serde::Serialize;
use shared::VisualTemplate;
use std::sync::OnceLock;

use crate::visual::brand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContrastLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "FAIL")]
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contrast {
    /// Rounded to two decimals
    pub ratio: f64,
    pub passes: bool,
    pub level: ContrastLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb(u8, u8, u8);

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^#?([a-f\d]{2})([a-f\d]{2})([a-f\d]{2})$").expect("valid hex regex")
    })
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let caps = hex_pattern().captures(hex)?;
    let channel = |i: usize| u8::from_str_radix(&caps[i], 16).ok();
    Some(Rgb(channel(1)?, channel(2)?, channel(3)?))
}

fn luminance(Rgb(r, g, b): Rgb) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Contrast ratio between two `#RRGGBB` colours. Invalid input fails.
pub fn contrast(a: &str, b: &str) -> Contrast {
    let (Some(a), Some(b)) = (parse_hex(a), parse_hex(b)) else {
        return Contrast {
            ratio: 0.0,
            passes: false,
            level: ContrastLevel::Fail,
        };
    };

    let (la, lb) = (luminance(a), luminance(b));
    let ratio = (la.max(lb) + 0.05) / (la.min(lb) + 0.05);
    let level = if ratio >= 7.0 {
        ContrastLevel::Aaa
    } else if ratio >= 4.5 {
        ContrastLevel::Aa
    } else {
        ContrastLevel::Fail
    };

    Contrast {
        ratio: (ratio * 100.0).round() / 100.0,
        passes: ratio >= brand::MIN_CONTRAST,
        level,
    }
}

/// Contrast of each foreground/background pairing the brand uses.
pub fn brand_contrast() -> Vec<(&'static str, Contrast)> {
    vec![
        ("text_on_graphite", contrast(brand::OFFWHITE, brand::GRAPHITE)),
        ("text_on_primary", contrast(brand::OFFWHITE, brand::PRIMARY)),
        ("graphite_on_offwhite", contrast(brand::GRAPHITE, brand::OFFWHITE)),
        ("primary_on_offwhite", contrast(brand::PRIMARY, brand::OFFWHITE)),
        ("accent_on_graphite", contrast(brand::ACCENT, brand::GRAPHITE)),
        ("graphite_on_accent", contrast(brand::GRAPHITE, brand::ACCENT)),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontCheck {
    pub valid: bool,
    pub recommendation: String,
}

pub fn check_font_size(px: u32, bold: bool) -> FontCheck {
    let min = if bold { brand::H1_MIN_PX } else { brand::BODY_MIN_PX };
    if px >= min {
        FontCheck {
            valid: true,
            recommendation: format!("Font size {}px meets accessibility standards.", px),
        }
    } else {
        FontCheck {
            valid: false,
            recommendation: format!(
                "Font size {}px is too small. Minimum recommended: {}px.",
                px, min
            ),
        }
    }
}

fn describe(template: VisualTemplate) -> &'static str {
    match template {
        VisualTemplate::AffirmationCard => "Affirmation card",
        VisualTemplate::ConfidenceBoost => "Confidence boost card",
        VisualTemplate::ProcessCue => "Process reminder card",
        VisualTemplate::BelongingTile => "Community support tile",
        VisualTemplate::AutonomyChoice => "Choice empowerment card",
        VisualTemplate::MindsetMicro => "Mindset growth card",
    }
}

pub fn alt_text(template: VisualTemplate, h1: &str, support: &str, accent_bar: bool) -> String {
    let mut parts = vec![describe(template).to_string(), format!("reading '{}'", h1)];
    if !support.is_empty() && support != h1 {
        parts.push(format!("with supporting text '{}'", support));
    }
    if accent_bar {
        parts.push("featuring Electric Lime accent bar".to_string());
    }
    parts.push("high-contrast text on dark message plate".to_string());
    format!("{}.", parts.join("; "))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readability {
    pub word_count: usize,
    pub valid: bool,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn check_readability(text: &str) -> Readability {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    if word_count > brand::MAX_WORDS {
        issues.push(format!(
            "Text exceeds {}-word limit ({} words)",
            brand::MAX_WORDS,
            word_count
        ));
        suggestions.push("Shorten message for mobile readability".to_string());
    }

    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let avg_words = if sentences == 0 {
        word_count as f64
    } else {
        word_count as f64 / sentences as f64
    };
    if avg_words > 8.0 {
        issues.push("Sentences may be too complex".to_string());
        suggestions.push("Break into shorter, clearer statements".to_string());
    }

    let complex = words.iter().filter(|w| w.chars().count() > 8).count();
    if complex as f64 > word_count as f64 * 0.3 {
        issues.push("May contain too many complex words".to_string());
        suggestions.push("Use simpler, more accessible language".to_string());
    }

    Readability {
        word_count,
        valid: issues.is_empty(),
        issues,
        suggestions,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Overall {
    Pass,
    Warning,
    Fail,
}

/// Card under review: copy, colours and headline size.
#[derive(Debug, Clone)]
pub struct CardSpec<'a> {
    pub template: VisualTemplate,
    pub h1: &'a str,
    pub support: &'a str,
    pub text_color: &'a str,
    pub background_color: &'a str,
    pub font_px: u32,
    pub bold: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub overall: Overall,
    pub contrast: Contrast,
    pub font_size: FontCheck,
    pub readability: Readability,
    pub alt_text: String,
    pub recommendations: Vec<String>,
}

pub fn report(card: &CardSpec<'_>) -> Report {
    let contrast = contrast(card.text_color, card.background_color);
    let font_size = check_font_size(card.font_px, card.bold);
    let readability = check_readability(&format!("{} {}", card.h1, card.support));
    let alt_text = alt_text(card.template, card.h1, card.support, false);

    let mut recommendations = Vec::new();
    if !contrast.passes {
        recommendations.push("Increase color contrast for better readability".to_string());
    }
    if !font_size.valid {
        recommendations.push(font_size.recommendation.clone());
    }
    if !readability.valid {
        recommendations.extend(readability.suggestions.iter().cloned());
    }

    let overall = if !contrast.passes || !font_size.valid {
        Overall::Fail
    } else if !readability.valid || contrast.level == ContrastLevel::Aa {
        Overall::Warning
    } else {
        Overall::Pass
    };

    Report {
        overall,
        contrast,
        font_size,
        readability,
        alt_text,
        recommendations,
    }
}
