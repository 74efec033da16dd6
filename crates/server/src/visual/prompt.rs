//! Image-generation prompt and alt text for a positive-messaging card.

use shared::VisualTemplate;

use super::brand;
use super::copy::{self, CardCopy};
use crate::accessibility::{self, CardSpec, Overall};

const DIRECTIVES: &[&str] = &[
    "Layout requirements: one focal H1 phrase, one support line, optional CTA chip;",
    "maximum 12 words total; 6-8% safe margins; plenty of negative space;",
    "Text overlay: solid message plate (Dark Graphite #1A1D1E, 90-95% opacity) behind all text;",
    "Typography: clean geometric sans-serif; H1 24-40px bold; support 16-20px medium;",
    "Accent elements: Electric Lime (#B5FF3D) accent bar under H1 when specified;",
    "Background: flat Kelly Green (#0FA958) or subtle grain; no busy photos; no logos;",
    "Accessibility: ensure 4.5:1 contrast ratio minimum; mobile-optimized sizing; clear text hierarchy;",
    "Text readability: high contrast, clear fonts, adequate spacing, no decorative elements that interfere with text;",
    "Screen reader friendly: clear visual hierarchy, meaningful color use beyond decoration;",
    "Style: evidence-based motivation; youth-appropriate; inclusive; brand-consistent.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePrompt {
    pub prompt: String,
    pub alt: String,
    pub size: &'static str,
}

pub fn build(template: VisualTemplate, card: &CardCopy) -> ImagePrompt {
    let spec = brand::spec(template);

    let report = accessibility::report(&CardSpec {
        template,
        h1: &card.h1,
        support: &card.support,
        text_color: brand::OFFWHITE,
        background_color: brand::GRAPHITE,
        font_px: brand::H1_MIN_PX,
        bold: true,
    });
    if report.overall != Overall::Pass {
        tracing::warn!(
            template = %template,
            "Generated visual may have accessibility issues: {:?}",
            report.recommendations
        );
    }
    for issue in copy::validate_copy(&card.h1, &card.support) {
        tracing::warn!(template = %template, "Card copy: {}", issue);
    }

    let mut parts = vec![
        format!("[{}]", template),
        brand::STYLE.join(" "),
        spec.layout.to_string(),
        format!(
            "Message content: H1 \"{}\" with support text \"{}\".",
            card.h1, card.support
        ),
    ];
    parts.extend(DIRECTIVES.iter().map(|d| d.to_string()));

    let accent_bar = matches!(
        template,
        VisualTemplate::AffirmationCard | VisualTemplate::ConfidenceBoost
    );

    ImagePrompt {
        prompt: parts.join(" "),
        alt: accessibility::alt_text(template, &card.h1, &card.support, accent_bar),
        size: spec.aspect.size(),
    }
}
