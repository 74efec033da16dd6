//! Registry of the coach personas and their system prompts.

use shared::{CoachInfo, VisualTemplate};
use std::sync::OnceLock;

use crate::db::{self, CoachRecord, Database};

mod prompts;
mod roster;

#[derive(Debug, Clone)]
pub struct Coach {
    pub slug: &'static str,
    pub emoji: &'static str,
    pub name: &'static str,
    pub tagline: &'static str,
    pub system_prompt: String,
    pub visual_hints: &'static [VisualTemplate],
}

impl Coach {
    pub fn info(&self, with_prompt: bool) -> CoachInfo {
        CoachInfo {
            slug: self.slug.to_string(),
            emoji: self.emoji.to_string(),
            name: self.name.to_string(),
            tagline: self.tagline.to_string(),
            system_prompt: with_prompt.then(|| self.system_prompt.clone()),
        }
    }

    pub fn record(&self, created_at: &str) -> CoachRecord {
        CoachRecord {
            id: self.slug.to_string(),
            name: self.name.to_string(),
            emoji: self.emoji.to_string(),
            tagline: self.tagline.to_string(),
            system_prompt: self.system_prompt.clone(),
            created_at: Some(created_at.to_string()),
        }
    }
}

pub fn all() -> &'static [Coach] {
    static COACHES: OnceLock<Vec<Coach>> = OnceLock::new();
    COACHES.get_or_init(|| {
        roster::ROSTER
            .iter()
            .map(|persona| Coach {
                slug: persona.slug,
                emoji: persona.emoji,
                name: persona.name,
                tagline: persona.tagline,
                system_prompt: prompts::system_prompt(persona),
                visual_hints: persona.visual_hints,
            })
            .collect()
    })
}

pub fn by_slug(slug: &str) -> Option<&'static Coach> {
    all().iter().find(|coach| coach.slug == slug)
}

/// Templates a coach tends to favour; empty for unknown slugs.
pub fn preferred_templates(slug: &str) -> &'static [VisualTemplate] {
    by_slug(slug).map(|coach| coach.visual_hints).unwrap_or(&[])
}

/// Upsert every registry coach into the `coaches` table.
pub async fn seed(database: &Database) -> anyhow::Result<()> {
    let created_at = db::now();
    let records: Vec<CoachRecord> = all().iter().map(|c| c.record(&created_at)).collect();
    database.upsert_coaches(&records).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_roster_size_and_unique_slugs() {
        let coaches = all();
        assert_eq!(coaches.len(), 19);
        let slugs: HashSet<_> = coaches.iter().map(|c| c.slug).collect();
        assert_eq!(slugs.len(), coaches.len());
    }

    #[test]
    fn test_lookup_by_slug() {
        let fuel = by_slug("coach-fuel").unwrap();
        assert_eq!(fuel.name, "Coach Fuel™");
        assert_eq!(fuel.emoji, "🥗");
        assert!(by_slug("coach-nobody").is_none());
    }

    #[test]
    fn test_system_prompt_layout() {
        let calm = by_slug("coach-calm").unwrap();
        let prompt = &calm.system_prompt;
        assert!(prompt.starts_with("Safety & scope:\n"));

        let order = [
            "Scientific anchors",
            "Visual content generation:",
            "Personalization & continuity:",
            "Cultural & generational relatability:",
            "Specialty boundaries:",
            "Coach Calm (mindfulness, breathwork, micro-recovery, stress regulation)\nGentle, grounding guide",
            "\n\nCalm plays:\n- Box breathing",
        ];
        let mut cursor = 0;
        for needle in order {
            let at = prompt[cursor..]
                .find(needle)
                .unwrap_or_else(|| panic!("missing or out of order: {}", needle));
            cursor += at + needle.len();
        }
        assert!(prompt.ends_with("**Between-Sets Reset**."));
    }

    #[test]
    fn test_prompt_uses_name_without_trademark() {
        let mimi = by_slug("coach-mimi").unwrap();
        assert!(mimi.system_prompt.contains("\n\nCoach Mimi (grit, perseverance"));
        assert!(!mimi.system_prompt.contains("Coach Mimi™ ("));
    }

    #[test]
    fn test_preferred_templates() {
        assert_eq!(
            preferred_templates("coach-skills"),
            &[VisualTemplate::ProcessCue, VisualTemplate::ConfidenceBoost]
        );
        assert!(preferred_templates("coach-baker").is_empty());
        assert!(preferred_templates("unknown").is_empty());
    }

    #[test]
    fn test_info_hides_prompt_unless_asked() {
        let coach = by_slug("coach-a-plus").unwrap();
        assert!(coach.info(false).system_prompt.is_none());
        assert_eq!(coach.info(true).system_prompt.as_deref(), Some(coach.system_prompt.as_str()));
    }
}
