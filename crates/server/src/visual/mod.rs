//! Positive-messaging visuals: decide whether a chat turn gets an image,
//! pick the card template and copy, and build the generation prompt.

use rand::Rng;
use shared::{ChatMessage, Role, VisualTemplate};

use crate::coaches;

pub mod brand;
pub mod context;
pub mod copy;
pub mod intent;
pub mod prompt;

use context::PositiveContext;
use copy::CardCopy;
use intent::Intent;
use prompt::ImagePrompt;

#[derive(Debug, Clone)]
pub struct VisualPlan {
    pub template: VisualTemplate,
    pub intent: Intent,
    pub copy: CardCopy,
    pub image: ImagePrompt,
}

/// Plan an image for the reply to `messages`, or `None` when nothing in the
/// exchange asks for one.
pub fn plan<R: Rng + ?Sized>(
    coach_slug: Option<&str>,
    messages: &[ChatMessage],
    reply: &str,
    rng: &mut R,
) -> Option<VisualPlan> {
    let last_user = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("");

    let intent = Intent::detect(last_user, reply);
    tracing::debug!(
        user_wants_image = intent.user_wants_image,
        coach_offers_visual = intent.coach_offers_visual,
        wants_positive = intent.wants_positive,
        "Visual intent"
    );
    if !intent.wants_image() {
        return None;
    }

    let template = context::choose_template(&PositiveContext::from_messages(messages));
    if let Some(slug) = coach_slug {
        if coaches::preferred_templates(slug).contains(&template) {
            tracing::debug!("Template {} matches {} preferences", template, slug);
        }
    }

    // Copy is tuned to the latest exchange rather than the whole thread
    let exchange = PositiveContext::extract([last_user, reply]);
    let selection = copy::select(template, &exchange, rng);
    let image = prompt::build(template, &selection.copy);
    tracing::info!("Planned {} visual ({})", template, image.size);

    Some(VisualPlan {
        template,
        intent,
        copy: selection.copy,
        image,
    })
}
