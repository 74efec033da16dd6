//! Keyword heuristics deciding whether a chat turn should get an image.

/// Phrases in the athlete's message that ask for something visual.
const VISUAL_KEYWORDS: &[&str] = &[
    "play",
    "set",
    "formation",
    "scheme",
    "diagram",
    "draw",
    "sketch",
    "visualize",
    "chart",
    "graph",
    "menu",
    "plate",
    "drill",
    "steps",
    "how to",
    "layout",
    "template",
    "poster",
    "infographic",
    "illustration",
    "picture of",
    "image of",
    "show me",
    "can you show",
    "what does it look like",
    "generate an image",
    "make a graphic",
    "mockup",
    "design",
    // positive messaging
    "motivate",
    "inspire",
    "encourage",
    "boost",
    "confidence",
    "affirmation",
    "positive",
    "mindset",
    "card",
    "message",
];

/// Phrases a coach uses when promising a visual.
const OFFER_PHRASES: &[&str] = &[
    "i'll create a diagram",
    "i'll draw",
    "i'll make a diagram",
    "i'll generate",
    "let me create a visual",
    "let me draw",
    "let me make a diagram",
    "let me generate that visual",
    "here's a diagram",
    "here's a visual",
    "creating a diagram",
    "generating a visual",
    "i'll create a motivational",
    "let me make an affirmation",
    "here's an encouraging",
    "i'll design a confidence",
];

const POSITIVE_WORDS: &[&str] = &[
    "motivate",
    "inspire",
    "encourage",
    "boost",
    "confidence",
    "affirmation",
    "positive",
    "mindset",
    "growth",
    "believe",
    "support",
    "strength",
    "power",
    "capable",
    "worthy",
    "progress",
    "improve",
    "better",
    "stronger",
    "resilient",
];

const VISUAL_WORDS: &[&str] = &[
    "card", "post", "image", "visual", "graphic", "design", "create", "make", "generate", "show",
    "picture",
];

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

pub fn user_wants_image(user_text: &str) -> bool {
    contains_any(&user_text.to_lowercase(), VISUAL_KEYWORDS)
}

pub fn coach_offers_visual(reply: &str) -> bool {
    let t = reply.to_lowercase();
    let makes = contains_any(&t, &["create", "generate", "make"]);

    contains_any(&t, OFFER_PHRASES)
        || (t.contains("visual") && makes)
        || (t.contains("diagram") && makes)
        || (t.contains("card") && contains_any(&t, &["motivational", "positive", "affirmation"]))
}

/// Positive-intent word together with a visual-intent word.
pub fn wants_positive(text: &str) -> bool {
    let t = text.to_lowercase();
    contains_any(&t, POSITIVE_WORDS) && contains_any(&t, VISUAL_WORDS)
}

/// Flags computed for one chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    pub user_wants_image: bool,
    pub coach_offers_visual: bool,
    pub wants_positive: bool,
}

impl Intent {
    pub fn detect(last_user: &str, reply: &str) -> Self {
        Self {
            user_wants_image: user_wants_image(last_user),
            coach_offers_visual: coach_offers_visual(reply),
            wants_positive: wants_positive(last_user),
        }
    }

    pub fn wants_image(&self) -> bool {
        self.user_wants_image || self.coach_offers_visual || self.wants_positive
    }
}
