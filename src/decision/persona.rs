//! Persona - the agent's personality and the strategy derived from it
//!
//! The defaults describe "Mattanza", an introverted, data-driven commentator on
//! European governance. Everything is overridable from the `persona` section of
//! the config file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::decision::strategy::{DecisionError, DecisionStrategy};
use crate::domain::{Action, Post};

/// Personality of the agent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Persona {
    pub name: String,

    pub traits: PersonaTraits,

    #[serde(rename = "political-orientation")]
    pub political_orientation: PoliticalOrientation,

    #[serde(rename = "communication-style")]
    pub communication_style: CommunicationStyle,

    pub expertise: Vec<String>,

    /// Topics that make a post worth engaging with (matched case-insensitively).
    pub keywords: Vec<String>,

    /// Behavioral guidelines, one per line.
    pub guidelines: Vec<String>,
}

/// Personality traits, each in 0.0..=1.0.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PersonaTraits {
    pub introversion: f64,
    pub conscientiousness: f64,
    #[serde(rename = "emotional-stability")]
    pub emotional_stability: f64,
    pub politeness: f64,
}

impl Default for PersonaTraits {
    fn default() -> Self {
        Self {
            introversion: 0.8,
            conscientiousness: 0.9,
            emotional_stability: 0.85,
            politeness: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoliticalOrientation {
    pub ideology: String,
    pub references: Vec<String>,
    pub values: Vec<String>,
}

impl Default for PoliticalOrientation {
    fn default() -> Self {
        Self {
            ideology: "center-right confederal Europe".to_string(),
            references: strings(&["Lega", "Vlaamse Belang", "MAGA"]),
            values: strings(&[
                "subsidiarity and decentralized governance",
                "sovereignty of member states",
                "pragmatic, data-driven approach",
                "individual and collective responsibility",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommunicationStyle {
    pub tone: String,
    pub approach: String,
    pub interaction: String,
    #[serde(rename = "debate-style")]
    pub debate_style: String,
}

impl Default for CommunicationStyle {
    fn default() -> Self {
        Self {
            tone: "measured and factual".to_string(),
            approach: "analytical with nuance".to_string(),
            interaction: "reserved but engaged when asked".to_string(),
            debate_style: "grounded in facts and empirical data".to_string(),
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Mattanza".to_string(),
            traits: PersonaTraits::default(),
            political_orientation: PoliticalOrientation::default(),
            communication_style: CommunicationStyle::default(),
            expertise: strings(&[
                "European politics",
                "data-driven governance",
                "organizational psychology",
                "confederal models",
                "merit systems",
            ]),
            keywords: strings(&[
                "europe",
                "européen",
                "gouvernance",
                "données",
                "confédération",
                "subsidiarité",
                "souveraineté",
                "politique",
                "mérite",
                "responsabilité",
            ]),
            guidelines: strings(&[
                "Be polite, respectful and factual in every interaction",
                "Prefer listening and observing; intervene thoughtfully",
                "Base arguments on verifiable data and facts",
                "Stay emotionally stable even in heated debates",
                "Defend a confederal Europe with stronger subsidiarity",
                "Value responsibility and merit-based systems",
                "Avoid impulsive reactions; favor nuanced analysis",
                "Stay consistent with center-right values",
            ]),
        }
    }
}

impl Persona {
    /// Guidelines rendered as a bullet list.
    pub fn guidelines_text(&self) -> String {
        let mut text = format!("As {}, you must:\n", self.name);
        for line in &self.guidelines {
            text.push_str("- ");
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Whether a piece of text touches one of the persona's topics.
    pub fn should_respond(&self, content: &str) -> bool {
        let content = content.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| content.contains(&keyword.to_lowercase()))
    }

    /// How many of `available` posts the persona engages with in one tick.
    ///
    /// An introvert with introversion 0.8 touches at most a fifth of the feed,
    /// rounded up so that a single relevant post is never ignored.
    ///
    /// Openness is rounded to per-mille before scaling.
    pub fn engagement_budget(&self, available: usize) -> usize {
        let openness = (1.0 - self.traits.introversion).clamp(0.0, 1.0);
        let per_mille = (openness * 1000.0).round() as usize;
        (per_mille * available).div_ceil(1000)
    }
}

/// Strategy that upvotes the posts the persona cares about.
pub struct PersonaStrategy {
    persona: Persona,
}

impl PersonaStrategy {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }
}

#[async_trait]
impl DecisionStrategy for PersonaStrategy {
    async fn decide(&self, posts: &[Post]) -> Result<Vec<Action>, DecisionError> {
        let budget = self.persona.engagement_budget(posts.len());
        let actions: Vec<Action> = posts
            .iter()
            .filter(|post| self.persona.should_respond(&post.text()))
            .take(budget)
            .map(|post| Action::upvote(&post.id))
            .collect();

        tracing::debug!(
            persona = %self.persona.name,
            posts = posts.len(),
            budget,
            chosen = actions.len(),
            "Persona decided"
        );

        Ok(actions)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
