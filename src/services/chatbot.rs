//! Chatbot widget: canned replies by keyword.
//!
//! DESIGN
//! ======
//! An ordered list of rules, each a keyword set plus a reply and follow-up
//! suggestions. Input is lowercased and checked for substring matches; the
//! first rule with any hit wins. No rule matching yields the generic fallback.
//! Every suggestion offered under a reply is itself answered by a rule.

use serde::Serialize;
use tracing::debug;

use crate::frame::now_ms;

/// One canned reply with the follow-up prompts offered under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Rule that produced this reply, `"fallback"` when none matched.
    pub topic: &'static str,
    pub text: &'static str,
    pub suggestions: &'static [&'static str],
}

struct Rule {
    keywords: &'static [&'static str],
    reply: Reply,
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["cost", "price", "pricing", "subscription", "sales"],
        reply: Reply {
            topic: "pricing",
            text: "Plans start at $49/month for individual distributors, with team and enterprise tiers \
                   that add genealogy analytics and AI campaign credits.",
            suggestions: &["Compare pricing plans", "Is there a free trial?", "Talk to sales"],
        },
    },
    Rule {
        keywords: &["genealogy", "tree", "downline", "upline", "team", "cursor", "annotat"],
        reply: Reply {
            topic: "genealogy",
            text: "The collaborative genealogy tree shows your whole organization live: ranks, volume, \
                   and who on your team is looking at which branch right now.",
            suggestions: &["How do live cursors work?", "Can I annotate members?", "Show me a demo"],
        },
    },
    Rule {
        keywords: &["commission", "compensation", "comp plan", "bonus", "payout", "earnings", "rank"],
        reply: Reply {
            topic: "compensation",
            text: "Commission and bonus tracking follows your compensation plan automatically, including \
                   rank advancement and group volume rollups.",
            suggestions: &["Which comp plans are supported?", "How are ranks calculated?", "Talk to sales"],
        },
    },
    Rule {
        keywords: &["content", "marketing", "social", "post", "campaign"],
        reply: Reply {
            topic: "ai_marketing",
            text: "The AI marketing panel drafts compliant social posts, emails and follow-ups tuned to your \
                   products and your team's voice.",
            suggestions: &["What channels can it post to?", "Is the content compliant?", "Show me a demo"],
        },
    },
    Rule {
        keywords: &["demo", "trial"],
        reply: Reply {
            topic: "demo",
            text: "You can start a 14-day free trial right away, or book a guided demo with our team.",
            suggestions: &["Start free trial", "Book a demo", "Compare pricing plans"],
        },
    },
    Rule {
        keywords: &["help", "support", "contact", "problem", "issue", "human"],
        reply: Reply {
            topic: "support",
            text: "Our support team is available 24/7 by chat and email. What can we help you with?",
            suggestions: &["Contact support", "Browse help articles", "Report a problem"],
        },
    },
    Rule {
        keywords: &["feature", "what can you do"],
        reply: Reply {
            topic: "features",
            text: "The dashboard combines a live collaborative genealogy tree, team chat, an activity feed \
                   and an AI marketing panel in one workspace.",
            suggestions: &[
                "Tell me about the genealogy tree",
                "How does the AI marketing panel work?",
                "What does it cost?",
            ],
        },
    },
    Rule {
        keywords: &["hello", "hey", "good morning", "good afternoon"],
        reply: Reply {
            topic: "greeting",
            text: "Hi there! I can answer questions about pricing, the genealogy tree, commissions and our \
                   AI marketing tools.",
            suggestions: &["What does it cost?", "Tell me about the genealogy tree", "Show me a demo"],
        },
    },
];

const FALLBACK: Reply = Reply {
    topic: "fallback",
    text: "Thanks for your message! I'm not sure I understood. Could you tell me a bit more about what you're \
           looking for?",
    suggestions: &["What does it cost?", "What features do you offer?", "Talk to a human"],
};

/// Pick the reply for `input`. First matching rule wins.
#[must_use]
pub fn respond(input: &str) -> Reply {
    let lowered = input.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map_or(FALLBACK, |rule| rule.reply)
}

/// The fixed fallback reply.
#[must_use]
pub fn fallback() -> Reply {
    FALLBACK
}

// =============================================================================
// WIDGET
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: i64,
    /// Follow-ups offered under a bot turn; empty for user turns.
    pub suggestions: Vec<String>,
}

/// Transcript of one chat widget conversation.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    turns: Vec<Turn>,
}

const GREETING: &str = "Hi! I'm the team assistant. Ask me about pricing, features or the genealogy tree.";

impl ChatWidget {
    /// A widget opened with the assistant's greeting.
    #[must_use]
    pub fn new() -> Self {
        let greeting = Turn {
            speaker: Speaker::Bot,
            text: GREETING.into(),
            timestamp: now_ms(),
            suggestions: FALLBACK.suggestions.iter().map(|s| (*s).to_string()).collect(),
        };
        Self { turns: vec![greeting] }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Record the user's input and the bot's answer. Blank input is ignored.
    pub fn send(&mut self, input: &str) -> Option<Reply> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let reply = respond(input);
        debug!(topic = reply.topic, "chatbot reply selected");

        let now = now_ms();
        self.turns.push(Turn { speaker: Speaker::User, text: input.into(), timestamp: now, suggestions: Vec::new() });
        self.turns.push(Turn {
            speaker: Speaker::Bot,
            text: reply.text.into(),
            timestamp: now,
            suggestions: reply.suggestions.iter().map(|s| (*s).to_string()).collect(),
        });
        Some(reply)
    }

    /// Follow-ups under the latest bot turn.
    #[must_use]
    pub fn current_suggestions(&self) -> &[String] {
        self.turns
            .iter()
            .rev()
            .find(|t| t.speaker == Speaker::Bot)
            .map(|t| t.suggestions.as_slice())
            .unwrap_or_default()
    }
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;
