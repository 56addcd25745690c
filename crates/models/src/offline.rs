//! Offline responders - deterministic stand-ins for the four models
//!
//! Used when no model service is configured, when it cannot be reached, and
//! by the `model-stub` server. Same request in, same output out:
//!
//! - **conversational**: keyword small talk
//! - **question answering**: the context sentence sharing the most words
//!   with the question
//! - **fill-mask**: a word list picked by the word before the mask
//! - **text generation**: story fragments drawn with the request's seed

use std::hash::Hasher;

use crate::core::SimpleRng;
use crate::error::ModelError;
use crate::responder::Responder;
use crate::types::{FillCandidate, ModelOutput, ModelRequest, MASK_TOKEN};

/// Stable 64-bit FNV-1a hasher.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, and
/// offline answers must be reproducible.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

fn fnv(text: &str) -> u64 {
    let mut h = Fnv1aHasher::new();
    h.write(text.as_bytes());
    h.finish()
}

const SMALL_TALK: &[(&[&str], &str)] = &[
    (
        &["hello", "hi", "hey", "greetings"],
        "Hi there! It's nice to meet another bear.",
    ),
    (
        &["bye", "goodbye", "later"],
        "Bye! Come back and chat any time.",
    ),
    (
        &["name", "who"],
        "I'm a polar bear. I live up here where it's nice and cold.",
    ),
    (
        &["key", "tree", "lock"],
        "I heard there's something shiny at the top of the tree.",
    ),
    (
        &["cold", "snow", "ice", "weather"],
        "I love the cold. Snow is the best thing in the world.",
    ),
    (
        &["fish", "food", "eat", "hungry"],
        "Fish is my favourite food. What do you like to eat?",
    ),
    (
        &["thanks", "thank"],
        "You're welcome! That's what friends are for.",
    ),
];

const SMALL_TALK_HOW: &str = "I'm doing great, thanks for asking. How about you?";

const SMALL_TALK_FALLBACK: &[&str] = &[
    "That's interesting. Tell me more!",
    "Really? I never thought of it that way.",
    "I see. Do you like living in the forest?",
    "Ha! You're a funny bear.",
    "Hmm, I'll have to think about that one.",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "do", "does", "did", "i", "you", "it",
    "to", "of", "in", "on", "at", "and", "or", "what", "where", "who", "how", "why", "which",
    "can", "this", "that", "me", "my", "there", "with",
];

const NOUNS: &[&str] = &["bear", "tree", "key", "friend", "game", "story", "forest"];
const ADJECTIVES: &[&str] = &["happy", "good", "cold", "big", "hungry", "tired", "lost"];
const VERBS: &[&str] = &["go", "play", "climb", "help", "eat", "sleep", "find"];
const OPENERS: &[&str] = &["The", "I", "It", "This", "We", "My"];
const FILLERS: &[&str] = &["the", "a", "very", "not", "really", "so", "also"];

const STORY_FRAGMENTS: &[&str] = &[
    "there was a little bear",
    "who lived at the edge of a quiet forest.",
    "One day,",
    "the bear found a golden key",
    "at the top of a tall tree.",
    "The moose laughed",
    "and the fox asked a riddle.",
    "Nobody knew what the old lock was guarding.",
    "The robot said,",
    "\"I know the answer!\"",
    "It was a cold morning",
    "and the snow kept falling.",
    "Then",
    "the polar bear came to visit",
    "with a basket of fish.",
    "They walked for hours",
    "until the sun went down.",
    "Suddenly,",
    "a strange noise came from behind the wall.",
    "Everyone agreed it was the best day ever.",
];

/// Deterministic responder for all four tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResponder;

impl OfflineResponder {
    pub fn new() -> Self {
        Self
    }

    fn conversational(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        if lower.contains("how are you") || lower.contains("how's it going") {
            return SMALL_TALK_HOW.to_string();
        }
        let said: Vec<&str> = words(&lower).collect();
        for (keys, reply) in SMALL_TALK {
            if said.iter().any(|w| keys.contains(w)) {
                return reply.to_string();
            }
        }
        let i = (fnv(&lower) % SMALL_TALK_FALLBACK.len() as u64) as usize;
        SMALL_TALK_FALLBACK[i].to_string()
    }

    fn question_answering(&self, question: &str, context: &str) -> ModelOutput {
        let q_lower = question.to_lowercase();
        let keywords: Vec<&str> = words(&q_lower)
            .filter(|w| !STOPWORDS.contains(w))
            .collect();

        let mut best: Option<(usize, usize, usize)> = None;
        for (start, end) in sentence_spans(context) {
            let sentence = context[start..end].to_lowercase();
            let hits = keywords
                .iter()
                .filter(|k| words(&sentence).any(|w| w == **k || stem(w) == stem(**k)))
                .count();
            if hits > 0 && best.map_or(true, |(h, _, _)| hits > h) {
                best = Some((hits, start, end));
            }
        }

        match best {
            Some((hits, start, end)) => ModelOutput::QuestionAnswering {
                answer: context[start..end].trim_end_matches('.').to_string(),
                score: hits as f32 / keywords.len().max(1) as f32,
                start,
                end,
            },
            None => ModelOutput::QuestionAnswering {
                answer: "I do not know".to_string(),
                score: 0.0,
                start: 0,
                end: 0,
            },
        }
    }

    fn fill_mask(&self, text: &str, top_k: u32) -> Result<ModelOutput, ModelError> {
        let Some(at) = text.find(MASK_TOKEN) else {
            return Err(ModelError::InvalidInput(format!(
                "input must contain {MASK_TOKEN}"
            )));
        };
        if text.matches(MASK_TOKEN).count() > 1 {
            return Err(ModelError::InvalidInput(format!(
                "input must contain {MASK_TOKEN} only once"
            )));
        }

        let before = text[..at].trim_end();
        let prev = before
            .rsplit(|c: char| c.is_whitespace())
            .next()
            .unwrap_or("")
            .to_lowercase();
        let sentence_start = before.is_empty() || before.ends_with(['.', '!', '?']);

        let pool: &[&str] = if sentence_start {
            OPENERS
        } else {
            match prev.as_str() {
                "a" | "an" | "the" | "my" | "your" | "his" | "her" | "our" | "their" => NOUNS,
                "is" | "are" | "was" | "were" | "feel" | "feels" | "am" | "very" | "so" => {
                    ADJECTIVES
                }
                "to" | "can" | "will" | "should" | "must" | "let's" | "could" => VERBS,
                _ => FILLERS,
            }
        };

        let mut ranked: Vec<&str> = pool.to_vec();
        let n = ranked.len() as u64;
        ranked.rotate_left((fnv(text) % n) as usize);
        let k = (top_k as usize).clamp(1, ranked.len());

        // Scores halve from one candidate to the next.
        let total: f32 = (0..k).map(|i| 0.5f32.powi(i as i32)).sum();
        let candidates = ranked
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, w)| FillCandidate {
                sequence: text.replacen(MASK_TOKEN, w, 1),
                token_str: w.to_string(),
                score: 0.5f32.powi(i as i32) / total,
            })
            .collect();
        Ok(ModelOutput::FillMask { candidates })
    }

    fn text_generation(&self, prompt: &str, max_new_tokens: u32, seed: u32) -> String {
        let mut rng = SimpleRng::new(seed ^ (fnv(prompt) as u32));
        let mut out = prompt.trim_end().to_string();
        let mut remaining = max_new_tokens as usize;

        while remaining > 0 {
            let Some(fragment) = rng.choose(STORY_FRAGMENTS) else {
                break;
            };
            for word in fragment.split_whitespace().take(remaining) {
                out.push(' ');
                out.push_str(word);
                remaining -= 1;
            }
        }
        out
    }
}

impl Responder for OfflineResponder {
    fn respond(&self, request: &ModelRequest) -> Result<ModelOutput, ModelError> {
        match request {
            ModelRequest::Conversational { text, .. } => Ok(ModelOutput::Conversational {
                generated_text: self.conversational(text),
            }),
            ModelRequest::QuestionAnswering { question, context } => {
                Ok(self.question_answering(question, context))
            }
            ModelRequest::FillMask { text, top_k } => self.fill_mask(text, *top_k),
            ModelRequest::TextGeneration {
                prompt,
                max_new_tokens,
                seed,
            } => Ok(ModelOutput::TextGeneration {
                generated_text: self.text_generation(prompt, *max_new_tokens, *seed),
            }),
        }
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
}

/// Crude plural folding so "keys" matches "key".
fn stem(word: &str) -> &str {
    word.strip_suffix('s')
        .filter(|s| s.len() > 2)
        .unwrap_or(word)
}

/// Byte spans of the sentences in `text`, each ending at its terminator.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            push_trimmed(text, start, end, &mut spans);
            start = end;
        }
    }
    push_trimmed(text, start, text.len(), &mut spans);
    spans
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    if lead + trail < slice.len() {
        spans.push((start + lead, end - trail));
    }
}
