//! Dialogue module - conversation state for the NPCs
//!
//! The polar bear, robot and fox keep a one-exchange window: the player's
//! last line and the NPC's last answer. The moose instead tells a story that
//! grows with every request and can be reset.
//!
//! Model calls are asynchronous from the game's point of view. Submitting
//! produces a [`ModelRequest`] tagged with a ticket; the reply is matched
//! back by ticket, so a reply for a request that was superseded (e.g. the
//! story was reset meanwhile) is dropped.

use tui_bear_types::{
    ModelOutput, ModelRequest, Npc, FILL_MASK_TOP_K, MASK_TOKEN, STORY_NEW_TOKENS, STORY_PROMPT,
};

use crate::layout::Line;

/// Background knowledge the question-answering model draws its answers from.
pub const QA_CONTEXT: &str = "This game has the following objects in it: Player Bear, Wall, Tree, Key, Lock, Polar Bear, Robot, Fox and Moose. \
The Player Bear is a character controlled by you, the user. You can use the arrow keys to make the Player Bear move around, and the RETURN or ENTER key to talk with the other characters. \
The wall is an impassable obstacle. You cannot go over it. You must go around it. \
The tree and the lock are interactive objects. The key is located at the top of the tree. You can climb the tree to get the key. \
The key appears in your inventory. Once you have the key, you can use it to open the lock. \
This game contains four NPCs: the Polar Bear, the Robot, the Fox and the Moose. \
Each NPC is a chatbot that uses a different model to perform a language task. \
The Polar Bear performs conversational response modelling. \
The Robot performs question answering. \
The Fox performs fill-mask, guessing the word hidden behind the mask token. \
The Moose performs text generation and tells a story. \
NPC stands for non-player character. NLP stands for natural language processing.";

/// Placeholder shown while a reply is outstanding.
pub const THINKING: &str = "...";

fn greeting(npc: Npc) -> &'static str {
    match npc {
        Npc::PolarBear => "Hey! I'm a conversational model. Wanna chat?",
        Npc::Robot => "I am a question-answering chatbot. Ask me anything about this game.",
        Npc::Fox => "I am a fill-mask chatbot. Give me a sentence and I will fill in the blanks wherever you write '<mask>'.",
        Npc::Moose => STORY_PROMPT,
    }
}

/// What submitting a line led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// A model call is needed.
    Request(ModelRequest),
    /// Answered locally; no model call.
    Answered,
    /// Nothing happened (busy, or nothing to send).
    Ignored,
}

/// One-exchange chat with the polar bear, robot or fox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialogue {
    npc: Npc,
    last_input: Option<String>,
    last_response: String,
    pending: Option<u64>,
}

impl Dialogue {
    pub fn new(npc: Npc) -> Self {
        Self {
            npc,
            last_input: None,
            last_response: greeting(npc).to_string(),
            pending: None,
        }
    }

    pub fn npc(&self) -> Npc {
        self.npc
    }

    pub fn last_input(&self) -> Option<&str> {
        self.last_input.as_deref()
    }

    pub fn last_response(&self) -> &str {
        &self.last_response
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Send `input` to the NPC under `ticket`.
    pub fn submit(&mut self, input: &str, ticket: u64) -> Submitted {
        if self.pending.is_some() {
            return Submitted::Ignored;
        }

        let previous_input = self.last_input.replace(input.to_string());
        let previous_response = std::mem::take(&mut self.last_response);

        let request = match self.npc {
            Npc::PolarBear => ModelRequest::Conversational {
                past_user_inputs: previous_input.into_iter().collect(),
                generated_responses: vec![previous_response],
                text: input.to_string(),
            },
            Npc::Robot => ModelRequest::QuestionAnswering {
                question: input.to_string(),
                context: QA_CONTEXT.to_string(),
            },
            Npc::Fox => match input.matches(MASK_TOKEN).count() {
                0 => {
                    self.last_response =
                        "I don't understand. Make sure your input contains the word <mask>."
                            .to_string();
                    return Submitted::Answered;
                }
                1 => ModelRequest::FillMask {
                    text: input.to_string(),
                    top_k: FILL_MASK_TOP_K,
                },
                _ => {
                    self.last_response =
                        "One blank at a time, please. Use <mask> only once.".to_string();
                    return Submitted::Answered;
                }
            },
            Npc::Moose => {
                // Stories are not dialogues; keep the window intact.
                self.last_input = previous_input;
                self.last_response = previous_response;
                return Submitted::Ignored;
            }
        };

        self.pending = Some(ticket);
        Submitted::Request(request)
    }

    /// Apply a model reply. Returns false for unknown or stale tickets.
    pub fn receive(&mut self, ticket: u64, result: Result<ModelOutput, String>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.last_response = match result {
            Ok(output) => match format_output(output) {
                Some(text) => text,
                None => "...I lost my train of thought.".to_string(),
            },
            Err(err) => {
                log::warn!("{} model failed: {}", self.npc.as_str(), err);
                "I can't think right now. Try again later.".to_string()
            }
        };
        true
    }

    /// Text box body: the exchange, then what the player is typing.
    pub fn lines(&self, typing: &str) -> Vec<Line> {
        let speaker = self.npc.speaker();
        let response = if self.pending.is_some() {
            THINKING
        } else {
            self.last_response.as_str()
        };

        let mut lines = Vec::with_capacity(3);
        if let Some(input) = &self.last_input {
            lines.push(Line::black(format!("You: {input}")));
        }
        lines.push(Line::blue(format!("{speaker}: {response}")));
        lines.push(Line::black(format!("You: {typing}")));
        lines
    }
}

/// Turn a model output into the NPC's spoken line.
fn format_output(output: ModelOutput) -> Option<String> {
    match output {
        ModelOutput::Conversational { generated_text } => {
            Some(generated_text.trim().to_string())
        }
        ModelOutput::QuestionAnswering { answer, .. } => Some(sentence_case(&answer)),
        ModelOutput::FillMask { candidates } => {
            let best = candidates.first()?;
            let words: Vec<&str> = candidates.iter().map(|c| c.token_str.trim()).collect();
            Some(format!(
                "{} The most likely words are: {}.",
                best.sequence.trim(),
                words.join(", ")
            ))
        }
        ModelOutput::TextGeneration { generated_text } => Some(generated_text),
    }
}

/// First letter upper-cased, the rest lower-cased, closed with a period.
///
/// ```
/// use tui_bear_core::dialogue::sentence_case;
///
/// assert_eq!(sentence_case("the Player Bear"), "The player bear.");
/// assert_eq!(sentence_case("  "), ".");
/// ```
pub fn sentence_case(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches('.');
    let mut chars = trimmed.chars();
    let mut out = String::with_capacity(trimmed.len() + 1);
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.extend(chars.flat_map(char::to_lowercase));
    }
    out.push('.');
    out
}

/// The moose's story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    text: String,
    pending: Option<u64>,
}

impl Default for Story {
    fn default() -> Self {
        Self::new()
    }
}

impl Story {
    pub fn new() -> Self {
        Self {
            text: STORY_PROMPT.to_string(),
            pending: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Ask for a continuation under `seed`. `None` while one is in flight.
    pub fn continue_with(&mut self, seed: u32, ticket: u64) -> Option<ModelRequest> {
        if self.pending.is_some() {
            return None;
        }
        self.pending = Some(ticket);
        Some(ModelRequest::TextGeneration {
            prompt: self.text.clone(),
            max_new_tokens: STORY_NEW_TOKENS,
            seed,
        })
    }

    /// Back to the opening line. Any in-flight continuation is discarded.
    pub fn reset(&mut self) {
        self.text = STORY_PROMPT.to_string();
        self.pending = None;
    }

    pub fn receive(&mut self, ticket: u64, result: Result<ModelOutput, String>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        match result {
            Ok(ModelOutput::TextGeneration { generated_text }) => {
                let generated = generated_text.trim();
                if !generated.is_empty() {
                    self.text = generated.to_string();
                }
            }
            Ok(other) => {
                log::warn!("story got a {} output", other.task().as_str());
            }
            Err(err) => log::warn!("story model failed: {}", err),
        }
        true
    }

    pub fn lines(&self) -> Vec<Line> {
        let mut text = format!("{}: {}", Npc::Moose.speaker(), self.text);
        if self.pending.is_some() {
            text.push(' ');
            text.push_str(THINKING);
        }
        vec![Line::blue(text)]
    }
}

/// Footer pinned to the bottom of the text box while at the moose.
pub fn story_tip() -> Line {
    Line::black("TIP - Hit RETURN or ENTER to continue the story, or BACKSPACE to reset it.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_bear_types::FillCandidate;

    #[test]
    fn first_lines_show_greeting_then_typing() {
        let d = Dialogue::new(Npc::PolarBear);
        let lines = d.lines("hi");
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].text,
            "P. Bear: Hey! I'm a conversational model. Wanna chat?"
        );
        assert_eq!(lines[1].text, "You: hi");
    }

    #[test]
    fn conversational_request_carries_previous_exchange() {
        let mut d = Dialogue::new(Npc::PolarBear);
        let req = d.submit("hello", 1);
        assert_eq!(
            req,
            Submitted::Request(ModelRequest::Conversational {
                past_user_inputs: vec![],
                generated_responses: vec![greeting(Npc::PolarBear).to_string()],
                text: "hello".to_string(),
            })
        );
        assert!(d.receive(
            1,
            Ok(ModelOutput::Conversational {
                generated_text: " Hi there! ".to_string()
            })
        ));

        let Submitted::Request(ModelRequest::Conversational {
            past_user_inputs,
            generated_responses,
            ..
        }) = d.submit("how are you", 2)
        else {
            panic!("expected conversational request");
        };
        assert_eq!(past_user_inputs, vec!["hello".to_string()]);
        assert_eq!(generated_responses, vec!["Hi there!".to_string()]);
    }

    #[test]
    fn pending_dialogue_shows_thinking_and_ignores_submits() {
        let mut d = Dialogue::new(Npc::Robot);
        assert!(matches!(d.submit("where is the key?", 7), Submitted::Request(_)));
        assert_eq!(d.submit("again", 8), Submitted::Ignored);
        let lines = d.lines("");
        assert_eq!(lines[0].text, "You: where is the key?");
        assert_eq!(lines[1].text, "Robot: ...");
    }

    #[test]
    fn stale_ticket_is_dropped() {
        let mut d = Dialogue::new(Npc::Robot);
        d.submit("q", 3);
        assert!(!d.receive(
            2,
            Ok(ModelOutput::QuestionAnswering {
                answer: "x".into(),
                score: 1.0,
                start: 0,
                end: 1
            })
        ));
        assert_eq!(d.pending(), Some(3));
    }

    #[test]
    fn robot_answers_in_sentence_case() {
        let mut d = Dialogue::new(Npc::Robot);
        d.submit("where is the key?", 1);
        d.receive(
            1,
            Ok(ModelOutput::QuestionAnswering {
                answer: "at the top of the Tree".into(),
                score: 0.9,
                start: 0,
                end: 10,
            }),
        );
        assert_eq!(d.last_response(), "At the top of the tree.");
    }

    #[test]
    fn fox_requires_exactly_one_mask() {
        let mut d = Dialogue::new(Npc::Fox);
        assert_eq!(d.submit("no blanks here", 1), Submitted::Answered);
        assert!(d.last_response().starts_with("I don't understand."));
        assert_eq!(d.pending(), None);

        assert_eq!(d.submit("<mask> and <mask>", 2), Submitted::Answered);
        assert!(d.last_response().contains("only once"));

        assert_eq!(
            d.submit("I feel <mask> today", 3),
            Submitted::Request(ModelRequest::FillMask {
                text: "I feel <mask> today".into(),
                top_k: FILL_MASK_TOP_K,
            })
        );
    }

    #[test]
    fn fox_lists_candidates() {
        let mut d = Dialogue::new(Npc::Fox);
        d.submit("I feel <mask> today", 1);
        let candidates = ["good", "great", "bad"]
            .iter()
            .map(|w| FillCandidate {
                sequence: format!("I feel {w} today"),
                token_str: format!(" {w}"),
                score: 0.1,
            })
            .collect();
        d.receive(1, Ok(ModelOutput::FillMask { candidates }));
        assert_eq!(
            d.last_response(),
            "I feel good today The most likely words are: good, great, bad."
        );
    }

    #[test]
    fn errors_become_an_apology() {
        let mut d = Dialogue::new(Npc::PolarBear);
        d.submit("hi", 1);
        d.receive(1, Err("timeout".into()));
        assert!(d.last_response().starts_with("I can't think"));
        assert_eq!(d.pending(), None);
    }

    #[test]
    fn story_continues_and_resets() {
        let mut s = Story::new();
        let req = s.continue_with(42, 1).unwrap();
        assert_eq!(
            req,
            ModelRequest::TextGeneration {
                prompt: STORY_PROMPT.into(),
                max_new_tokens: STORY_NEW_TOKENS,
                seed: 42,
            }
        );
        assert!(s.continue_with(42, 2).is_none());
        assert_eq!(s.lines()[0].text, "Moose: Once upon a time, ...");

        assert!(s.receive(
            1,
            Ok(ModelOutput::TextGeneration {
                generated_text: "Once upon a time, a bear.".into()
            })
        ));
        assert_eq!(s.text(), "Once upon a time, a bear.");

        s.continue_with(7, 3);
        s.reset();
        assert!(!s.receive(
            3,
            Ok(ModelOutput::TextGeneration {
                generated_text: "late".into()
            })
        ));
        assert_eq!(s.text(), STORY_PROMPT);
    }

    #[test]
    fn sentence_case_handles_unicode_and_periods() {
        assert_eq!(sentence_case("éclair."), "Éclair.");
        assert_eq!(sentence_case("KEY"), "Key.");
    }
}
