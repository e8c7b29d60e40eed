use codechat_core::state::GREETING;
use codechat_core::{ChatMessage, ChatRequest, ChatResponse, ChatRole, RequestId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Characters of a new assistant message revealed per tick.
const REVEAL_PER_TICK: usize = 12;
/// Ticks per step of the "thinking" ellipsis.
const TICKS_PER_DOT: u8 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub model: String,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Conversation thread
    pub messages: Vec<ChatMessage>,
    /// Chars shown so far of the last message while it is being revealed.
    pub revealed: Option<usize>,

    // Outstanding ask. Only this surface knows about it; the bridge is stateless.
    pub assistant_typing: bool,
    pub pending: Option<RequestId>,
    next_id: RequestId,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
    tick_count: u8,

    // Scrolling
    pub scroll: u16,
    pub follow_bottom: bool,
    pub chat_height: u16,   // inner height of the chat area, set during render
    pub content_lines: u16, // wrapped rows of the thread at the last render

    requests: UnboundedSender<ChatRequest>,
}

impl App {
    pub fn new(model: &str, requests: UnboundedSender<ChatRequest>) -> Self {
        Self {
            should_quit: false,
            model: model.to_string(),
            input: String::new(),
            cursor: 0,
            messages: vec![ChatMessage::assistant(GREETING)],
            revealed: Some(0),
            assistant_typing: false,
            pending: None,
            next_id: 1,
            animation_frame: 0,
            tick_count: 0,
            scroll: 0,
            follow_bottom: true,
            chat_height: 0,
            content_lines: 0,
            requests,
        }
    }

    /// Sends the trimmed input as an `ask`. Refused while blank or while an answer is pending.
    /// Returns whether an ask went out.
    pub fn submit(&mut self) -> bool {
        let question = self.input.trim().to_string();
        if question.is_empty() || self.assistant_typing {
            return false;
        }

        self.finish_reveal();
        self.messages.push(ChatMessage::user(&question));
        self.input.clear();
        self.cursor = 0;
        self.follow_bottom = true;

        let id = self.next_id;
        self.next_id += 1;

        if self.requests.send(ChatRequest::ask(&question, Some(id))).is_err() {
            warn!(id, "message bridge closed, ask not sent");
            self.push_assistant("Error: message bridge closed");
            return false;
        }

        debug!(id, "ask sent");
        self.assistant_typing = true;
        self.pending = Some(id);
        self.animation_frame = 0;
        self.tick_count = 0;
        true
    }

    pub fn receive(&mut self, response: ChatResponse) {
        if response.id.is_none() || response.id == self.pending {
            self.assistant_typing = false;
            self.pending = None;
        } else {
            debug!(id = ?response.id, pending = ?self.pending, "response to an earlier ask");
        }
        self.push_assistant(&response.text);
    }

    fn push_assistant(&mut self, text: &str) {
        self.finish_reveal();
        self.messages.push(ChatMessage::assistant(text));
        self.revealed = Some(0);
        self.follow_bottom = true;
    }

    fn finish_reveal(&mut self) {
        self.revealed = None;
    }

    /// Tick animations (called by Tick event)
    pub fn tick(&mut self) {
        if let Some(shown) = self.revealed {
            let total = self
                .messages
                .last()
                .map(|m| m.content.chars().count())
                .unwrap_or(0);
            let shown = shown + REVEAL_PER_TICK;
            self.revealed = if shown >= total { None } else { Some(shown) };
        }

        if self.assistant_typing {
            self.tick_count = (self.tick_count + 1) % TICKS_PER_DOT;
            if self.tick_count == 0 {
                self.animation_frame = (self.animation_frame + 1) % 3;
            }
        }
    }

    /// The part of message `index` currently on screen.
    pub fn displayed_content(&self, index: usize) -> &str {
        let content: &str = &self.messages[index].content;
        match self.revealed {
            Some(shown) if index + 1 == self.messages.len() => {
                &content[..char_to_byte_index(content, shown)]
            }
            _ => content,
        }
    }

    pub fn is_user(&self, index: usize) -> bool {
        self.messages[index].role == ChatRole::User
    }

    // Input editing

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Scrolling

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.content_lines.saturating_sub(visible_height)
    }

    /// Pins the view to the bottom while following. Called by the renderer once it has
    /// measured `content_lines`.
    pub fn sync_scroll(&mut self) {
        let max = self.max_scroll();
        if self.follow_bottom || self.scroll > max {
            self.scroll = max;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.scroll = self.scroll.saturating_add(lines).min(max);
        self.follow_bottom = self.scroll == max;
    }
}
