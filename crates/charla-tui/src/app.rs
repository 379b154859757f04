use anyhow::Result;
use tokio::task::JoinHandle;

use charla_core::{Conversation, LlmClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub conversation: Conversation,
    pub client: LlmClient,

    // Input line state
    pub input: String,
    pub cursor: usize, // char index into input

    // Chat viewport state
    pub scroll: u16,
    pub chat_height: u16, // inner height, captured during render
    pub chat_width: u16,  // inner width, captured during render

    // The single in-flight exchange
    pub response_task: Option<JoinHandle<Result<String>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(conversation: Conversation, client: LlmClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            conversation,
            client,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            chat_height: 0,
            chat_width: 0,
            response_task: None,
            animation_frame: 0,
        }
    }

    /// Submits the input line. Accepted submissions clear the buffer
    /// and dispatch the remote call; a blank buffer is kept for
    /// correction and a submission during an in-flight exchange is
    /// ignored.
    pub fn submit_input(&mut self) {
        match self.conversation.submit(&self.input) {
            Ok(Some(prompt)) => {
                self.input.clear();
                self.cursor = 0;
                self.input_mode = InputMode::Normal;

                let client = self.client.clone();
                self.response_task = Some(tokio::spawn(async move {
                    Ok(client.query(&prompt).await?)
                }));

                // Scroll so the pending indicator is visible
                self.scroll_to_bottom();
            }
            Ok(None) => {} // a response is outstanding
            Err(_) => {}   // blank input, buffer retained
        }
    }

    /// Lands the remote outcome once the in-flight task has finished.
    pub async fn poll_response(&mut self) {
        let finished = self
            .response_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.response_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(anyhow::anyhow!("response task failed: {e}")),
            };
            self.conversation.resolve(outcome);
            self.scroll_to_bottom();
        }
    }

    /// Clears the history and its persisted copy.
    pub fn clear_history(&mut self) {
        self.conversation.clear();
        self.scroll = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1).min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    /// Scroll the chat so the latest message (or the pending
    /// indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        let total = self.rendered_line_count();
        let visible = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        total.saturating_sub(visible)
    }

    /// Counts the lines the chat pane renders, using character counts
    /// so wrapped multibyte text is measured the same way it is drawn.
    fn rendered_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for msg in self.conversation.messages() {
            total += 1; // header line ("You:" / "Bot:" + timestamp)
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1;
                } else {
                    total += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total += 1; // blank line after message
        }

        if self.conversation.is_awaiting() {
            total += 2; // "Bot:" + "Thinking..."
        }

        total
    }
}
