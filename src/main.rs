use anyhow::Result;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;
mod error;
mod extract;
mod fallback;
mod fetcher;
mod models;
mod retry;
mod service;
mod transport;

use crate::config::Config;
use crate::models::{ChatMessage, MessageId, Source};
use crate::service::{ChatService, ChatUi};

/// Terminal implementation of the chat UI contract. Messages are kept by id
/// so a late background upgrade can rewrite the reply it belongs to.
#[derive(Default)]
struct TerminalUi {
    messages: Mutex<Vec<(MessageId, ChatMessage)>>,
}

impl TerminalUi {
    fn print_reply(&self, prefix: &str, text: &str, sources: &[Source]) {
        println!("{prefix} {text}");
        for source in sources {
            println!("        [{}] {}", source.title, source.uri);
        }
    }
}

impl ChatUi for TerminalUi {
    fn render_message(&self, text: &str, is_bot: bool, sources: &[Source]) -> MessageId {
        let id = MessageId::new();
        if is_bot {
            self.print_reply("  bot:", text, sources);
        }
        self.messages
            .lock()
            .expect("terminal ui mutex should not be poisoned")
            .push((
                id,
                ChatMessage {
                    text: text.to_string(),
                    is_bot,
                    sources: sources.to_vec(),
                },
            ));
        id
    }

    fn show_loading_indicator(&self) {
        println!("  ...");
    }

    fn remove_loading_indicator(&self) {}

    fn update_bot_message(&self, id: MessageId, text: &str, sources: &[Source]) {
        let mut messages = self
            .messages
            .lock()
            .expect("terminal ui mutex should not be poisoned");
        if let Some((_, message)) = messages.iter_mut().find(|(msg_id, _)| *msg_id == id) {
            *message = ChatMessage {
                text: text.to_string(),
                is_bot: true,
                sources: sources.to_vec(),
            };
            self.print_reply("  bot (update):", text, sources);
        }
    }

    fn set_input_enabled(&self, _enabled: bool) {
        // The read loop below is sequential, so there is no input control to
        // disable; a browser UI would toggle its text field here.
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let service = Arc::new(ChatService::from_config(&config));
    let ui: Arc<dyn ChatUi> = Arc::new(TerminalUi::default());

    println!("Plateful - ask me where to eat (ctrl-d to quit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        service.handle_submit(line, Arc::clone(&ui)).await;
    }

    Ok(())
}
