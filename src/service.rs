use std::sync::Arc;

use crate::config::Config;
use crate::extract::extract_reply;
use crate::fallback::FallbackResponder;
use crate::fetcher::ResilientFetcher;
use crate::models::{BotReply, MessageId, Source};
use crate::transport::GeminiTransport;

/// Prefix for the degraded answer when the remote call ultimately fails.
const CONNECTIVITY_APOLOGY: &str =
    "I'm having trouble connecting to my restaurant database right now.";

/// Defensive last resort; shown only if the reply pipeline itself blows up.
const UNEXPECTED_ERROR: &str = "I'm sorry, I encountered an error.";

/// Inputs answered instantly from the fallback table, with the richer remote
/// answer arriving later as a background upgrade.
const GREETINGS: &[&str] = &["help", "hi", "hello", "what can you do"];

/// Callback contract implemented by the UI layer. `render_message` hands back
/// an id so a background upgrade can rewrite exactly the message it produced,
/// regardless of what has been rendered since.
pub trait ChatUi: Send + Sync {
    fn render_message(&self, text: &str, is_bot: bool, sources: &[Source]) -> MessageId;
    fn show_loading_indicator(&self);
    fn remove_loading_indicator(&self);
    fn update_bot_message(&self, id: MessageId, text: &str, sources: &[Source]);
    fn set_input_enabled(&self, enabled: bool);
}

/// Disables input for one submission's round trip; re-enables on every exit
/// path via Drop.
struct InputGuard {
    ui: Arc<dyn ChatUi>,
}

impl InputGuard {
    fn disable(ui: Arc<dyn ChatUi>) -> Self {
        ui.set_input_enabled(false);
        Self { ui }
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        self.ui.set_input_enabled(true);
    }
}

/// The response orchestrator. Decides per submission whether to answer from
/// the fallback table, the remote API, or both; every path resolves to a
/// displayable reply, never a raw error.
pub struct ChatService {
    fetcher: Option<Arc<ResilientFetcher>>,
    fallback: FallbackResponder,
}

impl ChatService {
    /// `fetcher: None` means no credential is configured; the service then
    /// answers from the fallback table without ever touching the network.
    pub fn new(fetcher: Option<Arc<ResilientFetcher>>, fallback: FallbackResponder) -> Self {
        Self { fetcher, fallback }
    }

    pub fn from_config(config: &Config) -> Self {
        let fetcher = if config.has_api_key() {
            let transport = Arc::new(GeminiTransport::new(
                &config.gemini.api_key,
                &config.gemini.model,
            ));
            Some(Arc::new(ResilientFetcher::new(
                transport,
                config.retry_policy(),
                config.attempt_timeout(),
                config.gemini.system_instruction.clone(),
            )))
        } else {
            None
        };
        Self::new(fetcher, FallbackResponder::default())
    }

    fn is_greeting(&self, user_text: &str) -> bool {
        let normalized = user_text.to_lowercase();
        GREETINGS.iter().any(|g| normalized.contains(g))
    }

    /// Unified reply for one submission. Infallible: remote failures degrade
    /// to an apology plus the fallback answer.
    pub async fn get_reply(&self, user_text: &str) -> BotReply {
        let Some(fetcher) = &self.fetcher else {
            return BotReply::text_only(self.fallback.respond(user_text));
        };

        if self.is_greeting(user_text) {
            // Instant answer; the upgrade is the submit driver's business
            // because it needs the rendered message's id.
            return BotReply::text_only(self.fallback.respond(user_text));
        }

        match fetcher.fetch(user_text).await {
            Ok(response) => extract_reply(&response),
            Err(err) => {
                tracing::warn!(error = %err, "could not reach service, degrading to fallback");
                BotReply::text_only(format!(
                    "{CONNECTIVITY_APOLOGY} {}",
                    self.fallback.respond(user_text)
                ))
            }
        }
    }

    /// Full lifecycle for one user submission: render, busy guard, loading
    /// indicator, reply, and (for greetings with a credential) the detached
    /// background upgrade.
    pub async fn handle_submit(self: &Arc<Self>, user_text: &str, ui: Arc<dyn ChatUi>) {
        ui.render_message(user_text, false, &[]);
        let _guard = InputGuard::disable(Arc::clone(&ui));
        ui.show_loading_indicator();

        if let Some(fetcher) = &self.fetcher {
            if self.is_greeting(user_text) {
                let text = self.fallback.respond(user_text).to_string();
                ui.remove_loading_indicator();
                let id = ui.render_message(&text, true, &[]);
                spawn_upgrade(Arc::clone(fetcher), user_text.to_string(), ui, id);
                return;
            }
        }

        let service = Arc::clone(self);
        let query = user_text.to_string();
        let reply = match tokio::spawn(async move { service.get_reply(&query).await }).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %err, "reply pipeline failed unexpectedly");
                BotReply::text_only(UNEXPECTED_ERROR)
            }
        };

        ui.remove_loading_indicator();
        ui.render_message(&reply.text, true, &reply.sources);
    }
}

/// Detached upgrade for a greeting reply. Not awaited by the submitting
/// handler; it races freely against later submissions but only ever rewrites
/// the message whose id it carries. Failures are logged and swallowed - the
/// user already has a usable answer.
fn spawn_upgrade(
    fetcher: Arc<ResilientFetcher>,
    query: String,
    ui: Arc<dyn ChatUi>,
    id: MessageId,
) {
    tokio::spawn(async move {
        match fetcher.fetch(&query).await {
            Ok(response) => {
                let reply = extract_reply(&response);
                tracing::debug!(%id, "upgrading greeting reply with remote answer");
                ui.update_bot_message(id, &reply.text, &reply.sources);
            }
            Err(err) => {
                tracing::debug!(%id, error = %err, "background upgrade failed, keeping fallback reply");
            }
        }
    });
}
