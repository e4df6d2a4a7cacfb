use crate::models::{BotReply, GenerateResponse, Source};

/// Shown when the response carries no usable text at any link of the
/// candidates path.
pub const NO_TEXT_FALLBACK: &str = "Sorry, I couldn't generate a recommendation right now.";

/// Projects a raw API result into a normalized reply. Pure and total: a
/// missing or malformed field degrades that field, never the whole reply.
pub fn extract_reply(response: &GenerateResponse) -> BotReply {
    let candidate = response.candidates.first();

    let text = candidate
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.first())
        .map(|part| part.text.as_str())
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_TEXT_FALLBACK)
        .to_string();

    // Citations are all-or-nothing per entry: an attribution missing either
    // the uri or the title is dropped rather than partially rendered.
    let sources = candidate
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|metadata| {
            metadata
                .grounding_attributions
                .iter()
                .filter_map(|attribution| attribution.web.as_ref())
                .filter(|web| !web.uri.is_empty() && !web.title.is_empty())
                .map(|web| Source {
                    uri: web.uri.clone(),
                    title: web.title.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    BotReply { text, sources }
}
