/// Keyword-matched canned responses, used when no API key is configured and
/// as the degraded answer when the remote call ultimately fails.
///
/// The table is immutable after construction and injected into the
/// orchestrator, so tests can substitute their own keyword set.
#[derive(Debug, Clone)]
pub struct FallbackResponder {
    entries: Vec<(String, String)>,
    default_response: String,
}

impl FallbackResponder {
    pub fn new<K, V, I>(entries: I, default_response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(keyword, response)| {
                    let keyword: String = keyword.into();
                    (keyword.to_lowercase(), response.into())
                })
                .collect(),
            default_response: default_response.into(),
        }
    }

    /// Returns the first entry whose keyword is a substring of the lowercased
    /// input. Insertion order is priority order; no scoring.
    pub fn respond(&self, user_text: &str) -> &str {
        let normalized = user_text.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| normalized.contains(keyword.as_str()))
            .map(|(_, response)| response.as_str())
            .unwrap_or(self.default_response.as_str())
    }
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new(
            [
                (
                    "pizza",
                    "For pizza, look for a spot with a wood-fired oven \u{2014} the crust makes all the difference. A classic Margherita is the best way to judge a new place.",
                ),
                (
                    "sushi",
                    "For sushi, sit at the counter if you can and ask the chef what's freshest today. Omakase is worth it at least once.",
                ),
                (
                    "burger",
                    "A great burger needs a properly seared smashed patty and a toasted bun. Skip anything taller than your mouth can handle.",
                ),
                (
                    "pasta",
                    "Fresh pasta beats dried at a good trattoria. If cacio e pepe is on the menu, that's my pick \u{2014} it's the hardest simple dish to get right.",
                ),
                (
                    "tacos",
                    "The best tacos usually come from the smallest kitchens. Look for handmade tortillas and a good al pastor.",
                ),
                (
                    "salad",
                    "For something lighter, a proper salad place will dress to order and not drown the greens. Grain bowls travel well too.",
                ),
                (
                    "breakfast",
                    "For breakfast, find somewhere that takes its eggs seriously. If there's a line of locals on a weekday, that's your spot.",
                ),
                (
                    "dessert",
                    "Save room for dessert somewhere that makes it in-house. A short dessert menu is usually a good sign.",
                ),
                (
                    "help",
                    "I can suggest what to eat and where to look. Tell me a dish or cuisine \u{2014} pizza, sushi, tacos \u{2014} and I'll point you somewhere good.",
                ),
            ],
            "I'm not sure about that one. Try asking me about a dish or cuisine \u{2014} pizza, sushi, burgers, pasta \u{2014} and I'll have an opinion.",
        )
    }
}
