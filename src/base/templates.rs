//! Canned reply templates for mention responses.

/// Title of the timestamp field attached to every reply.
pub const DATE_FIELD_TITLE: &str = "Date";

/// Title of the field naming who triggered the reply.
pub const INITIALIZER_FIELD_TITLE: &str = "Initializer";

/// Render format for the `Date` field value (local time with offset).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// The two canned replies the bot can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTemplate {
    /// The mention text greeted the bot.
    Greeting,
    /// Anything else: offer to help.
    ServiceOffer,
}

impl ReplyTemplate {
    /// Pick the template for a message, given its lowercased text.
    ///
    /// "hello" anywhere in the text selects the greeting; no other keywords
    /// are recognized.
    pub fn select(normalized_text: &str) -> Self {
        if normalized_text.contains("hello") { Self::Greeting } else { Self::ServiceOffer }
    }

    /// Line shown above the reply body.
    pub fn pretext(&self) -> &'static str {
        match self {
            Self::Greeting => "Greetings",
            Self::ServiceOffer => "How can I be of service?",
        }
    }

    /// Reply body, addressed to the user by real name.
    pub fn body(&self, real_name: &str) -> String {
        match self {
            Self::Greeting => format!("Hello, {real_name}"),
            Self::ServiceOffer => format!("How can I help you {real_name}?"),
        }
    }

    /// Sidebar accent color for the reply.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Greeting => "#4af030",
            Self::ServiceOffer => "#3d3d3d",
        }
    }
}
