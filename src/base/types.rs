use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Profile attributes of the user behind a mention.
///
/// Fetched per event, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Name used to label the user in reply metadata.
    pub display_name: String,
    /// The user's human name, shown in the reply body.
    pub real_name: String,
}

/// A labeled field rendered inside a reply attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

/// The structured reply posted back for a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAttachment {
    /// Short line shown above the attachment body.
    pub pretext: String,
    /// Attachment body text.
    pub text: String,
    /// Sidebar accent color, as a hex string.
    pub color: String,
    /// Ordered labeled fields shown under the body.
    pub fields: Vec<AttachmentField>,
}

/// Per-event failures surfaced by the dispatcher.
///
/// Every variant is terminal for the single event it affects, never for the
/// dispatch loop or the process.
#[derive(Debug, Error)]
pub enum EventError {
    /// The callback payload did not narrow to an app mention.
    #[error("event payload is not an app mention: {body}")]
    TypeMismatch { body: String },
    /// A top-level category other than a platform callback.
    #[error("unsupported event category: {category}")]
    UnsupportedCategory { category: String },
    /// User-profile resolution failed; the reply is abandoned.
    #[error("user lookup failed: {0}")]
    Lookup(Err),
    /// The outbound post failed; the reply is lost.
    #[error("message post failed: {0}")]
    Post(Err),
}
