//! Structured rich-message payloads.

use serde::{Deserialize, Serialize};

/// A rich attachment posted alongside (or instead of) a text message.
///
/// Empty fields are omitted when serialized.
///
/// # Example
///
/// ```rust
/// use hark_core::Attachment;
///
/// let txt = "Host, deploy and share your bot in seconds.";
/// let attachment = Attachment::new()
///     .pretext("We bring bots to life.")
///     .title("Hosting")
///     .title_link("https://example.com/")
///     .text(txt)
///     .fallback(txt)
///     .color("#7CD197");
///
/// assert_eq!(attachment.title, "Hosting");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fallback: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pretext: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title_link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumb_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub footer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
}

/// A short key/value row rendered inside an [`Attachment`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    /// Whether the field is narrow enough to sit next to another one.
    #[serde(default)]
    pub short: bool,
}

impl AttachmentField {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short,
        }
    }
}

macro_rules! string_setters {
    ($($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("Sets `", stringify!($field), "`.")]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = value.into();
                self
            }
        )*
    };
}

impl Attachment {
    /// Creates an empty attachment.
    pub fn new() -> Self {
        Self::default()
    }

    string_setters!(
        fallback,
        color,
        pretext,
        author_name,
        author_link,
        title,
        title_link,
        text,
        image_url,
        thumb_url,
        footer,
    );

    /// Appends a field row.
    pub fn field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }
}
