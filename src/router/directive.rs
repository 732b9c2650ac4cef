use teloxide::types::{ChatId, MessageId, ParseMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMethod {
    SendText(String),
    SendPhoto { url: String, caption: Option<String> },
    /// Text with a single-row reply keyboard.
    SendTextWithKeyboard { text: String, buttons: Vec<String> },
    NoOp,
}

/// What the bot should send in answer to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub chat_id: ChatId,
    pub method: DeliveryMethod,
    pub parse_mode: Option<ParseMode>,
    pub reply_to: Option<MessageId>,
}

impl Directive {
    fn new(chat_id: ChatId, method: DeliveryMethod) -> Self {
        Self {
            chat_id,
            method,
            parse_mode: None,
            reply_to: None,
        }
    }

    pub fn send_text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self::new(chat_id, DeliveryMethod::SendText(text.into()))
    }

    pub fn send_photo(chat_id: ChatId, url: impl Into<String>, caption: Option<String>) -> Self {
        Self::new(
            chat_id,
            DeliveryMethod::SendPhoto {
                url: url.into(),
                caption,
            },
        )
    }

    pub fn with_keyboard(chat_id: ChatId, text: impl Into<String>, buttons: Vec<String>) -> Self {
        Self::new(
            chat_id,
            DeliveryMethod::SendTextWithKeyboard {
                text: text.into(),
                buttons,
            },
        )
    }

    pub fn no_op(chat_id: ChatId) -> Self {
        Self::new(chat_id, DeliveryMethod::NoOp)
    }

    /// Sends the text as MarkdownV2. The caller escapes dynamic parts.
    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::MarkdownV2);
        self
    }

    pub fn reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self.method, DeliveryMethod::NoOp)
    }

    /// The visible text, if the directive carries any.
    #[cfg(test)]
    pub fn body(&self) -> Option<&str> {
        match &self.method {
            DeliveryMethod::SendText(text) => Some(text),
            DeliveryMethod::SendTextWithKeyboard { text, .. } => Some(text),
            DeliveryMethod::SendPhoto { caption, .. } => caption.as_deref(),
            DeliveryMethod::NoOp => None,
        }
    }
}
