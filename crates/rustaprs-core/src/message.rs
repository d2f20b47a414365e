use crate::Fault;
use core::fmt;

/// Width of the space-padded addressee field.
pub const ADDRESSEE_LEN: usize = 9;
const MAX_ACK_NUMBER_LEN: usize = 5;

/// `:ADDRESSEE:text{number`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageField {
    pub addressee: String,
    pub text: String,
    pub number: Option<String>,
    /// Acknowledgement piggybacked as `{MM}AA`.
    pub reply_ack: Option<String>,
    pub is_ack: bool,
    pub is_rej: bool,
    pub fault: Option<Fault>,
}

impl MessageField {
    pub fn new(addressee: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            addressee: addressee.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }
}

impl fmt::Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{:<width$}:", self.addressee, width = ADDRESSEE_LEN)?;
        if self.is_ack || self.is_rej {
            let kind = if self.is_ack { "ack" } else { "rej" };
            return write!(f, "{kind}{}", self.number.as_deref().unwrap_or(""));
        }
        f.write_str(&self.text)?;
        if let Some(number) = &self.number {
            write!(f, "{{{number}")?;
            if let Some(reply_ack) = &self.reply_ack {
                write!(f, "}}{reply_ack}")?;
            }
        }
        Ok(())
    }
}

/// Decodes a `:` payload. A message has no comment, so the whole payload is
/// consumed.
pub fn decode_message(payload: &[u8]) -> (MessageField, usize) {
    let faulted = |reason: &str| {
        let field = MessageField {
            fault: Some(Fault::new(reason)),
            ..MessageField::default()
        };
        (field, payload.len().min(1))
    };
    if payload.len() < 2 {
        return faulted("message too short");
    }
    let Some(end) = payload[2..].iter().position(|b| *b == b':').map(|i| i + 2) else {
        return faulted("message addressee is not terminated");
    };

    let addressee = String::from_utf8_lossy(&payload[1..end]).trim().to_uppercase();
    let body = String::from_utf8_lossy(&payload[end + 1..]);
    let (text, number) = match body.rsplit_once('{') {
        Some((text, number)) => (text, Some(number)),
        None => (body.as_ref(), None),
    };
    let (number, reply_ack) = match number.and_then(|n| n.split_once('}')) {
        Some((number, reply_ack)) => (Some(number), Some(reply_ack.to_string())),
        None => (number, None),
    };

    let mut field = MessageField {
        addressee,
        text: text.to_string(),
        number: number.map(str::to_string),
        reply_ack,
        ..MessageField::default()
    };

    let kind = text.get(..3).map(str::to_ascii_lowercase);
    let ack_number = text.get(3..).unwrap_or("");
    let is_response = ack_number.len() <= MAX_ACK_NUMBER_LEN
        && ack_number.bytes().all(|b| b.is_ascii_alphanumeric());
    match kind.as_deref() {
        Some("ack") if is_response => field.is_ack = true,
        Some("rej") if is_response => field.is_rej = true,
        _ => {}
    }
    if field.is_ack || field.is_rej {
        if !ack_number.is_empty() {
            field.number = Some(ack_number.to_string());
        }
        field.text.truncate(3);
    }
    (field, payload.len())
}

#[cfg(test)]
mod tests {
    use super::{decode_message, MessageField};

    #[test]
    fn numbered_message() {
        let payload = b":TARGET   :test ok{1";
        let (msg, cursor) = decode_message(payload);
        assert_eq!(msg.addressee, "TARGET");
        assert_eq!(msg.text, "test ok");
        assert_eq!(msg.number.as_deref(), Some("1"));
        assert!(!msg.is_ack && !msg.is_rej);
        assert_eq!(cursor, payload.len());
        assert_eq!(msg.to_string(), ":TARGET   :test ok{1");
    }

    #[test]
    fn ack_and_rej_in_both_forms() {
        let (msg, _) = decode_message(b":TARGET   :ack{1");
        assert!(msg.is_ack);
        assert_eq!(msg.number.as_deref(), Some("1"));
        assert_eq!(msg.text, "ack");

        let (msg, _) = decode_message(b":TARGET   :ack12");
        assert!(msg.is_ack);
        assert_eq!(msg.number.as_deref(), Some("12"));
        assert_eq!(msg.to_string(), ":TARGET   :ack12");

        let (msg, _) = decode_message(b":TARGET   :REJ{1");
        assert!(msg.is_rej);
        assert_eq!(msg.number.as_deref(), Some("1"));
    }

    #[test]
    fn words_starting_with_ack_are_text() {
        let (msg, _) = decode_message(b":TARGET   :acknowledged, thanks{5");
        assert!(!msg.is_ack);
        assert_eq!(msg.text, "acknowledged, thanks");
    }

    #[test]
    fn reply_ack_and_plain_bulletin() {
        let (msg, _) = decode_message(b":n0call   :hello{AB}CD");
        assert_eq!(msg.addressee, "N0CALL");
        assert_eq!(msg.number.as_deref(), Some("AB"));
        assert_eq!(msg.reply_ack.as_deref(), Some("CD"));
        assert_eq!(msg.to_string(), ":N0CALL   :hello{AB}CD");

        let (msg, _) = decode_message(b":BLN1     :Net tonight");
        assert_eq!(msg.number, None);
        assert_eq!(msg.text, "Net tonight");
    }

    #[test]
    fn malformed_messages_fault() {
        let (msg, cursor) = decode_message(b":");
        assert!(msg.has_fault());
        assert_eq!(cursor, 1);
        let (msg, _) = decode_message(b":TARGET no colon");
        assert_eq!(
            msg.fault.unwrap().reason(),
            "message addressee is not terminated"
        );
    }

    #[test]
    fn builder_renders_padded_addressee() {
        let msg = MessageField::new("W1AW", "hi").with_number("7");
        assert_eq!(msg.to_string(), ":W1AW     :hi{7");
    }
}
