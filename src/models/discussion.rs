// src/models/discussion.rs

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Map, Value};
use validator::Validate;

use super::flexible;

/// A per-material discussion thread (Forum Diskusi).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Discussion {
    pub materi_title: Option<String>,
    pub is_closed: bool,
    /// Id of the signed-in student within the forum; their messages carry it as `sender_id`.
    pub author_id: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(deserialize_with = "flexible::string")]
    pub sender_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
    /// "dosen" (lecturer) or "mahasiswa" (student).
    #[serde(default)]
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Message {
    pub fn is_lecturer(&self) -> bool {
        self.role.eq_ignore_ascii_case("dosen")
    }
}

impl Discussion {
    pub fn is_own(&self, message: &Message) -> bool {
        self.author_id.as_deref() == Some(message.sender_id.as_str())
    }

    pub fn last_message_id(&self) -> Option<i64> {
        self.messages.last().map(|m| m.id)
    }
}

/// The server sends the thread metadata and the messages side by side in one object:
/// `{"materi_title": .., "is_closed": .., "author_id": .., "0": {msg}, "1": {msg}, ..}`.
/// A `messages` array is accepted as well.
impl<'de> Deserialize<'de> for Discussion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;

        let materi_title = match map.remove("materi_title") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        let is_closed = match map.remove("is_closed") {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
            _ => false,
        };

        let author_id = match map.remove("author_id") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let messages = match map.remove("messages") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<Message>, _>>()
                .map_err(D::Error::custom)?,
            _ => {
                let mut keyed: Vec<(Option<u64>, String, Value)> = map
                    .into_iter()
                    .filter(|(_, v)| v.is_object())
                    .map(|(k, v)| (k.parse::<u64>().ok(), k, v))
                    .collect();
                // Numeric keys in numeric order ("2" before "10"), anything else after
                keyed.sort_by(|a, b| {
                    (a.0.is_none(), a.0, &a.1).cmp(&(b.0.is_none(), b.0, &b.1))
                });
                keyed
                    .into_iter()
                    .map(|(_, _, v)| serde_json::from_value(v))
                    .collect::<Result<Vec<Message>, _>>()
                    .map_err(D::Error::custom)?
            }
        };

        Ok(Self {
            materi_title,
            is_closed,
            author_id,
            messages,
        })
    }
}

/// DTO for posting to a discussion.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SendMessageRequest {
    pub materi_id: String,
    pub email: String,
    #[validate(
        length(max = 2000, message = "Pesan maksimal 2000 karakter"),
        custom(function = validate_not_blank)
    )]
    pub message: String,
}

fn validate_not_blank(message: &str) -> Result<(), validator::ValidationError> {
    if message.trim().is_empty() {
        return Err(validator::ValidationError::new("message_blank")
            .with_message("Pesan tidak boleh kosong".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(id: i64, sender: &str) -> Value {
        json!({
            "id": id, "sender_id": sender, "name": "Budi", "photo": null,
            "role": "mahasiswa", "content": format!("pesan {}", id),
            "created_at": "2025-03-10 08:00:00"
        })
    }

    #[test]
    fn flattened_messages_are_ordered_numerically() {
        let mut data = json!({
            "materi_title": "Struktur Data",
            "is_closed": 0,
            "author_id": "u-7",
        });
        for i in 0..12 {
            data[i.to_string()] = msg(i + 100, if i % 2 == 0 { "u-7" } else { "u-9" });
        }

        let d: Discussion = serde_json::from_value(data).unwrap();
        let ids: Vec<i64> = d.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, (100..112).collect::<Vec<_>>());
        assert!(!d.is_closed);
        assert_eq!(d.materi_title.as_deref(), Some("Struktur Data"));
        assert!(d.is_own(&d.messages[0]));
        assert!(!d.is_own(&d.messages[1]));
        assert_eq!(d.last_message_id(), Some(111));
    }

    #[test]
    fn message_array_and_numeric_sender_ids() {
        let d: Discussion = serde_json::from_value(json!({
            "is_closed": true,
            "author_id": 42,
            "messages": [{"id": 1, "sender_id": 42, "role": "dosen", "content": "Halo"}]
        }))
        .unwrap();
        assert!(d.is_closed);
        assert!(d.is_own(&d.messages[0]));
        assert!(d.messages[0].is_lecturer());
    }

    #[test]
    fn blank_message_fails_validation() {
        let req = SendMessageRequest {
            materi_id: "3".into(),
            email: "a@b.co".into(),
            message: "   ".into(),
        };
        assert!(req.validate().is_err());
    }
}
