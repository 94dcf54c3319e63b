use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record streamed by the chat, generation and regeneration endpoints.
///
/// `reasoning` and `chunk` carry the cumulative text so far; consumers
/// replace their buffer with each payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Reasoning {
        #[serde(default)]
        content: String,
    },
    Chunk {
        #[serde(default)]
        content: String,
    },
    Field {
        field: String,
        value: Value,
    },
    Action {
        action: String,
    },
    Done {
        #[serde(default)]
        content: Option<String>,
    },
    Complete {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        data: Option<Map<String, Value>>,
    },
    Error {
        #[serde(default)]
        error: String,
    },
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Done { .. } | StreamEvent::Complete { .. } | StreamEvent::Error { .. }
        )
    }

    /// Structured request to start generation.
    pub fn is_generate_action(&self) -> bool {
        matches!(self, StreamEvent::Action { action } if action == "generate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_each_kind() {
        let cases = [
            (r#"{"type":"chunk","content":"Olá"}"#, StreamEvent::Chunk { content: "Olá".into() }),
            (r#"{"type":"action","action":"generate"}"#, StreamEvent::Action { action: "generate".into() }),
            (r#"{"type":"done"}"#, StreamEvent::Done { content: None }),
            (r#"{"type":"error","error":"falhou"}"#, StreamEvent::Error { error: "falhou".into() }),
            (r#"{"type":"heartbeat","ts":1}"#, StreamEvent::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(serde_json::from_str::<StreamEvent>(raw).unwrap(), expected);
        }
    }

    #[test]
    fn test_complete_with_data() {
        let ev: StreamEvent = serde_json::from_str(
            r#"{"type":"complete","success":true,"data":{"objeto":"x","riscos":[{"r":1}]}}"#,
        )
        .unwrap();
        match ev {
            StreamEvent::Complete { success, data: Some(data) } => {
                assert!(success);
                assert_eq!(data["objeto"], "x");
                assert!(data["riscos"].is_array());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(StreamEvent::Action { action: "generate".into() }.is_generate_action());
    }

    #[test]
    fn test_missing_tag_is_an_error() {
        assert!(serde_json::from_str::<StreamEvent>(r#"{"content":"x"}"#).is_err());
    }
}
