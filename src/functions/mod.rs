//! Model functions
//!
//! Typed entry points that combine an adapter capability with the call
//! executors: each function records one call with its own lifecycle events.

pub mod embed;
pub mod generate_structure;
pub mod generate_text;
pub mod generate_tool_call;
pub mod stream_structure;
pub mod stream_text;

pub use embed::{embed, embed_many};
pub use generate_structure::generate_structure;
pub use generate_text::generate_text;
pub use generate_tool_call::generate_tool_call;
pub use stream_structure::{StructureStreamPart, stream_structure};
pub use stream_text::stream_text;

/// Snapshot a prompt for call metadata; unserializable prompts record `null`.
pub(crate) fn input_value<T: serde::Serialize + ?Sized>(input: &T) -> serde_json::Value {
    serde_json::to_value(input).unwrap_or_else(|error| {
        tracing::warn!(%error, "prompt is not serializable, recording null input");
        serde_json::Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Serialize, Serializer};
    use tracing_test::traced_test;

    struct Opaque;

    impl Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque prompt"))
        }
    }

    #[test]
    #[traced_test]
    fn unserializable_input_is_logged() {
        assert_eq!(input_value(&Opaque), serde_json::Value::Null);
        assert!(logs_contain("opaque prompt"));
    }
}
