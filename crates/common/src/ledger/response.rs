//! Typed views over `getTransaction` replies.
//!
//! Node versions and transaction versions disagree on the field names and
//! payload encodings inside a transaction message. Rather than probing a
//! dynamic JSON tree, the known shapes are modeled as an explicit union
//! and normalized into one [`Message`] form before memo extraction.

use base64::Engine;
use serde::Deserialize;

#[derive(Deserialize)]
pub(super) struct TransactionEnvelope {
    pub transaction: TransactionBody,
}

#[derive(Deserialize)]
pub(super) struct TransactionBody {
    pub message: MessageShape,
}

/// Known wire shapes of a transaction message.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum MessageShape {
    Legacy {
        #[serde(rename = "accountKeys")]
        account_keys: Vec<String>,
        instructions: Vec<InstructionShape>,
    },
    Versioned {
        #[serde(rename = "staticAccountKeys")]
        static_account_keys: Vec<String>,
        #[serde(rename = "compiledInstructions")]
        compiled_instructions: Vec<InstructionShape>,
    },
}

#[derive(Deserialize)]
pub(super) struct InstructionShape {
    #[serde(rename = "programIdIndex", alias = "programIndex")]
    pub program_index: usize,
    pub data: InstructionData,
}

/// Instruction payloads arrive either as encoded text or as raw bytes.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum InstructionData {
    Text(String),
    Bytes(Vec<u8>),
}

/// Shape-independent view of a transaction message.
pub(super) struct Message {
    pub account_keys: Vec<String>,
    pub instructions: Vec<InstructionShape>,
}

impl From<MessageShape> for Message {
    fn from(shape: MessageShape) -> Self {
        match shape {
            MessageShape::Legacy {
                account_keys,
                instructions,
            } => Self {
                account_keys,
                instructions,
            },
            MessageShape::Versioned {
                static_account_keys,
                compiled_instructions,
            } => Self {
                account_keys: static_account_keys,
                instructions: compiled_instructions,
            },
        }
    }
}

impl Message {
    /// Extract the first memo payload carrying the `tag` prefix.
    ///
    /// Textual payloads are tried as base58, then base64, then as the
    /// literal text, accepting the first decoding that starts with the
    /// tag. The tag itself is stripped from the returned value.
    pub(super) fn tagged_memo(&self, tag: &str) -> Option<String> {
        let memo_index = self
            .account_keys
            .iter()
            .position(|key| key == super::MEMO_PROGRAM_ID)?;

        self.instructions
            .iter()
            .filter(|instruction| instruction.program_index == memo_index)
            .find_map(|instruction| instruction.data.decode_tagged(tag))
    }
}

impl InstructionData {
    fn decode_tagged(&self, tag: &str) -> Option<String> {
        match self {
            Self::Text(text) => [decode_base58(text), decode_base64(text), Some(text.clone())]
                .into_iter()
                .flatten()
                .find_map(|candidate| strip_tag(&candidate, tag)),
            Self::Bytes(bytes) => strip_tag(core::str::from_utf8(bytes).ok()?, tag),
        }
    }
}

fn decode_base58(text: &str) -> Option<String> {
    let bytes = bs58::decode(text).into_vec().ok()?;
    String::from_utf8(bytes).ok()
}

fn decode_base64(text: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(text)
        .ok()?;
    String::from_utf8(bytes).ok()
}

fn strip_tag(candidate: &str, tag: &str) -> Option<String> {
    candidate.strip_prefix(tag).map(str::to_owned)
}
