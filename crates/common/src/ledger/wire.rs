//! Binary encoding of anchoring transactions.
//!
//! An anchoring transaction is a legacy-format transaction containing
//! exactly two instructions: a zero-lamport self-transfer paying the fee
//! and a memo carrying the tagged digest. Variable-length collections
//! use the ledger's compact-u16 length prefix.

use ed25519_dalek::{Signer, SigningKey};

/// Well-known address of the ledger's system program.
const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Append `value` as a compact-u16: little-endian groups of seven bits,
/// the high bit of each byte marking a continuation.
fn push_compact_u16(out: &mut Vec<u8>, mut value: u16) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80;
        }

        out.push(byte);

        if value == 0 {
            break;
        }
    }
}

fn program_key(encoded: &str) -> [u8; 32] {
    bs58::decode(encoded)
        .into_vec()
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .expect("well-known program addresses are valid 32-byte keys")
}

/// Unsigned message of an anchoring transaction.
pub(super) struct MemoMessage<'a> {
    pub payer: [u8; 32],
    pub recent_blockhash: [u8; 32],
    pub memo: &'a [u8],
}

impl MemoMessage<'_> {
    pub(super) fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.memo.len());

        // Header: one required signature, no read-only signer accounts,
        // two read-only unsigned accounts (the two programs below).
        out.extend_from_slice(&[1, 0, 2]);

        push_compact_u16(&mut out, 3);
        out.extend_from_slice(&self.payer);
        out.extend_from_slice(&program_key(SYSTEM_PROGRAM_ID));
        out.extend_from_slice(&program_key(super::MEMO_PROGRAM_ID));

        out.extend_from_slice(&self.recent_blockhash);

        push_compact_u16(&mut out, 2);

        // Zero-lamport transfer from the payer to itself, so the
        // transaction moves no funds but still pays the network fee.
        out.push(1);
        push_compact_u16(&mut out, 2);
        out.extend_from_slice(&[0, 0]);
        push_compact_u16(&mut out, 12);
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());

        // Memo instruction with no accounts; the payload is the tagged
        // digest as raw bytes.
        out.push(2);
        push_compact_u16(&mut out, 0);
        push_compact_u16(&mut out, self.memo.len() as u16);
        out.extend_from_slice(self.memo);

        out
    }
}

/// Sign `message` and serialize the complete transaction: a one-element
/// signature list followed by the message bytes.
pub(super) fn sign_transaction(key: &SigningKey, message: &[u8]) -> Vec<u8> {
    let signature = key.sign(message);

    let mut out = Vec::with_capacity(65 + message.len());
    push_compact_u16(&mut out, 1);
    out.extend_from_slice(&signature.to_bytes());
    out.extend_from_slice(message);
    out
}
