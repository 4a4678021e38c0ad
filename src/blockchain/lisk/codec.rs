//! Lisk binary codec for token transfer transactions.
//!
//! Fields are written in field-number order as protobuf-style keys
//! (`field << 3 | wire_type`) followed by a varint or a length-prefixed value.

use crate::blockchain::lisk::address::ADDRESS_LENGTH;

const WIRE_VARINT: u8 = 0;
const WIRE_BYTES: u8 = 2;

/// Token module id.
pub const TOKEN_MODULE_ID: u32 = 2;
/// Transfer asset id within the token module.
pub const TRANSFER_ASSET_ID: u32 = 0;

/// Append `value` as an unsigned LEB128 varint.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn key(&mut self, field: u32, wire_type: u8) {
        write_varint(&mut self.buf, (u64::from(field) << 3) | u64::from(wire_type));
    }

    fn uint(&mut self, field: u32, value: u64) -> &mut Self {
        self.key(field, WIRE_VARINT);
        write_varint(&mut self.buf, value);
        self
    }

    fn bytes(&mut self, field: u32, value: &[u8]) -> &mut Self {
        self.key(field, WIRE_BYTES);
        write_varint(&mut self.buf, value.len() as u64);
        self.buf.extend_from_slice(value);
        self
    }

    fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Asset of a token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferAsset {
    pub amount: u64,
    pub recipient: [u8; ADDRESS_LENGTH],
    pub data: String,
}

impl TransferAsset {
    pub fn encode(&self) -> Vec<u8> {
        Writer::new()
            .uint(1, self.amount)
            .bytes(2, &self.recipient)
            .bytes(3, self.data.as_bytes())
            .finish()
    }
}

/// A transfer transaction, optionally carrying signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTransaction {
    pub nonce: u64,
    pub fee: u64,
    pub sender_public_key: [u8; 32],
    pub asset: TransferAsset,
    pub signatures: Vec<Vec<u8>>,
}

impl TransferTransaction {
    /// Encode with the current signatures (none for the signing payload).
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        writer
            .uint(1, u64::from(TOKEN_MODULE_ID))
            .uint(2, u64::from(TRANSFER_ASSET_ID))
            .uint(3, self.nonce)
            .uint(4, self.fee)
            .bytes(5, &self.sender_public_key)
            .bytes(6, &self.asset.encode());
        for signature in &self.signatures {
            writer.bytes(7, signature);
        }
        writer.finish()
    }

    /// Bytes the sender signs: network identifier followed by the unsigned encoding.
    pub fn signing_bytes(&self, network_id: &[u8; 32]) -> Vec<u8> {
        let unsigned = TransferTransaction {
            signatures: Vec::new(),
            ..self.clone()
        };
        let mut bytes = network_id.to_vec();
        bytes.extend_from_slice(&unsigned.encode());
        bytes
    }
}
