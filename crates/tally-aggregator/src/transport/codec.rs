//! Decode-once codec for deliveries.
//!
//! - Body bytes => Envelope (lazy `RawValue` for data)
//! - Envelope version is checked here, before dispatch

use bytes::Bytes;
use tally_core::{error::Result, protocol::Envelope};

#[derive(Debug)]
pub struct Inbound {
    pub env: Envelope,
    pub bytes_len: usize,
}

pub fn decode(body: &Bytes) -> Result<Inbound> {
    let env = Envelope::from_slice(body)?;
    Ok(Inbound {
        env,
        bytes_len: body.len(),
    })
}
