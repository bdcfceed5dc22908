//! Batch encoding and decoding.
//!
//! Inbound frames are decoded record by record: a record whose tag is unknown
//! or whose fields do not match its shape is logged and skipped, and the rest
//! of the batch is still delivered. Only a frame that is not a msgpack array
//! at all fails as a whole.

use serde::de::IgnoredAny;
use serde::Deserialize;

use super::Message;
use crate::error::ClientError;

/// One element of an inbound batch, before it is known to be a valid
/// [`Message`].
#[derive(Deserialize)]
#[serde(untagged)]
enum WireRecord {
    Known(Message),
    Tagged(TaggedRecord),
    Opaque(IgnoredAny),
}

/// Fallback view of a record that only extracts its tag for logging.
#[derive(Deserialize)]
struct TaggedRecord {
    #[serde(rename = "type")]
    kind: String,
}

/// Decode one frame into its messages, preserving their order.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the frame is not a msgpack array.
/// Individual bad records never fail the batch.
pub fn decode_batch(frame: &[u8]) -> Result<Vec<Message>, ClientError> {
    let records: Vec<WireRecord> = rmp_serde::from_slice(frame)?;
    let total = records.len();
    let messages: Vec<Message> = records
        .into_iter()
        .filter_map(|record| match record {
            WireRecord::Known(message) => Some(message),
            WireRecord::Tagged(TaggedRecord { kind }) => {
                log::warn!("skipping unrecognized or malformed {kind} record");
                None
            }
            WireRecord::Opaque(_) => {
                log::warn!("skipping untagged record in batch");
                None
            }
        })
        .collect();
    if messages.len() != total {
        log::debug!("decoded {} of {total} records", messages.len());
    }
    Ok(messages)
}

/// Encode a single outbound message as a bare record frame.
///
/// The server reads each client frame as exactly one message, so outbound
/// frames are never wrapped in a batch array.
///
/// # Errors
///
/// Returns [`ClientError::Encode`] if serialization fails.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, ClientError> {
    Ok(rmp_serde::to_vec_named(message)?)
}
