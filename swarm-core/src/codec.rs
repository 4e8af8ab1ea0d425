//! Framed binary message codec (spec.md §4.5, §6).
//!
//! Every frame is `header || payload`, big-endian throughout. The header is
//! fixed at 6 bytes: `type: u8, sender_id: u8, tick: u32`. Frames shorter
//! than the header, or with an unknown type code, are rejected with a typed
//! [`CodecError`] — callers at the tick-loop boundary drop these silently
//! per spec.md §7; the error exists so they can log what was discarded.
//!
//! Grounded on the hand-rolled `to_be_bytes`/`from_be_bytes` framing style
//! used for wire messages elsewhere in the pack (length-checked slicing,
//! one push per field) rather than a serde-based wire format.

use crate::error::CodecError;
use crate::types::{NodeId, TaskId, Tick};

const HEADER_LEN: usize = 6;

const TYPE_HEARTBEAT: u8 = 0x01;
const TYPE_ELECTION_ACCLAIM: u8 = 0x02;
const TYPE_COORDINATOR: u8 = 0x03;
const TYPE_TASK_CLAIM: u8 = 0x04;
const TYPE_TASK_CONFLICT: u8 = 0x05;

/// The five message types the protocol exchanges (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Heartbeat { leader_x: f32, leader_y: f32 },
    ElectionAcclaim { claimant_id: NodeId },
    Coordinator,
    TaskClaim { task_id: TaskId, utility: f32 },
    TaskConflict { task_id: TaskId, winner_id: NodeId },
}

impl Message {
    fn type_code(&self) -> u8 {
        match self {
            Message::Heartbeat { .. } => TYPE_HEARTBEAT,
            Message::ElectionAcclaim { .. } => TYPE_ELECTION_ACCLAIM,
            Message::Coordinator => TYPE_COORDINATOR,
            Message::TaskClaim { .. } => TYPE_TASK_CLAIM,
            Message::TaskConflict { .. } => TYPE_TASK_CONFLICT,
        }
    }

    fn write_payload(&self, buf: &mut Vec<u8>) {
        match self {
            Message::Heartbeat { leader_x, leader_y } => {
                buf.extend_from_slice(&leader_x.to_be_bytes());
                buf.extend_from_slice(&leader_y.to_be_bytes());
            }
            Message::ElectionAcclaim { claimant_id } => {
                buf.push(*claimant_id);
            }
            Message::Coordinator => {}
            Message::TaskClaim { task_id, utility } => {
                buf.extend_from_slice(&task_id.to_be_bytes());
                buf.extend_from_slice(&utility.to_be_bytes());
            }
            Message::TaskConflict { task_id, winner_id } => {
                buf.extend_from_slice(&task_id.to_be_bytes());
                buf.push(*winner_id);
            }
        }
    }
}

/// A decoded frame: who sent it, at what tick, carrying which message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub sender: NodeId,
    pub tick: Tick,
    pub message: Message,
}

/// Encode `message` as a complete frame with the given sender and tick.
pub fn encode(sender: NodeId, tick: Tick, message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + 8);
    buf.push(message.type_code());
    buf.push(sender);
    buf.extend_from_slice(&tick.to_be_bytes());
    message.write_payload(&mut buf);
    buf
}

/// Decode one complete frame from `bytes`. Frames shorter than the 6-byte
/// header, or carrying an unrecognized type code, are rejected; the parser
/// never panics on truncated or garbage input.
pub fn decode(bytes: &[u8]) -> Result<Frame, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TooShort);
    }

    let type_code = bytes[0];
    let sender = bytes[1];
    let tick = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
    let payload = &bytes[HEADER_LEN..];

    let message = match type_code {
        TYPE_HEARTBEAT => {
            let (leader_x, rest) = take_f32(payload)?;
            let (leader_y, _) = take_f32(rest)?;
            Message::Heartbeat { leader_x, leader_y }
        }
        TYPE_ELECTION_ACCLAIM => {
            let claimant_id = *payload.first().ok_or(CodecError::TruncatedPayload)?;
            Message::ElectionAcclaim { claimant_id }
        }
        TYPE_COORDINATOR => Message::Coordinator,
        TYPE_TASK_CLAIM => {
            let (task_id, rest) = take_u32(payload)?;
            let (utility, _) = take_f32(rest)?;
            Message::TaskClaim { task_id, utility }
        }
        TYPE_TASK_CONFLICT => {
            let (task_id, rest) = take_u32(payload)?;
            let winner_id = *rest.first().ok_or(CodecError::TruncatedPayload)?;
            Message::TaskConflict { task_id, winner_id }
        }
        _ => return Err(CodecError::UnknownType),
    };

    Ok(Frame { sender, tick, message })
}

fn take_u32(buf: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    if buf.len() < 4 {
        return Err(CodecError::TruncatedPayload);
    }
    let (head, tail) = buf.split_at(4);
    Ok((u32::from_be_bytes([head[0], head[1], head[2], head[3]]), tail))
}

fn take_f32(buf: &[u8]) -> Result<(f32, &[u8]), CodecError> {
    let (bits, tail) = take_u32(buf)?;
    Ok((f32::from_bits(bits), tail))
}
