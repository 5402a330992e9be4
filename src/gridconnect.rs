//! GridConnect ASCII encoding of CBUS frames, as spoken by CAN-USB and
//! serial gateways.
//!
//! A standard frame looks like `:SB020N9000010002;`: the `S` header holds the
//! 11-bit CAN identifier shifted left by five, and the `N` part holds the
//! opcode and data bytes as hex pairs.

use arrayvec::ArrayVec;
use nom::branch::alt;
use nom::bytes::streaming::{take_till, take_while_m_n};
use nom::combinator::{map_opt, opt};
use nom::sequence::{preceded, terminated};
use nom::Err::Incomplete;
use nom::IResult;

use crate::frame::Frame;

type Buf = [u8];

/// Longest encoded frame, `:S` + header + `N` + 8 data bytes + `;`.
pub const MAX_ENCODED_LEN: usize = 24;

/// A frame ready for transmission.
pub type EncodedFrame = ArrayVec<u8, MAX_ENCODED_LEN>;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Result of parsing the start of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameToken {
    /// A complete, valid standard frame.
    Frame(Frame),
    /// Something was consumed that isn't a usable standard frame: extended
    /// and RTR frames, malformed headers or payloads.
    Ignored,
    /// The buffer doesn't hold a complete frame yet.
    NeedData,
}

/// Parse one frame from the start of `buf`.
///
/// Returns the number of bytes consumed together with the token. Bytes in
/// front of the first `:` are always consumed, even when more data is needed
/// to complete the frame that follows them.
pub fn parse_frame(buf: &Buf) -> (usize, FrameToken) {
    let start = skip_garbage(buf);
    let rest = &buf[start..];
    match frame(rest) {
        Ok((remaining, token)) => (buf.len() - remaining.len(), token),
        Err(Incomplete(_)) => (start, FrameToken::NeedData),
        // Skip the ':' and try again on the next call
        Err(_) => (start + 1, FrameToken::Ignored),
    }
}

/// Encode `frame` in GridConnect format.
pub fn encode(frame: &Frame) -> EncodedFrame {
    let mut out = EncodedFrame::new();
    let header = (u16::from(frame.priority()) << 7 | u16::from(frame.can_id())) << 5;
    out.push(b':');
    out.push(b'S');
    for byte in header.to_be_bytes() {
        push_hex(&mut out, byte);
    }
    out.push(b'N');
    push_hex(&mut out, frame.opcode());
    for byte in frame.data() {
        push_hex(&mut out, *byte);
    }
    out.push(b';');
    out
}

fn push_hex(out: &mut EncodedFrame, byte: u8) {
    out.push(HEX[usize::from(byte >> 4)]);
    out.push(HEX[usize::from(byte & 0x0f)]);
}

fn skip_garbage(buf: &Buf) -> usize {
    buf.iter().position(|&c| c == b':').unwrap_or(buf.len())
}

fn frame(buf: &Buf) -> IResult<&Buf, FrameToken> {
    preceded(ascii_char(b':'), alt((standard_frame, other_frame)))(buf)
}

fn standard_frame(buf: &Buf) -> IResult<&Buf, FrameToken> {
    let (buf, header) = preceded(ascii_char(b'S'), header)(buf)?;
    let (buf, payload) = preceded(
        ascii_char(b'N'),
        terminated(take_while_m_n(0, 16, is_hex_digit), ascii_char(b';')),
    )(buf)?;
    Ok((buf, to_token(header, payload)))
}

/// Consume anything up to and including the next `;`, but stop in front of
/// a `:` so a following frame isn't lost.
fn other_frame(buf: &Buf) -> IResult<&Buf, FrameToken> {
    let (buf, _) = take_till(|c: u8| c == b';' || c == b':')(buf)?;
    let (buf, _) = opt(ascii_char(b';'))(buf)?;
    Ok((buf, FrameToken::Ignored))
}

fn header(buf: &Buf) -> IResult<&Buf, u16> {
    map_opt(take_while_m_n(4, 4, is_hex_digit), hex_value)(buf)
}

fn to_token(header: u16, payload: &Buf) -> FrameToken {
    if payload.is_empty() || payload.len() % 2 != 0 {
        log::debug!("Ignoring frame with {} payload digits", payload.len());
        return FrameToken::Ignored;
    }
    let mut bytes = ArrayVec::<u8, 8>::new();
    for pair in payload.chunks(2) {
        // pairs of hex digits always fit in a byte
        bytes.push(hex_value(pair).unwrap_or_default() as u8);
    }

    let id = header >> 5;
    let priority = (id >> 7) as u8 & 0x0f;
    let can_id = (id & 0x7f) as u8;
    match Frame::new(priority, can_id, bytes[0], &bytes[1..]) {
        Ok(frame) => FrameToken::Frame(frame),
        Err(err) => {
            log::debug!("Ignoring frame: {}", err);
            FrameToken::Ignored
        }
    }
}

fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

fn hex_value(digits: &Buf) -> Option<u16> {
    digits.iter().try_fold(0u16, |acc, &c| {
        let digit = (c as char).to_digit(16)?;
        Some(acc << 4 | digit as u16)
    })
}

fn ascii_char<'a>(ascii_char: u8) -> impl Fn(&'a Buf) -> IResult<&'a Buf, char> {
    nom::character::streaming::char(ascii_char as char)
}
