//! Frame encoding and decoding for the bridge link.
//!
//! Frame format:
//! - SYNC (1 byte): 0x7E
//! - LEN (1 byte): payload length (0-250)
//! - TYPE (1 byte): message type identifier
//! - PAYLOAD (LEN bytes)
//! - CRC8 (1 byte): polynomial 0x07, init 0x00, over LEN, TYPE and PAYLOAD
//!
//! Payload bytes are not escaped. The decoder relies on LEN to find the end
//! of a frame and only hunts for SYNC between frames, so a corrupted frame
//! costs at most the bytes up to the next SYNC.

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_SYNC: u8 = 0x7E;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// SYNC + LEN + TYPE + CRC
pub const FRAME_OVERHEAD: usize = 4;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

/// Errors from frame encoding, decoding and message parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`] or a field exceeds its capacity
    PayloadTooLarge,
    /// LEN byte above [`MAX_PAYLOAD_SIZE`]
    BadLength(u8),
    /// CRC mismatch
    BadCrc { expected: u8, received: u8 },
    /// Output buffer too small for encoding
    BufferTooSmall,
    /// Message type not known to this side of the link
    UnknownType(u8),
    /// Payload is truncated, has trailing bytes, or is not valid UTF-8
    InvalidPayload,
}

const fn crc8_update(crc: u8, byte: u8) -> u8 {
    let mut crc = crc ^ byte;
    let mut bit = 0;
    while bit < 8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ 0x07
        } else {
            crc << 1
        };
        bit += 1;
    }
    crc
}

/// CRC-8 (poly 0x07, init 0x00, no reflection) over `bytes`
pub fn crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |crc, &b| crc8_update(crc, b))
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a frame, copying `payload`
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Create a frame with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Number of bytes [`Frame::encode`] will write
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    fn crc(&self) -> u8 {
        let crc = crc8_update(crc8_update(0, self.payload.len() as u8), self.msg_type);
        self.payload.iter().fold(crc, |crc, &b| crc8_update(crc, b))
    }

    /// Encode into `buffer`, returning the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(FrameError::BufferTooSmall);
        }

        let body_end = 3 + self.payload.len();
        buffer[0] = FRAME_SYNC;
        buffer[1] = self.payload.len() as u8;
        buffer[2] = self.msg_type;
        buffer[3..body_end].copy_from_slice(&self.payload);
        buffer[body_end] = self.crc();
        Ok(len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Hunting,
    Length,
    Type,
    Payload,
    Crc,
}

/// Byte-at-a-time frame decoder
///
/// Bytes outside a frame are skipped until the next SYNC. Any error resets
/// the decoder so the following bytes are decoded from scratch.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    expected_len: u8,
    msg_type: u8,
    crc: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Hunting,
            expected_len: 0,
            msg_type: 0,
            crc: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame and hunt for the next SYNC
    pub fn reset(&mut self) {
        self.state = DecodeState::Hunting;
        self.expected_len = 0;
        self.msg_type = 0;
        self.crc = 0;
        self.payload.clear();
    }

    /// Returns true if the decoder is in the middle of a frame
    pub fn in_frame(&self) -> bool {
        self.state != DecodeState::Hunting
    }

    /// Feed one byte
    ///
    /// Returns `Ok(Some(frame))` when a frame completes with a valid CRC.
    pub fn push(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            DecodeState::Hunting => {
                if byte == FRAME_SYNC {
                    self.state = DecodeState::Length;
                }
                Ok(None)
            }
            DecodeState::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::BadLength(byte));
                }
                self.expected_len = byte;
                self.crc = crc8_update(0, byte);
                self.state = DecodeState::Type;
                Ok(None)
            }
            DecodeState::Type => {
                self.msg_type = byte;
                self.crc = crc8_update(self.crc, byte);
                self.payload.clear();
                self.state = if self.expected_len == 0 {
                    DecodeState::Crc
                } else {
                    DecodeState::Payload
                };
                Ok(None)
            }
            DecodeState::Payload => {
                // Capacity is MAX_PAYLOAD_SIZE and expected_len never exceeds it
                let _ = self.payload.push(byte);
                self.crc = crc8_update(self.crc, byte);
                if self.payload.len() == self.expected_len as usize {
                    self.state = DecodeState::Crc;
                }
                Ok(None)
            }
            DecodeState::Crc => {
                let expected = self.crc;
                if byte != expected {
                    self.reset();
                    return Err(FrameError::BadCrc {
                        expected,
                        received: byte,
                    });
                }
                let frame = Frame {
                    msg_type: self.msg_type,
                    payload: core::mem::take(&mut self.payload),
                };
                self.reset();
                Ok(Some(frame))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Option<Frame> {
        let mut found = None;
        for &b in bytes {
            if let Ok(Some(frame)) = decoder.push(b) {
                found = Some(frame);
            }
        }
        found
    }

    #[test]
    fn test_crc8_check_value() {
        // Standard check value for CRC-8/SMBUS
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn test_encode_layout() {
        let frame = Frame::new(0x12, b"a/#").unwrap();
        let mut buf = [0u8; 16];
        let len = frame.encode(&mut buf).unwrap();

        assert_eq!(len, 7);
        assert_eq!(&buf[..6], &[FRAME_SYNC, 3, 0x12, b'a', b'/', b'#']);
        assert_eq!(buf[6], crc8(&[3, 0x12, b'a', b'/', b'#']));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(0x12, &[1, 2, 3]).unwrap();
        let mut buf = [0u8; 6];
        assert_eq!(frame.encode(&mut buf), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_empty_frame_decodes() {
        let mut buf = [0u8; 8];
        let len = Frame::empty(0x85).encode(&mut buf).unwrap();

        let mut decoder = FrameDecoder::new();
        let frame = decode_all(&mut decoder, &buf[..len]).unwrap();
        assert_eq!(frame.msg_type, 0x85);
        assert!(frame.payload.is_empty());
        assert!(!decoder.in_frame());
    }

    #[test]
    fn test_resync_after_garbage() {
        let mut buf = [0u8; 16];
        let len = Frame::new(0x84, &[4, b't', b'e', b'x', b't']).unwrap().encode(&mut buf).unwrap();

        let mut stream = heapless::Vec::<u8, 32>::new();
        stream.extend_from_slice(&[0x00, 0x13, 0xFF]).unwrap();
        stream.extend_from_slice(&buf[..len]).unwrap();

        let mut decoder = FrameDecoder::new();
        let frame = decode_all(&mut decoder, &stream).unwrap();
        assert_eq!(frame.msg_type, 0x84);
        assert_eq!(frame.payload.len(), 5);
    }

    #[test]
    fn test_bad_crc_resets() {
        let mut buf = [0u8; 8];
        let len = Frame::new(0x81, &[2]).unwrap().encode(&mut buf).unwrap();
        buf[len - 1] ^= 0x5A;

        let mut decoder = FrameDecoder::new();
        let mut result = Ok(None);
        for &b in &buf[..len] {
            result = decoder.push(b);
        }
        assert!(matches!(result, Err(FrameError::BadCrc { .. })));
        assert!(!decoder.in_frame());

        // A clean frame right after is still decoded
        let len = Frame::empty(0x80).encode(&mut buf).unwrap();
        assert_eq!(decode_all(&mut decoder, &buf[..len]).unwrap().msg_type, 0x80);
    }

    #[test]
    fn test_oversize_length_rejected() {
        let mut decoder = FrameDecoder::new();
        decoder.push(FRAME_SYNC).unwrap();
        assert_eq!(decoder.push(251), Err(FrameError::BadLength(251)));
        assert!(!decoder.in_frame());
    }

    #[test]
    fn test_payload_too_large() {
        let large = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(Frame::new(0x84, &large), Err(FrameError::PayloadTooLarge));
    }

    proptest! {
        #[test]
        fn prop_decoder_recovers_encoded_frame(
            msg_type in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
            noise in proptest::collection::vec(
                any::<u8>().prop_filter("not sync", |b| *b != FRAME_SYNC),
                0..16,
            ),
        ) {
            let frame = Frame::new(msg_type, &payload).unwrap();
            let mut buf = [0u8; MAX_FRAME_SIZE];
            let len = frame.encode(&mut buf).unwrap();

            let mut decoder = FrameDecoder::new();
            for &b in &noise {
                prop_assert_eq!(decoder.push(b), Ok(None));
            }
            let decoded = decode_all(&mut decoder, &buf[..len]);
            prop_assert_eq!(decoded, Some(frame));
        }
    }
}
