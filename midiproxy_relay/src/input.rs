//! A stand-in for a MIDI driver: packets typed in hexadecimal, one packet list per line.
//!
//! ```text
//! 90 3C 40          # a single note on
//! 90 3C 40, 80 3C 00  # two packets delivered together
//! ```

use std::{
    io::{self, BufRead},
    time::Instant,
};

use crate::network::proto::RawPacket;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid hex byte {0:?}")]
    BadByte(String),
}

/// Parses a comma separated list of packets, all stamped with `timestamp`.
pub fn parse_packet_list(line: &str, timestamp: u64) -> Result<Vec<RawPacket>, ParseError> {
    line.split(',')
        .map(str::trim)
        .filter(|packet| !packet.is_empty())
        .map(|packet| {
            let bytes = packet
                .split_whitespace()
                .map(|b| u8::from_str_radix(b, 16).map_err(|_| ParseError::BadByte(b.to_owned())))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(RawPacket::from_bytes(timestamp, &bytes))
        })
        .collect()
}

/// Yields one packet list per non-empty line of `reader`.
///
/// Timestamps are nanoseconds elapsed since this source was created. Lines that
/// fail to parse are skipped.
pub struct HexLines<R> {
    lines: io::Lines<R>,
    start: Instant,
}

impl<R: BufRead> HexLines<R> {
    #[inline(always)]
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            start: Instant::now(),
        }
    }
}

impl<R: BufRead> Iterator for HexLines<R> {
    type Item = io::Result<Vec<RawPacket>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };

            let line = line.split_once('#').map_or(line.as_str(), |(packets, _comment)| packets);
            let timestamp = u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX);

            match parse_packet_list(line, timestamp) {
                Ok(packets) if packets.is_empty() => continue,
                Ok(packets) => return Some(Ok(packets)),
                Err(e) => tracing::warn!("skipping line {line:?}: {e}"),
            }
        }
    }
}
