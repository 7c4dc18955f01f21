use std::io::{self, Read};

use dsky_protocol::agc::{Packet, PACKET_LEN};
use log::{debug, warn};

/// Splits a byte stream from the simulator into 4-byte packets
///
/// Partial reads are reassembled. When the framing bits do not line up the
/// reader slides forward one byte at a time until they do.
pub struct PacketReader<R> {
    inner: R,
    buf: [u8; PACKET_LEN],
    filled: usize,
    skipped: usize,
}

impl<R: Read> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: [0; PACKET_LEN],
            filled: 0,
            skipped: 0,
        }
    }

    /// Bytes discarded while resynchronising
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Next packet, or `None` at end of stream
    pub fn next_packet(&mut self) -> io::Result<Option<Packet>> {
        loop {
            while self.filled < PACKET_LEN {
                match self.inner.read(&mut self.buf[self.filled..]) {
                    Ok(0) => {
                        if self.filled > 0 {
                            debug!("Discarding {} trailing bytes", self.filled);
                            self.filled = 0;
                        }
                        return Ok(None);
                    }
                    Ok(n) => self.filled += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }

            if let Some(packet) = Packet::new(&self.buf) {
                self.filled = 0;
                return Ok(Some(packet));
            }

            if self.skipped == 0 {
                warn!("Packet framing lost, resynchronising");
            }
            self.skipped += 1;
            self.buf.copy_within(1.., 0);
            self.filled = PACKET_LEN - 1;
        }
    }
}

impl<R: Read> Iterator for PacketReader<R> {
    type Item = io::Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}
