use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::model::{Event, KennelBooking};

/// Bytes around each payload: a `u32` length before, a `u32` crc32 after.
const FRAME_OVERHEAD: usize = 8;

/// One journal record as it sits on disk: `[u32 len][bincode Event][u32 crc32]`,
/// little-endian.
fn encode_frame(event: &Event) -> io::Result<Vec<u8>> {
    let payload = bincode::serialize(event).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "journal record too large"))?;

    let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    Ok(frame)
}

enum Decoded {
    Record { event: Event, size: usize },
    /// Not enough bytes left for a whole frame: a write cut short by a crash.
    Torn,
    Corrupt(&'static str),
}

fn decode_frame(bytes: &[u8]) -> Decoded {
    let Some((len, rest)) = bytes.split_first_chunk::<4>() else {
        return Decoded::Torn;
    };
    let len = u32::from_le_bytes(*len) as usize;
    if rest.len() < len + 4 {
        return Decoded::Torn;
    }
    let (payload, rest) = rest.split_at(len);
    let crc = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
    if crc != crc32fast::hash(payload) {
        return Decoded::Corrupt("checksum mismatch");
    }
    match bincode::deserialize::<Event>(payload) {
        Ok(event) => Decoded::Record {
            event,
            size: len + FRAME_OVERHEAD,
        },
        Err(_) => Decoded::Corrupt("undecodable record"),
    }
}

/// What a journal file holds up to its last intact record.
#[derive(Debug, Default)]
pub struct Recovered {
    pub events: Vec<Event>,
    /// Length of the intact prefix; everything past it is discarded.
    pub valid_len: u64,
    pub discarded_bytes: u64,
}

/// Read every intact record from `path`. A missing file recovers as empty.
pub fn scan(path: &Path) -> io::Result<Recovered> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Recovered::default()),
        Err(e) => return Err(e),
    };

    let mut recovered = Recovered::default();
    let mut offset = 0usize;
    while offset < bytes.len() {
        match decode_frame(&bytes[offset..]) {
            Decoded::Record { event, size } => {
                recovered.events.push(event);
                offset += size;
            }
            Decoded::Torn => {
                tracing::warn!("journal {}: torn record at byte {offset}", path.display());
                break;
            }
            Decoded::Corrupt(why) => {
                tracing::warn!("journal {}: {why} at byte {offset}", path.display());
                break;
            }
        }
    }
    recovered.valid_len = offset as u64;
    recovered.discarded_bytes = (bytes.len() - offset) as u64;
    Ok(recovered)
}

/// Append-only log of committed booking changes.
///
/// Each record is written with a single `write_all` and synced before the
/// call returns. The file never keeps bytes past the last intact record:
/// `recover` cuts a damaged tail off, and a failed `record` truncates back.
pub struct Journal {
    file: File,
    path: PathBuf,
    len: u64,
    records_since_rewrite: u64,
}

impl Journal {
    /// Open the journal at `path` for appending, returning the events it
    /// already holds. A damaged tail is truncated away first.
    pub fn recover(path: &Path) -> io::Result<(Self, Vec<Event>)> {
        let recovered = scan(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if recovered.discarded_bytes > 0 {
            tracing::warn!(
                "journal {}: dropping {} damaged bytes after {} records",
                path.display(),
                recovered.discarded_bytes,
                recovered.events.len()
            );
            file.set_len(recovered.valid_len)?;
            file.sync_all()?;
        }
        let journal = Self {
            file,
            path: path.to_path_buf(),
            len: recovered.valid_len,
            records_since_rewrite: 0,
        };
        Ok((journal, recovered.events))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event and sync it to disk.
    pub fn record(&mut self, event: &Event) -> io::Result<()> {
        let frame = encode_frame(event)?;
        if let Err(e) = self.file.write_all(&frame).and_then(|()| self.file.sync_data()) {
            // Keep a partial frame from hiding the records that follow
            if let Err(trunc) = self.file.set_len(self.len) {
                tracing::error!("journal {}: could not cut back failed record: {trunc}", self.path.display());
            }
            return Err(e);
        }
        self.len += frame.len() as u64;
        self.records_since_rewrite += 1;
        Ok(())
    }

    /// Replace the whole journal with one `Restored` record of `bookings`.
    ///
    /// The snapshot goes to a sibling temp file that is synced and renamed
    /// over the journal, so a crash leaves either the old or the new file.
    pub fn rewrite(&mut self, bookings: &[KennelBooking]) -> io::Result<()> {
        let frame = encode_frame(&Event::Restored {
            bookings: bookings.to_vec(),
        })?;
        let tmp = self.path.with_extension("journal.tmp");
        {
            let mut out = File::create(&tmp)?;
            out.write_all(&frame)?;
            out.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.len = frame.len() as u64;
        self.records_since_rewrite = 0;
        Ok(())
    }

    pub fn records_since_rewrite(&self) -> u64 {
        self.records_since_rewrite
    }
}
