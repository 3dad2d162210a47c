//! Binary alignment records.
//!
//! A record is the bincode encoding of an [`Alignment`]: sequence1 (length
//! prefixed text), mutations (length prefixed packed codes), range1 and
//! range2 as `(from, to)` pairs of 32-bit integers, then the 32-bit float
//! score. Records are self-delimiting and can be concatenated in a stream.

use std::io::{ErrorKind, Read, Write};

use crate::alignment::Alignment;
use crate::error::{AlignError, Result};
use crate::traits::BioSequence;

pub fn write_alignment<S: BioSequence, W: Write>(writer: &mut W, alignment: &Alignment<S>) -> Result<()> {
    bincode::serialize_into(writer, alignment)?;
    Ok(())
}

/// Reads one record; records failing validation are rejected.
pub fn read_alignment<S: BioSequence, R: Read>(reader: &mut R) -> Result<Alignment<S>> {
    Ok(bincode::deserialize_from(reader)?)
}

pub fn write_alignments<'a, S, W, I>(writer: &mut W, alignments: I) -> Result<usize>
where
    S: BioSequence,
    W: Write,
    I: IntoIterator<Item = &'a Alignment<S>>,
{
    let mut written = 0;
    for alignment in alignments {
        write_alignment(writer, alignment)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Reads records until the stream ends cleanly between two of them.
pub fn read_alignments<S: BioSequence, R: Read>(reader: &mut R) -> Result<Vec<Alignment<S>>> {
    let mut out = Vec::new();
    loop {
        let mut counted = Counted {
            inner: &mut *reader,
            consumed: 0,
        };
        match read_alignment(&mut counted) {
            Ok(alignment) => out.push(alignment),
            Err(AlignError::Serialization(e)) if counted.consumed == 0 && is_eof(&e) => return Ok(out),
            Err(e) => return Err(e),
        }
    }
}

/// Tracks how far into the current record a read got.
struct Counted<'a, R> {
    inner: &'a mut R,
    consumed: usize,
}

impl<R: Read> Read for Counted<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n;
        Ok(n)
    }
}

fn is_eof(e: &bincode::Error) -> bool {
    matches!(&**e, bincode::ErrorKind::Io(io) if io.kind() == ErrorKind::UnexpectedEof)
}

pub fn to_bytes<S: BioSequence>(alignment: &Alignment<S>) -> Result<Vec<u8>> {
    Ok(bincode::serialize(alignment)?)
}

pub fn from_bytes<S: BioSequence>(bytes: &[u8]) -> Result<Alignment<S>> {
    Ok(bincode::deserialize(bytes)?)
}
