//! WebP RIFF container editing.
//!
//! libwebp's simple encoding API writes bare bitstreams: a `VP8 ` or `VP8L`
//! chunk, or `VP8X` + `ALPH` + `VP8 ` for lossy images with transparency. It
//! has no way to attach metadata. When metadata is kept, the encoded file is
//! rewritten into the extended layout:
//!
//! ```text
//! RIFF <size> WEBP
//!   VP8X   flags + canvas size
//!   ICCP   (if an ICC profile is present)
//!   ALPH / VP8 / VP8L   image data, unchanged
//!   (or ANIM + ANMF...  for animations)
//!   EXIF   (if EXIF is present)
//! ```

use super::backend::{BackendError, EmbeddedMetadata};

const FLAG_ICC: u8 = 0x20;
const FLAG_ALPHA: u8 = 0x10;
const FLAG_EXIF: u8 = 0x08;
const FLAG_ANIMATION: u8 = 0x02;

/// Largest canvas side the VP8X header can express (24-bit, minus one).
const MAX_CANVAS: u32 = 1 << 24;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk<'a> {
    fourcc: [u8; 4],
    payload: &'a [u8],
}

/// Add ICC and EXIF chunks to an encoded WebP file.
///
/// Returns the input unchanged when there is nothing to embed.
pub fn embed_metadata(
    webp: &[u8],
    metadata: &EmbeddedMetadata,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, BackendError> {
    if metadata.is_empty() {
        return Ok(webp.to_vec());
    }
    if width == 0 || height == 0 || width > MAX_CANVAS || height > MAX_CANVAS {
        return Err(BackendError::Encode(format!(
            "canvas {width}x{height} cannot carry metadata"
        )));
    }

    let chunks = parse_chunks(webp)?;

    let mut flags = 0u8;
    if has_alpha(&chunks) {
        flags |= FLAG_ALPHA;
    }
    if is_animated(&chunks) {
        flags |= FLAG_ANIMATION;
    }
    if metadata.icc_profile.is_some() {
        flags |= FLAG_ICC;
    }
    if metadata.exif.is_some() {
        flags |= FLAG_EXIF;
    }

    let mut vp8x = [0u8; 10];
    vp8x[0] = flags;
    vp8x[4..7].copy_from_slice(&(width - 1).to_le_bytes()[..3]);
    vp8x[7..10].copy_from_slice(&(height - 1).to_le_bytes()[..3]);

    let mut body = Vec::with_capacity(webp.len() + 64);
    body.extend_from_slice(b"WEBP");
    write_chunk(&mut body, b"VP8X", &vp8x);
    if let Some(icc) = &metadata.icc_profile {
        write_chunk(&mut body, b"ICCP", icc);
    }
    for chunk in chunks.iter().filter(|c| !is_metadata_chunk(c)) {
        write_chunk(&mut body, &chunk.fourcc, chunk.payload);
    }
    if let Some(exif) = &metadata.exif {
        write_chunk(&mut body, b"EXIF", exif);
    }

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len(body.len())?.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Chunks replaced by [`embed_metadata`] rather than copied through.
fn is_metadata_chunk(chunk: &Chunk) -> bool {
    matches!(&chunk.fourcc, b"VP8X" | b"ICCP" | b"EXIF" | b"XMP ")
}

fn parse_chunks(webp: &[u8]) -> Result<Vec<Chunk<'_>>, BackendError> {
    if webp.len() < 12 || &webp[0..4] != b"RIFF" || &webp[8..12] != b"WEBP" {
        return Err(BackendError::Encode("encoder output is not a WebP file".into()));
    }

    let mut chunks = Vec::new();
    let mut rest = &webp[12..];
    while !rest.is_empty() {
        if rest.len() < 8 {
            return Err(BackendError::Encode("truncated WebP chunk header".into()));
        }
        let fourcc = [rest[0], rest[1], rest[2], rest[3]];
        let size = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let end = 8 + size;
        if rest.len() < end {
            return Err(BackendError::Encode(format!(
                "WebP chunk {} overruns the file",
                String::from_utf8_lossy(&fourcc)
            )));
        }
        chunks.push(Chunk {
            fourcc,
            payload: &rest[8..end],
        });
        // Odd-sized payloads carry one byte of padding
        let padded = (end + (size & 1)).min(rest.len());
        rest = &rest[padded..];
    }
    Ok(chunks)
}

fn has_alpha(chunks: &[Chunk]) -> bool {
    chunks.iter().any(|c| match &c.fourcc {
        b"ALPH" => true,
        b"VP8X" => c.payload.first().is_some_and(|f| f & FLAG_ALPHA != 0),
        // VP8L header: 0x2f, then 14+14 bits of size, then the alpha_is_used bit
        b"VP8L" if c.payload.len() >= 5 => {
            let bits =
                u32::from_le_bytes([c.payload[1], c.payload[2], c.payload[3], c.payload[4]]);
            (bits >> 28) & 1 == 1
        }
        _ => false,
    })
}

fn is_animated(chunks: &[Chunk]) -> bool {
    chunks.iter().any(|c| match &c.fourcc {
        b"ANIM" => true,
        b"VP8X" => c.payload.first().is_some_and(|f| f & FLAG_ANIMATION != 0),
        _ => false,
    })
}

fn write_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) {
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
}

fn riff_len(len: usize) -> Result<u32, BackendError> {
    u32::try_from(len).map_err(|_| BackendError::Encode("WebP file exceeds 4 GiB".into()))
}
