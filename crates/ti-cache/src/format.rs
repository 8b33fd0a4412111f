//! On-disk leadfield cache file format: a small header (fingerprint
//! digest, electrode and node counts, CRC32 over the body) followed by
//! the raw row data, adapting the teacher's WAL entry framing (`volt-db`'s
//! `[len][payload][crc32]`) to one large write instead of a stream of
//! small appends — a leadfield build is a single atomic artifact, not a
//! log.
//!
//! ## Layout
//!
//! ```text
//! [magic: 4 bytes "TILC"][version: u16][fingerprint_digest: u32]
//! [electrode_count: u32][node_count: u32][body_len: u64][crc32: u32]
//! [body: electrode_count * (label_len: u16, label bytes, 3 * node_count f64)]
//! ```

use crc32fast::Hasher;

use crate::fingerprint::Fingerprint;
use crate::leadfield::Leadfield;
use ti_core::error::{Result, TiError};
use ti_core::field::{Domain, FieldSample};
use ti_core::simulation::VectorField;

const MAGIC: &[u8; 4] = b"TILC";
const VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4 + 4 + 4 + 8 + 4;

fn corrupt(fingerprint: &Fingerprint, reason: impl Into<String>) -> TiError {
    TiError::CacheCorrupt { fingerprint: fingerprint.file_name(), reason: reason.into() }
}

/// Serializes a leadfield with an embedded integrity header.
pub fn write_cache_file(fingerprint: &Fingerprint, leadfield: &Leadfield) -> Vec<u8> {
    let node_count = leadfield.domain.len();

    let mut body = Vec::new();
    for (label, row) in leadfield.electrode_labels.iter().zip(leadfield.rows.iter()) {
        let label_bytes = label.as_bytes();
        body.extend_from_slice(&(label_bytes.len() as u16).to_le_bytes());
        body.extend_from_slice(label_bytes);
        for v in row.x.values.iter().chain(row.y.values.iter()).chain(row.z.values.iter()) {
            body.extend_from_slice(&v.to_le_bytes());
        }
    }

    let mut hasher = Hasher::new();
    hasher.update(&body);
    let crc = hasher.finalize();

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&fingerprint.digest().to_le_bytes());
    out.extend_from_slice(&(leadfield.electrode_labels.len() as u32).to_le_bytes());
    out.extend_from_slice(&(node_count as u32).to_le_bytes());
    out.extend_from_slice(&(body.len() as u64).to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// Parses a cache file, verifying it belongs to `fingerprint` and that its
/// CRC32 matches before trusting a single byte of the payload — a stale or
/// foreign file on disk fails closed with `TiError::CacheCorrupt` rather
/// than silently loading whatever bytes happen to be there.
pub fn read_cache_file(fingerprint: &Fingerprint, bytes: &[u8]) -> Result<Leadfield> {
    if bytes.len() < HEADER_LEN {
        return Err(corrupt(fingerprint, "file shorter than cache header"));
    }
    if &bytes[0..4] != MAGIC {
        return Err(corrupt(fingerprint, "bad magic bytes"));
    }
    let version = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
    if version != VERSION {
        return Err(corrupt(fingerprint, format!("unsupported cache file version {version}")));
    }
    let stored_digest = u32::from_le_bytes(bytes[6..10].try_into().unwrap());
    if stored_digest != fingerprint.digest() {
        return Err(corrupt(fingerprint, "fingerprint digest in file does not match requested fingerprint"));
    }
    let electrode_count = u32::from_le_bytes(bytes[10..14].try_into().unwrap()) as usize;
    let node_count = u32::from_le_bytes(bytes[14..18].try_into().unwrap()) as usize;
    let body_len = u64::from_le_bytes(bytes[18..26].try_into().unwrap()) as usize;
    let stored_crc = u32::from_le_bytes(bytes[26..30].try_into().unwrap());

    let body = bytes.get(HEADER_LEN..HEADER_LEN + body_len).ok_or_else(|| corrupt(fingerprint, "truncated body"))?;

    let mut hasher = Hasher::new();
    hasher.update(body);
    if hasher.finalize() != stored_crc {
        return Err(corrupt(fingerprint, "CRC32 mismatch — cache file is corrupt"));
    }

    let domain = Domain::Mesh { len: node_count };
    let mut electrode_labels = Vec::with_capacity(electrode_count);
    let mut rows = Vec::with_capacity(electrode_count);
    let mut pos = 0usize;

    for _ in 0..electrode_count {
        let label_len = body
            .get(pos..pos + 2)
            .map(|s| u16::from_le_bytes(s.try_into().unwrap()) as usize)
            .ok_or_else(|| corrupt(fingerprint, "truncated label length"))?;
        pos += 2;
        let label_bytes = body.get(pos..pos + label_len).ok_or_else(|| corrupt(fingerprint, "truncated label"))?;
        let label = String::from_utf8(label_bytes.to_vec()).map_err(|_| corrupt(fingerprint, "label is not valid UTF-8"))?;
        pos += label_len;

        let mut axis = |pos: &mut usize| -> Result<Vec<f64>> {
            let mut values = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                let bytes = body.get(*pos..*pos + 8).ok_or_else(|| corrupt(fingerprint, "truncated row data"))?;
                values.push(f64::from_le_bytes(bytes.try_into().unwrap()));
                *pos += 8;
            }
            Ok(values)
        };
        let x = axis(&mut pos)?;
        let y = axis(&mut pos)?;
        let z = axis(&mut pos)?;

        electrode_labels.push(label);
        rows.push(VectorField {
            x: FieldSample::new_nodal(domain, x)?,
            y: FieldSample::new_nodal(domain, y)?,
            z: FieldSample::new_nodal(domain, z)?,
        });
    }

    Ok(Leadfield { electrode_labels, rows, domain })
}
