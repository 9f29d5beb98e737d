//! On-disk cache envelope (§6 "Cache file"): "gzipped envelope containing a
//! magic string, a small version integer, a timestamp, a checksum, and the
//! serialized graph. Read back is validated by magic and version ... the
//! cache's invalidation policy compares its timestamp against the
//! modification times of any supplied source files."
//!
//! Deliberately decoupled from `tg-serializer`: this module only knows how
//! to wrap/unwrap an opaque byte payload (the serializer's JSON output) in
//! the envelope, checksum it, and gzip it. `tg-cli` is what hands it real
//! bytes and real source file mtimes.

use std::io::{Read, Write};
use std::time::SystemTime;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tg_common::{CACHE_MAGIC, CACHE_VERSION};

#[derive(Debug)]
pub enum CacheError {
    /// File doesn't start with the expected magic bytes - not a cache file
    /// at all, or from an entirely different tool.
    BadMagic,
    /// Magic matched but the version integer is one this build doesn't
    /// know how to read.
    UnsupportedVersion(u32),
    /// Envelope header truncated or checksum didn't match the payload.
    Corrupt(&'static str),
    Io(std::io::Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::BadMagic => write!(f, "not a typegraph cache file (bad magic)"),
            CacheError::UnsupportedVersion(v) => write!(f, "unsupported cache version {v}"),
            CacheError::Corrupt(why) => write!(f, "corrupt cache envelope: {why}"),
            CacheError::Io(err) => write!(f, "cache I/O error: {err}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(err)
    }
}

/// A cache file once its header has been parsed and its payload
/// decompressed and checksum-verified.
pub struct CacheEnvelope {
    pub version: u32,
    /// Unix seconds at the time the cache was written.
    pub timestamp: u64,
    pub payload: Vec<u8>,
}

const HEADER_LEN: usize = CACHE_MAGIC.len() + 4 + 8 + 8;

fn checksum(payload: &[u8]) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    payload.hash(&mut hasher);
    hasher.finish()
}

/// Builds the full on-disk envelope: header (magic, version, timestamp,
/// checksum) followed by the gzip-compressed `payload`.
pub fn write(payload: &[u8], timestamp: SystemTime) -> Result<Vec<u8>, CacheError> {
    let timestamp = timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|_| CacheError::Corrupt("timestamp before unix epoch"))?
        .as_secs();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    let compressed = encoder.finish()?;

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(CACHE_MAGIC);
    out.extend_from_slice(&CACHE_VERSION.to_le_bytes());
    out.extend_from_slice(&timestamp.to_le_bytes());
    out.extend_from_slice(&checksum(payload).to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Validates magic and version, decompresses the payload, and checks its
/// checksum. Does not itself decide staleness - see [`is_stale`].
pub fn read(bytes: &[u8]) -> Result<CacheEnvelope, CacheError> {
    if bytes.len() < HEADER_LEN {
        return Err(CacheError::Corrupt("file shorter than envelope header"));
    }
    let (magic, rest) = bytes.split_at(CACHE_MAGIC.len());
    if magic != CACHE_MAGIC {
        return Err(CacheError::BadMagic);
    }
    let (version_bytes, rest) = rest.split_at(4);
    let version = u32::from_le_bytes(version_bytes.try_into().expect("checked length"));
    if version != CACHE_VERSION {
        return Err(CacheError::UnsupportedVersion(version));
    }
    let (timestamp_bytes, rest) = rest.split_at(8);
    let timestamp = u64::from_le_bytes(timestamp_bytes.try_into().expect("checked length"));
    let (checksum_bytes, compressed) = rest.split_at(8);
    let expected_checksum = u64::from_le_bytes(checksum_bytes.try_into().expect("checked length"));

    let mut decoder = GzDecoder::new(compressed);
    let mut payload = Vec::new();
    decoder
        .read_to_end(&mut payload)
        .map_err(|_| CacheError::Corrupt("gzip stream truncated or invalid"))?;

    if checksum(&payload) != expected_checksum {
        return Err(CacheError::Corrupt("checksum mismatch"));
    }

    Ok(CacheEnvelope {
        version,
        timestamp,
        payload,
    })
}

/// Whether a cache written at `cache_timestamp` is stale with respect to
/// `source_mtimes` - any source file modified at or after the cache was
/// written invalidates it.
pub fn is_stale(cache_timestamp: u64, source_mtimes: impl IntoIterator<Item = SystemTime>) -> bool {
    source_mtimes.into_iter().any(|mtime| {
        let mtime_secs = mtime
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(u64::MAX);
        mtime_secs >= cache_timestamp
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn round_trips_a_payload() {
        let payload = br#"{"types":[],"values":[],"packages":[]}"#;
        let now = SystemTime::now();
        let bytes = write(payload, now).expect("write should succeed");
        let envelope = read(&bytes).expect("read should succeed");
        assert_eq!(envelope.version, CACHE_VERSION);
        assert_eq!(envelope.payload, payload);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; HEADER_LEN + 4];
        bytes[0] = b'X';
        assert!(matches!(read(&bytes), Err(CacheError::BadMagic)));
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(matches!(read(&[1, 2, 3]), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn detects_checksum_mismatch_after_corruption() {
        let payload = b"some graph payload";
        let mut bytes = write(payload, SystemTime::now()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(read(&bytes), Err(CacheError::Corrupt(_)) | Err(CacheError::BadMagic)));
    }

    #[test]
    fn stale_when_a_source_file_is_newer_than_the_cache() {
        let cache_time = SystemTime::now();
        let cache_secs = cache_time
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let older = cache_time - Duration::from_secs(60);
        let newer = cache_time + Duration::from_secs(60);

        assert!(!is_stale(cache_secs, vec![older]));
        assert!(is_stale(cache_secs, vec![newer]));
    }
}
