//! Gzip decompression seam.
//!
//! Shard files are usually served gzip-compressed. The manager sniffs the
//! two-byte gzip magic and hands compressed buffers to a [`Gunzip`]
//! implementation; [`FlateGunzip`] is the default, [`NoGunzip`] slots in
//! where compressed shards are not expected.

use std::io::Read;

/// Leading bytes of a gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// True when the buffer starts with the gzip magic.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == GZIP_MAGIC[0] && data[1] == GZIP_MAGIC[1]
}

/// Errors from gzip decompression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GzipError {
    /// This build has no decompressor wired in.
    #[error("gzip support unavailable")]
    Unavailable,
    /// The stream is not valid gzip data.
    #[error("gzip decompression failed: {0}")]
    Corrupt(String),
}

/// Decompression collaborator.
pub trait Gunzip: Send + Sync {
    /// Decompress a full gzip stream into its plain bytes.
    fn gunzip(&self, data: &[u8]) -> Result<Vec<u8>, GzipError>;
}

/// Default decompressor backed by flate2.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlateGunzip;

impl Gunzip for FlateGunzip {
    fn gunzip(&self, data: &[u8]) -> Result<Vec<u8>, GzipError> {
        let mut decoder = flate2::read::GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| GzipError::Corrupt(e.to_string()))?;
        Ok(out)
    }
}

/// Stand-in that reports gzip as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGunzip;

impl Gunzip for NoGunzip {
    fn gunzip(&self, _data: &[u8]) -> Result<Vec<u8>, GzipError> {
        Err(GzipError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_gzip_sniff() {
        assert!(is_gzip(&[0x1F, 0x8B, 0x08]));
        assert!(!is_gzip(&[0x1F]));
        assert!(!is_gzip(b"STRI\x07"));
        assert!(!is_gzip(&[]));
    }

    #[test]
    fn test_flate_round_trip() {
        let plain = b"shard bytes shard bytes shard bytes";
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(plain).unwrap();
        let compressed = encoder.finish().unwrap();

        assert!(is_gzip(&compressed));
        assert_eq!(FlateGunzip.gunzip(&compressed).unwrap(), plain);
    }

    #[test]
    fn test_flate_rejects_garbage() {
        let err = FlateGunzip.gunzip(&[0x1F, 0x8B, 0xFF, 0x00, 0x01]).unwrap_err();
        assert!(matches!(err, GzipError::Corrupt(_)));
    }

    #[test]
    fn test_no_gunzip_reports_unavailable() {
        assert_eq!(NoGunzip.gunzip(&[0x1F, 0x8B]), Err(GzipError::Unavailable));
    }
}
