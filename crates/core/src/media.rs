//! Media identifiers, image formats and storage key layout.

use std::fmt;

/// Prefix under which uploaded source images live.
pub const SOURCE_PREFIX: &str = "upload/src/media";

/// Prefix under which generated derivatives live.
pub const DERIVATIVE_PREFIX: &str = "dist/image/media";

/// Bucket widths of the four nested shard folders, outermost first.
const SHARD_FACTORS: [u64; 4] = [100_000_000, 1_000_000, 10_000, 100];

/// Largest id whose shard ranges fit in a `u64`.
pub const MAX_MEDIA_ID: u64 = u64::MAX - (SHARD_FACTORS[0] - 1);

/// A positive integer identifying a source asset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(u64);

impl MediaId {
    /// Create from a raw id, rejecting zero and ids above [`MAX_MEDIA_ID`].
    pub fn new(id: u64) -> crate::Result<Self> {
        if id == 0 {
            return Err(crate::Error::InvalidPath(
                "media id must be positive".to_string(),
            ));
        }
        if id > MAX_MEDIA_ID {
            return Err(crate::Error::InvalidPath(format!(
                "media id {id} is too large"
            )));
        }
        Ok(Self(id))
    }

    /// Get the raw id.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Sharded folder for this id, bounding per-directory fanout.
    ///
    /// Each level is the range `[max(1, start), start + factor - 1]` where
    /// `start = floor(id / factor) * factor`.
    pub fn shard_folder(self) -> String {
        SHARD_FACTORS
            .iter()
            .map(|&factor| {
                let start = (self.0 / factor) * factor;
                format!("{}-{}", start.max(1), start + factor - 1)
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Debug for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaId({})", self.0)
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Image formats the engine reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Parse a file extension as it appears in request paths.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used in keys and URLs.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// MIME type stored alongside the object.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Key of the uploaded source for `filename.ext`.
pub fn source_key(id: MediaId, filename: &str, format: ImageFormat) -> String {
    format!(
        "{SOURCE_PREFIX}/{}/{filename}.{}",
        id.shard_folder(),
        format.extension()
    )
}

/// Key of a generated derivative.
pub fn derivative_key(basename: &str) -> String {
    format!("{DERIVATIVE_PREFIX}/{basename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_id_rejects_zero() {
        assert!(MediaId::new(0).is_err());
        assert_eq!(MediaId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn test_shard_folder_small_id_clamps_lower_bounds() {
        let id = MediaId::new(12345).unwrap();
        assert_eq!(
            id.shard_folder(),
            "1-99999999/1-999999/10000-19999/12300-12399"
        );
    }

    #[test]
    fn test_shard_folder_below_first_bucket() {
        let id = MediaId::new(42).unwrap();
        assert_eq!(id.shard_folder(), "1-99999999/1-999999/1-9999/1-99");
    }

    #[test]
    fn test_shard_folder_large_id() {
        let id = MediaId::new(234_567_890).unwrap();
        assert_eq!(
            id.shard_folder(),
            "200000000-299999999/234000000-234999999/234560000-234569999/234567800-234567899"
        );
    }

    #[test]
    fn test_media_id_rejects_ids_past_shard_range() {
        assert!(MediaId::new(u64::MAX).is_err());
        assert!(MediaId::new(MAX_MEDIA_ID + 1).is_err());

        let id = MediaId::new(MAX_MEDIA_ID).unwrap();
        assert_eq!(
            id.shard_folder(),
            "18446744073600000000-18446744073699999999/\
             18446744073609000000-18446744073609999999/\
             18446744073609550000-18446744073609559999/\
             18446744073609551600-18446744073609551699"
        );
    }

    #[test]
    fn test_source_key_layout() {
        let id = MediaId::new(123).unwrap();
        assert_eq!(
            source_key(id, "m123s640x480z", ImageFormat::Png),
            "upload/src/media/1-99999999/1-999999/1-9999/100-199/m123s640x480z.png"
        );
    }

    #[test]
    fn test_format_mapping() {
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpeg"), None);
        assert_eq!(ImageFormat::Webp.mime_type(), "image/webp");
        assert_eq!(ImageFormat::Png.to_string(), "png");
    }
}
