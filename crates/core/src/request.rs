//! Media request path parsing.
//!
//! Grammar: `/media/m{id}s{width}x{height}z(-{command})?.{jpg|png}(.webp)?`

use crate::media::{ImageFormat, MediaId};

const PATH_PREFIX: &str = "/media/";
const WEBP_SUFFIX: &str = ".webp";

/// A request for an image derivative, decoded from its path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRequest {
    pub media_id: MediaId,
    pub natural_width: u32,
    pub natural_height: u32,
    /// Raw command token; validated when the plan is built.
    pub command: Option<String>,
    /// Base format of the source (`jpg` or `png`).
    pub format: ImageFormat,
    /// Whether a `.webp` rendition was requested on top of the base format.
    pub webp: bool,
}

impl MediaRequest {
    /// Parse a request path.
    pub fn parse(path: &str) -> crate::Result<Self> {
        let invalid = |reason: &str| crate::Error::InvalidPath(format!("{reason}: {path}"));

        let rest = path
            .strip_prefix(PATH_PREFIX)
            .ok_or_else(|| invalid("must start with /media/"))?;

        if !rest.is_ascii() {
            return Err(invalid("contains non-ASCII characters"));
        }

        let (rest, webp) = match rest.strip_suffix(WEBP_SUFFIX) {
            Some(stripped) => (stripped, true),
            None => (rest, false),
        };

        let (stem, ext) = rest
            .rsplit_once('.')
            .ok_or_else(|| invalid("missing extension"))?;
        let format = match ImageFormat::from_extension(ext) {
            Some(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
            _ => return Err(invalid("extension must be jpg or png")),
        };

        let (filename, command) = match stem.split_once('-') {
            Some((filename, command)) => {
                if command.is_empty() || !command.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(invalid("command must be alphanumeric"));
                }
                (filename, Some(command.to_string()))
            }
            None => (stem, None),
        };

        let body = filename
            .strip_prefix('m')
            .and_then(|s| s.strip_suffix('z'))
            .ok_or_else(|| invalid("filename must look like m{id}s{w}x{h}z"))?;
        let (id, dims) = body
            .split_once('s')
            .ok_or_else(|| invalid("missing natural size"))?;
        let (width, height) = dims
            .split_once('x')
            .ok_or_else(|| invalid("natural size must be {w}x{h}"))?;

        let media_id = MediaId::new(parse_digits(id).ok_or_else(|| invalid("bad media id"))?)?;
        let natural_width = parse_digits(width).ok_or_else(|| invalid("bad natural width"))?;
        let natural_height = parse_digits(height).ok_or_else(|| invalid("bad natural height"))?;

        Ok(Self {
            media_id,
            natural_width,
            natural_height,
            command,
            format,
            webp,
        })
    }

    /// Un-commanded stem: `m{id}s{w}x{h}z`.
    pub fn filename(&self) -> String {
        format!(
            "m{}s{}x{}z",
            self.media_id, self.natural_width, self.natural_height
        )
    }

    /// File name including the command suffix and base extension.
    pub fn basename(&self) -> String {
        match &self.command {
            Some(command) => format!("{}-{command}.{}", self.filename(), self.format),
            None => format!("{}.{}", self.filename(), self.format),
        }
    }
}

/// Parse a non-empty run of ASCII digits.
fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
