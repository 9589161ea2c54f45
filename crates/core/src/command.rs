//! Compact transform commands (`w300`, `h900a169`, ...).
//!
//! A command names a direction (`w` or `h`), a rung of the fixed size ladder
//! and, optionally, an aspect tag. Without an aspect only the named axis is
//! resolved; with one, both axes come from the aspect table and the direction
//! decides which of the pair lands on which axis.

use std::fmt;

/// Allowed command sizes, ascending.
pub const LADDER: [u32; 7] = [100, 300, 600, 900, 1200, 1500, 1800];

/// Axis named by a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Width,
    Height,
}

impl Direction {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'w' => Some(Self::Width),
            'h' => Some(Self::Height),
            _ => None,
        }
    }

    /// Single-letter form used in command tokens.
    pub fn as_char(self) -> char {
        match self {
            Self::Width => 'w',
            Self::Height => 'h',
        }
    }
}

/// Enumerated aspect ratios accepted after the `a` marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AspectTag {
    /// 1:1
    Square,
    /// 2:1
    TwoOne,
    /// 32:45 portrait
    Portrait3245,
    /// 36:10 banner
    Banner3610,
    /// 21:9
    Wide219,
    /// 16:9
    Wide169,
    /// 1.91:1 (social cards)
    Card1911,
    /// 4:3
    Classic43,
}

impl AspectTag {
    const ALL: [AspectTag; 8] = [
        Self::Square,
        Self::TwoOne,
        Self::Portrait3245,
        Self::Banner3610,
        Self::Wide219,
        Self::Wide169,
        Self::Card1911,
        Self::Classic43,
    ];

    /// Parse the digits following `a`.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// Digits as they appear in command tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "11",
            Self::TwoOne => "21",
            Self::Portrait3245 => "3245",
            Self::Banner3610 => "3610",
            Self::Wide219 => "219",
            Self::Wide169 => "169",
            Self::Card1911 => "1911",
            Self::Classic43 => "43",
        }
    }

    /// Look up the `(primary, secondary)` pixel pair for a ladder size.
    ///
    /// Returns `None` for sizes outside the ladder.
    pub fn resolve(self, size: u32) -> Option<(u32, u32)> {
        let rung = LADDER.iter().position(|&s| s == size)?;
        let pair = match self {
            Self::Square => (size, size),
            Self::TwoOne => (size, size / 2),
            Self::Portrait3245 => PORTRAIT_3245[rung],
            Self::Banner3610 => BANNER_3610[rung],
            Self::Wide219 => WIDE_219[rung],
            Self::Wide169 => WIDE_169[rung],
            Self::Card1911 => CARD_1911[rung],
            Self::Classic43 => CLASSIC_43[rung],
        };
        Some(pair)
    }
}

// Rows are indexed by ladder rung.
const PORTRAIT_3245: [(u32, u32); 7] = [
    (160, 225),
    (320, 450),
    (640, 900),
    (960, 1350),
    (1280, 1800),
    // Older tables listed 1600x1000 here. Every other row is exactly 32:45.
    (1600, 2250),
    (1920, 2700),
];
const BANNER_3610: [(u32, u32); 7] = [
    (360, 100),
    (432, 120),
    (648, 180),
    (1080, 300),
    (1260, 350),
    (1620, 450),
    (1980, 550),
];
const WIDE_219: [(u32, u32); 7] = [
    (210, 90),
    (350, 150),
    (630, 270),
    (980, 420),
    (1260, 540),
    (1540, 660),
    (1820, 780),
];
const WIDE_169: [(u32, u32); 7] = [
    (96, 54),
    (320, 180),
    (640, 360),
    (960, 540),
    (1280, 720),
    (1600, 900),
    (1920, 1080),
];
const CARD_1911: [(u32, u32); 7] = [
    (191, 100),
    (320, 168),
    (640, 335),
    (960, 502),
    (1280, 670),
    (1600, 838),
    (1920, 1005),
];
const CLASSIC_43: [(u32, u32); 7] = [
    (120, 90),
    (320, 240),
    (640, 480),
    (960, 720),
    (1280, 960),
    (1600, 1200),
    (1800, 1350),
];

/// Resolved pixel dimensions, expressed relative to the command direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Size along the command direction.
    pub primary: u32,
    /// Size along the other axis; `None` in single-axis mode.
    pub secondary: Option<u32>,
}

/// A parsed transform command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    direction: Direction,
    size: u32,
    aspect: Option<AspectTag>,
    dimensions: Dimensions,
}

impl Command {
    /// Parse a command token such as `w300` or `h900a169`.
    pub fn parse(token: &str) -> crate::Result<Self> {
        let invalid = || crate::Error::InvalidCommand(token.to_string());

        let mut chars = token.chars();
        let direction = chars
            .next()
            .and_then(Direction::from_char)
            .ok_or_else(invalid)?;
        let rest = chars.as_str();

        let (size_str, aspect_str) = match rest.split_once('a') {
            Some((size, aspect)) => (size, Some(aspect)),
            None => (rest, None),
        };

        // Exact match against the ladder rejects leading zeros and signs.
        let size = LADDER
            .into_iter()
            .find(|s| s.to_string() == size_str)
            .ok_or_else(invalid)?;

        let aspect = match aspect_str {
            Some(tag) => Some(AspectTag::parse(tag).ok_or_else(invalid)?),
            None => None,
        };

        Self::new(direction, size, aspect)
    }

    /// Build a command from parts, resolving its dimensions.
    pub fn new(direction: Direction, size: u32, aspect: Option<AspectTag>) -> crate::Result<Self> {
        let dimensions = match aspect {
            None => {
                if !LADDER.contains(&size) {
                    return Err(crate::Error::InvalidCommand(format!(
                        "size {size} is not on the ladder"
                    )));
                }
                Dimensions {
                    primary: size,
                    secondary: None,
                }
            }
            Some(tag) => {
                let (primary, secondary) = tag.resolve(size).ok_or_else(|| {
                    crate::Error::InvalidCommand(format!("size {size} is not on the ladder"))
                })?;
                Dimensions {
                    primary,
                    secondary: Some(secondary),
                }
            }
        };

        Ok(Self {
            direction,
            size,
            aspect,
            dimensions,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The ladder rung named in the token (not necessarily a pixel size).
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn aspect(&self) -> Option<AspectTag> {
        self.aspect
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Resolved width, if any.
    pub fn width(&self) -> Option<u32> {
        match self.direction {
            Direction::Width => Some(self.dimensions.primary),
            Direction::Height => self.dimensions.secondary,
        }
    }

    /// Resolved height, if any.
    pub fn height(&self) -> Option<u32> {
        match self.direction {
            Direction::Width => self.dimensions.secondary,
            Direction::Height => Some(self.dimensions.primary),
        }
    }

    /// Whether only one axis is constrained.
    pub fn is_single_axis(&self) -> bool {
        self.dimensions.secondary.is_none()
    }

    /// The same command at another ladder rung.
    pub fn with_size(&self, size: u32) -> crate::Result<Self> {
        Self::new(self.direction, size, self.aspect)
    }

    /// Canonical token, e.g. `h900a169`.
    pub fn token(&self) -> String {
        self.to_string()
    }

    /// Aspect suffix as it appears in tokens (`a169`), or empty.
    pub fn aspect_suffix(&self) -> String {
        self.aspect
            .map(|tag| format!("a{}", tag.as_str()))
            .unwrap_or_default()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.direction.as_char(),
            self.size,
            self.aspect_suffix()
        )
    }
}
