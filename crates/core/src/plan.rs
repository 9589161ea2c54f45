//! Derivation plans: the ordered chain of steps that materialize a request.
//!
//! Every plan starts with the origin copy. A command adds a sized variant fed
//! from the origin copy, and a `.webp` suffix adds a WebP rendition fed from
//! whichever step precedes it. The last step is terminal: once its object
//! exists, the whole chain exists, because steps are generated strictly in
//! order and deterministically.

use crate::command::Command;
use crate::media::{self, ImageFormat};
use crate::request::MediaRequest;

/// Position of a step in the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Copy of the uploaded source into the derivative namespace.
    Origin,
    /// Resized/cropped variant described by a command.
    Command,
    /// WebP rendition of the previous step.
    Webp,
}

impl Stage {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Command => "command",
            Self::Webp => "webp",
        }
    }
}

/// Natural pixel size of the source asset, as declared in the request path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NaturalSize {
    pub width: u32,
    pub height: u32,
}

/// Pieces of a redirect path surrounding an optional command token.
///
/// The un-commanded URL is `prefix + suffix`; a command variant is
/// `prefix + "-" + token + suffix`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectBase {
    /// `media/{filename}`
    pub prefix: String,
    /// `.{ext}` plus `.webp` when requested.
    pub suffix: String,
}

impl RedirectBase {
    /// Path of the un-commanded asset.
    pub fn origin_path(&self) -> String {
        format!("{}{}", self.prefix, self.suffix)
    }

    /// Path of a command variant.
    pub fn command_path(&self, command: &Command) -> String {
        format!("{}-{command}{}", self.prefix, self.suffix)
    }
}

/// One unit of the derivation chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationStep {
    pub stage: Stage,
    pub source_key: String,
    pub destination_key: String,
    /// Format written to the destination.
    pub format: ImageFormat,
    /// Cache lifetime in seconds stored with the object.
    pub max_age: u64,
    pub terminal: bool,
    pub command: Option<Command>,
    /// Present only where redirect checks apply.
    pub natural: Option<NaturalSize>,
    pub redirect: Option<RedirectBase>,
}

impl DerivationStep {
    /// Target `(width, height)` for resizing, if this step resizes.
    ///
    /// WebP renditions never resize; they re-encode their source as-is.
    pub fn resize_target(&self) -> Option<(Option<u32>, Option<u32>)> {
        if self.stage == Stage::Webp {
            return None;
        }
        self.command.map(|cmd| (cmd.width(), cmd.height()))
    }

    /// Whether the step requested explicit dimensions.
    pub fn has_dimensions(&self) -> bool {
        self.command.is_some()
    }
}

/// Ordered chain of one to three steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivationPlan {
    steps: Vec<DerivationStep>,
}

impl DerivationPlan {
    /// Build the plan for a parsed request.
    ///
    /// Fails when the request carries a malformed command.
    pub fn build(request: &MediaRequest) -> crate::Result<Self> {
        let command = request.command.as_deref().map(Command::parse).transpose()?;

        let filename = request.filename();
        let ext = request.format.extension();
        let redirect = RedirectBase {
            prefix: format!("media/{filename}"),
            suffix: if request.webp {
                format!(".{ext}.webp")
            } else {
                format!(".{ext}")
            },
        };

        let mut steps = Vec::with_capacity(3);

        let origin_key = media::derivative_key(&format!("{filename}.{ext}"));
        steps.push(DerivationStep {
            stage: Stage::Origin,
            source_key: media::source_key(request.media_id, &filename, request.format),
            destination_key: origin_key.clone(),
            format: request.format,
            max_age: crate::DERIVATIVE_MAX_AGE,
            terminal: false,
            command: None,
            natural: None,
            redirect: None,
        });

        if let Some(command) = command {
            steps.push(DerivationStep {
                stage: Stage::Command,
                source_key: origin_key,
                destination_key: media::derivative_key(&request.basename()),
                format: request.format,
                max_age: crate::DERIVATIVE_MAX_AGE,
                terminal: false,
                command: Some(command),
                natural: Some(NaturalSize {
                    width: request.natural_width,
                    height: request.natural_height,
                }),
                redirect: Some(redirect.clone()),
            });
        }

        if request.webp {
            let source_key = steps
                .last()
                .map(|step| step.destination_key.clone())
                .unwrap_or_default();
            steps.push(DerivationStep {
                stage: Stage::Webp,
                destination_key: format!("{source_key}.webp"),
                source_key,
                format: ImageFormat::Webp,
                max_age: crate::DERIVATIVE_MAX_AGE,
                terminal: false,
                command,
                natural: None,
                redirect: Some(redirect),
            });
        }

        if let Some(last) = steps.last_mut() {
            last.terminal = true;
        }

        Ok(Self { steps })
    }

    /// Build a plan from explicit steps.
    pub fn from_steps(steps: Vec<DerivationStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<DerivationStep> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The terminal step, whose object is what the client ultimately receives.
    pub fn terminal(&self) -> Option<&DerivationStep> {
        self.steps.last()
    }
}
