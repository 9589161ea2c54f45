//! Redirect decisions made before a step is generated.
//!
//! A command that asks for more pixels than the source has is redirected
//! instead of upscaled. Single-axis commands fall back to the un-commanded
//! URL; aspect commands step down the ladder to the largest rung that still
//! fits the source.

use prism_core::{DERIVATIVE_MAX_AGE, DerivationStep, Direction, LADDER};

/// What to do with a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Generate,
    /// Abort the request and send the client elsewhere.
    Redirect { path: String, max_age: u64 },
}

/// Decide whether `step` should be generated or redirected.
pub fn decide(step: &DerivationStep) -> Decision {
    let (Some(command), Some(natural), Some(base)) =
        (step.command.as_ref(), step.natural, step.redirect.as_ref())
    else {
        return Decision::Generate;
    };

    if command.is_single_axis() {
        let width_overflow = command.width().is_some_and(|w| w > natural.width);
        let height_overflow = command.height().is_some_and(|h| h > natural.height);
        if width_overflow || height_overflow {
            return Decision::Redirect {
                path: base.origin_path(),
                max_age: DERIVATIVE_MAX_AGE,
            };
        }
        return Decision::Generate;
    }

    let size = command.size();
    if size <= LADDER[0] {
        return Decision::Generate;
    }

    let natural_axis = match command.direction() {
        Direction::Width => natural.width,
        Direction::Height => natural.height,
    };
    if size <= natural_axis {
        return Decision::Generate;
    }

    let fallback = LADDER
        .iter()
        .copied()
        .take_while(|&rung| rung != size && rung <= natural_axis)
        .last();

    match fallback.and_then(|rung| command.with_size(rung).ok()) {
        Some(smaller) => Decision::Redirect {
            path: base.command_path(&smaller),
            max_age: DERIVATIVE_MAX_AGE,
        },
        None => Decision::Generate,
    }
}
