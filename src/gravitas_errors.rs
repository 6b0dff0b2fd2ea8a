use thiserror::Error;

use crate::time::Instant;

#[derive(Error, Debug, Clone)]
pub enum GravitasError {
    #[error("Append out of order: {time:?} is not after the last sample {last:?}")]
    OutOfOrder { time: Instant, last: Instant },

    #[error("Append at existing time: {0:?}")]
    DuplicateTime(Instant),

    #[error("Nonexistent time {0:?} in trajectory")]
    NonexistentTime(Instant),

    #[error("Segment is not a child of the given segment")]
    NotAChild,

    #[error("Empty trajectory")]
    Empty,

    #[error("Trajectory already has an intrinsic acceleration")]
    AlreadySet,

    #[error("Intrinsic acceleration is only allowed on a massless body")]
    WrongBodyKind,

    #[error("Adaptive step size underflow at {time:?} (step {step} s)")]
    Divergence { time: Instant, step: f64 },

    #[error("Unresolved body index in message: {0}")]
    UnresolvedReference(usize),

    #[error("Operation is only valid on the root of the trajectory")]
    NotRoot,

    #[error("Segment handle refers to a deleted segment")]
    DanglingSegment,

    #[error("Instant {time:?} is not covered by [{t_min:?}, {t_max:?}]")]
    NotCovered {
        time: Instant,
        t_min: Instant,
        t_max: Instant,
    },

    #[error("Invalid body definition: {0}")]
    InvalidBody(String),

    #[error("Body {0} has no rotation state")]
    BodyIsNotRotating(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Reference bodies do not define a basis at {0:?}")]
    DegenerateFrame(Instant),
}

impl PartialEq for GravitasError {
    fn eq(&self, other: &Self) -> bool {
        use GravitasError::*;
        match (self, other) {
            (OutOfOrder { time: a, last: b }, OutOfOrder { time: c, last: d }) => a == c && b == d,
            (DuplicateTime(a), DuplicateTime(b)) => a == b,
            (NonexistentTime(a), NonexistentTime(b)) => a == b,
            (UnresolvedReference(a), UnresolvedReference(b)) => a == b,
            (InvalidBody(a), InvalidBody(b)) => a == b,
            (BodyIsNotRotating(a), BodyIsNotRotating(b)) => a == b,
            (MalformedMessage(a), MalformedMessage(b)) => a == b,
            (DegenerateFrame(a), DegenerateFrame(b)) => a == b,
            (
                NotCovered {
                    time: a,
                    t_min: b,
                    t_max: c,
                },
                NotCovered {
                    time: d,
                    t_min: e,
                    t_max: f,
                },
            ) => a == d && b == e && c == f,

            // Step size ignored
            (Divergence { .. }, Divergence { .. }) => true,

            // Unit variants
            (NotAChild, NotAChild) => true,
            (Empty, Empty) => true,
            (AlreadySet, AlreadySet) => true,
            (WrongBodyKind, WrongBodyKind) => true,
            (NotRoot, NotRoot) => true,
            (DanglingSegment, DanglingSegment) => true,

            _ => false,
        }
    }
}
