//! Serialized form of a trajectory tree.
//!
//! Segments are listed in pre-order: the root first, then every fork after the
//! segment it forked from. Each non-root entry names its parent by position in
//! the list together with its fork instant. Instants are stored as exact
//! [`InstantMessage`]s so that a reloaded tree has bit-identical sample times.

use serde::{Deserialize, Serialize};

use crate::time::InstantMessage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMessage {
    pub time: InstantMessage,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMessage {
    pub parent: Option<usize>,
    pub fork_time: Option<InstantMessage>,
    pub samples: Vec<SampleMessage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrajectoryMessage {
    pub segments: Vec<SegmentMessage>,
}
