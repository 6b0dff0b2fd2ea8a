//! # Forking trajectory store
//!
//! A [`DiscreteTrajectory`] is a tree of *segments*. Every segment owns a strictly
//! increasing series of samples (instant → degrees of freedom) and the list of its
//! child forks. A fork is created at an existing sample of its parent, its *fork
//! instant*, and shares all of the parent's history up to and including that
//! instant without copying it. Samples after the fork instant are copied into the
//! fork, which starts out reading the same series as the segment it was forked from.
//!
//! ## Overview
//!
//! Segments live in an arena owned by the tree; callers hold [`SegmentId`] handles.
//! A handle carries a generation counter, so a handle to a deleted segment is
//! detected and rejected with [`GravitasError::DanglingSegment`] instead of
//! silently addressing a recycled slot.
//!
//! The logical series of a segment is resolved lazily by walking its ancestor
//! chain: every ancestor contributes its own samples up to the fork instant of the
//! next segment down the chain. Reads cost O(depth + visible samples), forks
//! O(depth + copied samples).
//!
//! ## Truncation
//!
//! * [`DiscreteTrajectory::forget_after`] drops the samples of one segment after an
//!   instant, together with the forks taken after it. A fork truncated before its
//!   fork instant is moved down to that instant.
//! * [`DiscreteTrajectory::forget_before`] is only valid on the root. It drops the
//!   samples before an instant. Forks taken strictly before that instant lose the
//!   history they depend on: they are deleted with their subtree and their handles
//!   become dangling. Forks taken exactly at the instant survive.
//!
//! ## Intrinsic acceleration
//!
//! Each segment of a massless body's trajectory may carry one non-gravitational
//! acceleration, a pure function of time. It is not inherited by forks and is only
//! felt by the segment when it is flowed.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use nalgebra::Vector3;
use tracing::debug;

use crate::body::Body;
use crate::geometry::{Barycentric, DegreesOfFreedom};
use crate::gravitas_errors::GravitasError;
use crate::time::{Instant, InstantMessage};

use super::message::{SampleMessage, SegmentMessage, TrajectoryMessage};

/// Non-gravitational acceleration applied to a massless body, as a function of time.
pub type IntrinsicAcceleration = Box<dyn Fn(Instant) -> Vector3<f64>>;

type Sample = DegreesOfFreedom<Barycentric>;

/// Non-owning handle to a segment of a [`DiscreteTrajectory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentId {
    index: usize,
    generation: u64,
}

struct Segment {
    parent: Option<SegmentId>,
    fork_time: Option<Instant>,
    samples: BTreeMap<Instant, Sample>,
    children: Vec<SegmentId>,
    intrinsic_acceleration: Option<IntrinsicAcceleration>,
}

impl Segment {
    fn new(parent: Option<SegmentId>, fork_time: Option<Instant>) -> Self {
        Segment {
            parent,
            fork_time,
            samples: BTreeMap::new(),
            children: Vec::new(),
            intrinsic_acceleration: None,
        }
    }
}

struct Slot {
    generation: u64,
    segment: Option<Segment>,
}

pub struct DiscreteTrajectory {
    body: Body,
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: SegmentId,
}

impl fmt::Debug for DiscreteTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscreteTrajectory")
            .field("body", &self.body)
            .field("segments", &self.segment_count())
            .field("root", &self.root)
            .finish()
    }
}

impl DiscreteTrajectory {
    /// Create a tree with an empty root segment for `body`.
    pub fn new(body: Body) -> Self {
        let mut trajectory = DiscreteTrajectory {
            body,
            slots: Vec::new(),
            free: Vec::new(),
            root: SegmentId {
                index: 0,
                generation: 0,
            },
        };
        trajectory.root = trajectory.allocate(Segment::new(None, None));
        trajectory
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn root(&self) -> SegmentId {
        self.root
    }

    pub fn is_root(&self, segment: SegmentId) -> bool {
        segment == self.root
    }

    /// Whether `segment` designates a live segment of this tree.
    pub fn contains(&self, segment: SegmentId) -> bool {
        self.segment(segment).is_ok()
    }

    pub fn segment_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.segment.is_some()).count()
    }

    pub fn parent(&self, segment: SegmentId) -> Result<Option<SegmentId>, GravitasError> {
        Ok(self.segment(segment)?.parent)
    }

    /// The instant at which `segment` was forked, `None` for the root.
    pub fn fork_time(&self, segment: SegmentId) -> Result<Option<Instant>, GravitasError> {
        Ok(self.segment(segment)?.fork_time)
    }

    pub fn children(&self, segment: SegmentId) -> Result<&[SegmentId], GravitasError> {
        Ok(&self.segment(segment)?.children)
    }

    /// All live segments, in pre-order from the root.
    pub fn segments(&self) -> Vec<SegmentId> {
        let mut ordered = Vec::new();
        let mut pending = vec![self.root];
        while let Some(current) = pending.pop() {
            if let Ok(segment) = self.segment(current) {
                ordered.push(current);
                pending.extend(segment.children.iter().rev());
            }
        }
        ordered
    }

    /// Append a sample at the end of `segment`.
    ///
    /// Arguments
    /// ---------
    /// * `segment`: the segment to extend.
    /// * `time`: must be after the last sample visible from `segment` (for a fork
    ///   without own samples, its fork instant).
    /// * `degrees_of_freedom`: the state of the body at `time`.
    ///
    /// Return
    /// ----------
    /// * [`GravitasError::DuplicateTime`] if a visible sample exists at `time`,
    ///   [`GravitasError::OutOfOrder`] if `time` is before the last visible sample.
    pub fn append(
        &mut self,
        segment: SegmentId,
        time: Instant,
        degrees_of_freedom: DegreesOfFreedom<Barycentric>,
    ) -> Result<(), GravitasError> {
        if let Some((last, _)) = self.last_sample(segment)? {
            if time <= last {
                if self.evaluate(segment, time)?.is_some() {
                    return Err(GravitasError::DuplicateTime(time));
                }
                return Err(GravitasError::OutOfOrder { time, last });
            }
        }
        self.segment_mut(segment)?
            .samples
            .insert(time, degrees_of_freedom);
        Ok(())
    }

    /// Create a child of the segment owning the sample at `time`.
    ///
    /// `time` may be an own sample of `segment` or one inherited from an ancestor; in
    /// the latter case the fork hangs from the ancestor that owns the sample, so the
    /// fork instant is always a sample of the parent.
    ///
    /// The new fork reads the same series as `segment`: the history up to `time` is
    /// shared with the parent, the samples of `segment` after `time` become the own
    /// samples of the fork. Forking at the last sample copies nothing.
    pub fn fork(&mut self, segment: SegmentId, time: Instant) -> Result<SegmentId, GravitasError> {
        let owner = self.owner_of(segment, time)?;
        let tail: BTreeMap<Instant, Sample> = self
            .degrees_of_freedom(segment)?
            .into_iter()
            .filter(|(sample_time, _)| *sample_time > time)
            .collect();

        let mut forked = Segment::new(Some(owner), Some(time));
        forked.samples = tail;
        let child = self.allocate(forked);
        self.segment_mut(owner)?.children.push(child);
        debug!(?time, ?child, "forked trajectory segment");
        Ok(child)
    }

    /// Delete the immediate child `fork` of `segment` and its whole subtree.
    pub fn delete_fork(&mut self, segment: SegmentId, fork: SegmentId) -> Result<(), GravitasError> {
        let parent = self.segment_mut(segment)?;
        let Some(position) = parent.children.iter().position(|child| *child == fork) else {
            return Err(GravitasError::NotAChild);
        };
        parent.children.remove(position);
        let deleted = self.delete_subtree(fork);
        debug!(?fork, deleted, "deleted trajectory fork");
        Ok(())
    }

    /// Remove the samples of `segment` after `time`, and the forks taken after `time`.
    ///
    /// `time` must be a sample of the root, or a sample visible from a non-root
    /// segment. When `time` precedes the fork instant, the segment loses all of its
    /// own samples and is re-attached as a fork at `time` of the ancestor owning that
    /// sample, so that its series ends at `time`. The handle stays valid.
    pub fn forget_after(&mut self, segment: SegmentId, time: Instant) -> Result<(), GravitasError> {
        let exists = if self.is_root(segment) {
            self.segment(segment)?.samples.contains_key(&time)
        } else {
            self.evaluate(segment, time)?.is_some()
        };
        if !exists {
            return Err(GravitasError::NonexistentTime(time));
        }

        self.segment_mut(segment)?
            .samples
            .retain(|sample_time, _| *sample_time <= time);
        let doomed = self.children_forked(segment, |fork_time| fork_time > time)?;
        self.detach_and_delete(segment, &doomed)?;

        let current = self.segment(segment)?;
        if let (Some(parent), Some(fork_time)) = (current.parent, current.fork_time) {
            if time < fork_time {
                self.reanchor(segment, parent, time)?;
            }
        }
        Ok(())
    }

    /// Move the fork `segment` of `parent` to the ancestor owning the sample at `time`.
    fn reanchor(&mut self, segment: SegmentId, parent: SegmentId, time: Instant) -> Result<(), GravitasError> {
        let owner = self.owner_of(parent, time)?;
        self.segment_mut(parent)?
            .children
            .retain(|child| *child != segment);
        let moved = self.segment_mut(segment)?;
        moved.parent = Some(owner);
        moved.fork_time = Some(time);
        self.segment_mut(owner)?.children.push(segment);
        debug!(?segment, ?time, "re-anchored trajectory fork");
        Ok(())
    }

    /// The segment of the chain of `segment` owning the sample at `time`.
    fn owner_of(&self, segment: SegmentId, time: Instant) -> Result<SegmentId, GravitasError> {
        self.chain(segment)?
            .into_iter()
            .rev()
            .find(|(_, candidate, bound)| {
                visible_at(*bound, time) && candidate.samples.contains_key(&time)
            })
            .map(|(owner, _, _)| owner)
            .ok_or(GravitasError::NonexistentTime(time))
    }

    /// Drop the samples of the root strictly before `time`.
    ///
    /// Forks whose fork instant is strictly before `time` are deleted together with
    /// their subtree.
    pub fn forget_before(&mut self, segment: SegmentId, time: Instant) -> Result<(), GravitasError> {
        if !self.is_root(segment) {
            return Err(GravitasError::NotRoot);
        }
        let root = self.segment_mut(segment)?;
        if !root.samples.contains_key(&time) {
            return Err(GravitasError::NonexistentTime(time));
        }
        root.samples = root.samples.split_off(&time);

        let doomed = self.children_forked(segment, |fork_time| fork_time < time)?;
        if !doomed.is_empty() {
            debug!(?time, invalidated = doomed.len(), "forget_before invalidated forks");
        }
        self.detach_and_delete(segment, &doomed)?;
        Ok(())
    }

    /// Sample at exactly `time` among the samples visible from `segment`.
    pub fn evaluate(
        &self,
        segment: SegmentId,
        time: Instant,
    ) -> Result<Option<DegreesOfFreedom<Barycentric>>, GravitasError> {
        Ok(self
            .chain(segment)?
            .into_iter()
            .rev()
            .filter(|(_, _, bound)| visible_at(*bound, time))
            .find_map(|(_, candidate, _)| candidate.samples.get(&time).copied()))
    }

    pub fn degrees_of_freedom(
        &self,
        segment: SegmentId,
    ) -> Result<Vec<(Instant, DegreesOfFreedom<Barycentric>)>, GravitasError> {
        let chain = self.chain(segment)?;
        Ok(chain
            .iter()
            .flat_map(|(_, candidate, bound)| {
                let visible = match bound {
                    Some(bound) => candidate.samples.range(..=*bound),
                    None => candidate.samples.range(..),
                };
                visible.map(|(time, sample)| (*time, *sample))
            })
            .collect())
    }

    pub fn positions(&self, segment: SegmentId) -> Result<BTreeMap<Instant, Vector3<f64>>, GravitasError> {
        Ok(self
            .degrees_of_freedom(segment)?
            .into_iter()
            .map(|(time, dof)| (time, dof.position))
            .collect())
    }

    pub fn velocities(&self, segment: SegmentId) -> Result<BTreeMap<Instant, Vector3<f64>>, GravitasError> {
        Ok(self
            .degrees_of_freedom(segment)?
            .into_iter()
            .map(|(time, dof)| (time, dof.velocity))
            .collect())
    }

    pub fn times(&self, segment: SegmentId) -> Result<Vec<Instant>, GravitasError> {
        Ok(self
            .degrees_of_freedom(segment)?
            .into_iter()
            .map(|(time, _)| time)
            .collect())
    }

    pub fn len(&self, segment: SegmentId) -> Result<usize, GravitasError> {
        Ok(self
            .chain(segment)?
            .iter()
            .map(|(_, candidate, bound)| match bound {
                Some(bound) => candidate.samples.range(..=*bound).count(),
                None => candidate.samples.len(),
            })
            .sum())
    }

    pub fn is_empty(&self, segment: SegmentId) -> Result<bool, GravitasError> {
        Ok(self.last_sample(segment)?.is_none())
    }

    pub fn last_time(&self, segment: SegmentId) -> Result<Instant, GravitasError> {
        self.last_degrees_of_freedom(segment).map(|(time, _)| time)
    }

    pub fn last_position(&self, segment: SegmentId) -> Result<Vector3<f64>, GravitasError> {
        self.last_degrees_of_freedom(segment)
            .map(|(_, dof)| dof.position)
    }

    pub fn last_velocity(&self, segment: SegmentId) -> Result<Vector3<f64>, GravitasError> {
        self.last_degrees_of_freedom(segment)
            .map(|(_, dof)| dof.velocity)
    }

    pub fn last_degrees_of_freedom(
        &self,
        segment: SegmentId,
    ) -> Result<(Instant, DegreesOfFreedom<Barycentric>), GravitasError> {
        self.last_sample(segment)?.ok_or(GravitasError::Empty)
    }

    /// Attach a non-gravitational acceleration to `segment`.
    ///
    /// Fails with [`GravitasError::WrongBodyKind`] on the trajectory of a massive body
    /// and with [`GravitasError::AlreadySet`] if the segment already has one.
    pub fn set_intrinsic_acceleration(
        &mut self,
        segment: SegmentId,
        acceleration: impl Fn(Instant) -> Vector3<f64> + 'static,
    ) -> Result<(), GravitasError> {
        if !self.body.is_massless() {
            return Err(GravitasError::WrongBodyKind);
        }
        let segment = self.segment_mut(segment)?;
        if segment.intrinsic_acceleration.is_some() {
            return Err(GravitasError::AlreadySet);
        }
        segment.intrinsic_acceleration = Some(Box::new(acceleration));
        Ok(())
    }

    pub fn has_intrinsic_acceleration(&self, segment: SegmentId) -> Result<bool, GravitasError> {
        Ok(self.segment(segment)?.intrinsic_acceleration.is_some())
    }

    pub fn clear_intrinsic_acceleration(&mut self, segment: SegmentId) -> Result<(), GravitasError> {
        self.segment_mut(segment)?.intrinsic_acceleration = None;
        Ok(())
    }

    /// Intrinsic acceleration of `segment` at `time`, zero when unset.
    pub fn evaluate_intrinsic_acceleration(
        &self,
        segment: SegmentId,
        time: Instant,
    ) -> Result<Vector3<f64>, GravitasError> {
        Ok(self
            .segment(segment)?
            .intrinsic_acceleration
            .as_ref()
            .map_or_else(Vector3::zeros, |acceleration| acceleration(time)))
    }

    /// Serialize every live segment with its parent link, fork instant and own samples.
    pub fn write_to_message(&self) -> TrajectoryMessage {
        let ordered = self.segments();
        let segments = ordered
            .iter()
            .filter_map(|id| self.segment(*id).ok())
            .map(|segment| SegmentMessage {
                parent: segment
                    .parent
                    .and_then(|parent| ordered.iter().position(|id| *id == parent)),
                fork_time: segment.fork_time.map(InstantMessage::from),
                samples: segment
                    .samples
                    .iter()
                    .map(|(time, dof)| SampleMessage {
                        time: InstantMessage::from(*time),
                        position: dof.position.into(),
                        velocity: dof.velocity.into(),
                    })
                    .collect(),
            })
            .collect();
        TrajectoryMessage { segments }
    }

    /// Rebuild a tree from its serialized form.
    ///
    /// Return
    /// ----------
    /// * The tree and the handles of its segments, in message order. Fails with
    ///   [`GravitasError::MalformedMessage`] if the message does not describe a valid
    ///   tree: missing or forward parent links, fork instants that are not samples of
    ///   the parent, or samples that are not strictly increasing after the fork instant.
    pub fn read_from_message(
        body: Body,
        message: &TrajectoryMessage,
    ) -> Result<(Self, Vec<SegmentId>), GravitasError> {
        let Some(root_message) = message.segments.first() else {
            return Err(GravitasError::MalformedMessage(
                "trajectory message has no segment".into(),
            ));
        };
        if root_message.parent.is_some() || root_message.fork_time.is_some() {
            return Err(GravitasError::MalformedMessage(
                "first segment must be the root".into(),
            ));
        }

        let mut trajectory = DiscreteTrajectory::new(body);
        let mut ids = vec![trajectory.root];
        trajectory.load_samples(trajectory.root, 0, &root_message.samples)?;

        for (index, segment_message) in message.segments.iter().enumerate().skip(1) {
            let (Some(parent), Some(fork_time)) = (segment_message.parent, segment_message.fork_time)
            else {
                return Err(GravitasError::MalformedMessage(format!(
                    "segment {index} has no parent link"
                )));
            };
            // Parents precede their children, so only already loaded segments qualify.
            let Some(parent_id) = ids.get(parent).copied() else {
                return Err(GravitasError::MalformedMessage(format!(
                    "segment {index} refers to parent {parent} which does not precede it"
                )));
            };
            let fork_time = Instant::from(fork_time);
            if !trajectory.segment(parent_id)?.samples.contains_key(&fork_time) {
                return Err(GravitasError::MalformedMessage(format!(
                    "fork instant of segment {index} is not a sample of segment {parent}"
                )));
            }
            let child = trajectory.allocate(Segment::new(Some(parent_id), Some(fork_time)));
            trajectory.segment_mut(parent_id)?.children.push(child);
            ids.push(child);
            trajectory.load_samples(child, index, &segment_message.samples)?;
        }
        Ok((trajectory, ids))
    }

    fn load_samples(
        &mut self,
        segment: SegmentId,
        index: usize,
        samples: &[SampleMessage],
    ) -> Result<(), GravitasError> {
        let increasing = samples
            .iter()
            .map(|sample| Instant::from(sample.time))
            .tuple_windows()
            .all(|(earlier, later)| earlier < later);
        if !increasing {
            return Err(GravitasError::MalformedMessage(format!(
                "samples of segment {index} are not strictly increasing"
            )));
        }
        for sample in samples {
            let dof = DegreesOfFreedom::new(sample.position.into(), sample.velocity.into());
            self.append(segment, Instant::from(sample.time), dof)
                .map_err(|error| {
                    GravitasError::MalformedMessage(format!("segment {index}: {error}"))
                })?;
        }
        Ok(())
    }

    fn allocate(&mut self, segment: Segment) -> SegmentId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.segment = Some(segment);
                SegmentId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    segment: Some(segment),
                });
                SegmentId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, id: SegmentId) -> Option<Segment> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let segment = slot.segment.take()?;
        slot.generation += 1;
        self.free.push(id.index);
        Some(segment)
    }

    /// Release `id` and all of its descendants. Returns the number of segments deleted.
    fn delete_subtree(&mut self, id: SegmentId) -> usize {
        let mut deleted = 0;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(segment) = self.release(current) {
                deleted += 1;
                pending.extend(segment.children);
            }
        }
        deleted
    }

    fn children_forked(
        &self,
        segment: SegmentId,
        predicate: impl Fn(Instant) -> bool,
    ) -> Result<Vec<SegmentId>, GravitasError> {
        let segment = self.segment(segment)?;
        Ok(segment
            .children
            .iter()
            .copied()
            .filter(|child| {
                self.segment(*child)
                    .ok()
                    .and_then(|child| child.fork_time)
                    .is_some_and(&predicate)
            })
            .collect())
    }

    fn detach_and_delete(&mut self, segment: SegmentId, doomed: &[SegmentId]) -> Result<(), GravitasError> {
        self.segment_mut(segment)?
            .children
            .retain(|child| !doomed.contains(child));
        for fork in doomed {
            self.delete_subtree(*fork);
        }
        Ok(())
    }

    fn segment(&self, id: SegmentId) -> Result<&Segment, GravitasError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_ref())
            .ok_or(GravitasError::DanglingSegment)
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment, GravitasError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.segment.as_mut())
            .ok_or(GravitasError::DanglingSegment)
    }

    /// The segments whose samples are visible from `id`, root first, each paired with
    /// the latest instant it contributes (`None`: all of its samples).
    fn chain(&self, id: SegmentId) -> Result<Vec<(SegmentId, &Segment, Option<Instant>)>, GravitasError> {
        let mut chain = Vec::new();
        let mut current = id;
        let mut bound = None;
        loop {
            let segment = self.segment(current)?;
            chain.push((current, segment, bound));
            match segment.parent {
                Some(parent) => {
                    bound = segment.fork_time;
                    current = parent;
                }
                None => break,
            }
        }
        chain.reverse();
        Ok(chain)
    }

    fn last_sample(
        &self,
        segment: SegmentId,
    ) -> Result<Option<(Instant, DegreesOfFreedom<Barycentric>)>, GravitasError> {
        Ok(self
            .chain(segment)?
            .into_iter()
            .rev()
            .find_map(|(_, candidate, bound)| {
                let last = match bound {
                    Some(bound) => candidate.samples.range(..=bound).next_back(),
                    None => candidate.samples.iter().next_back(),
                };
                last.map(|(time, sample)| (*time, *sample))
            }))
    }
}

fn visible_at(bound: Option<Instant>, time: Instant) -> bool {
    bound.map_or(true, |bound| time <= bound)
}
