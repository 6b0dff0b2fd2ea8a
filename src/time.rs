//! # Instants on the simulation time axis
//!
//! [`Instant`] is a point on a continuous, totally ordered time axis. It wraps a
//! [`hifitime::Epoch`] held in the TT scale, so differences are exact
//! [`hifitime::Duration`]s (nanosecond resolution, no floating-point drift when
//! stepping). There are no wall-clock semantics.
//!
//! The wire form of an instant, [`InstantMessage`], carries the exact duration
//! parts since the TT reference epoch so that serialized trajectories reproduce
//! their sample times bit for bit.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use hifitime::{Duration, Epoch, TimeScale};
use serde::{Deserialize, Serialize};

use crate::constants::Second;

#[derive(Clone, Copy)]
pub struct Instant(Epoch);

impl Instant {
    /// Build an instant from an arbitrary [`Epoch`]; it is converted to TT.
    pub fn from_epoch(epoch: Epoch) -> Self {
        Instant(epoch.to_time_scale(TimeScale::TT))
    }

    /// J2000.0, i.e. 2000-01-01T12:00:00 TT.
    pub fn j2000() -> Self {
        Instant(Epoch::from_gregorian(2000, 1, 1, 12, 0, 0, 0, TimeScale::TT))
    }

    /// Build an instant from a count of TT seconds since J2000.0.
    pub fn from_j2000_seconds(seconds: Second) -> Self {
        Self::j2000() + Duration::from_seconds(seconds)
    }

    /// TT seconds elapsed since J2000.0.
    pub fn to_j2000_seconds(&self) -> Second {
        (*self - Self::j2000()).to_seconds()
    }

    pub fn epoch(&self) -> Epoch {
        self.0
    }

    fn duration_since_reference(&self) -> Duration {
        self.0.to_duration_in_time_scale(TimeScale::TT)
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Instant {}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Instant {
    fn cmp(&self, other: &Self) -> Ordering {
        let difference = self.0 - other.0;
        if difference.is_negative() {
            Ordering::Less
        } else if difference == Duration::ZERO {
            Ordering::Equal
        } else {
            Ordering::Greater
        }
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs)
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 = self.0 + rhs;
    }
}

impl Sub<Duration> for Instant {
    type Output = Instant;

    fn sub(self, rhs: Duration) -> Instant {
        Instant(self.0 - rhs)
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.0 - rhs.0
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instant(J2000 + {} s)", self.to_j2000_seconds())
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exact serialized form of an [`Instant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantMessage {
    pub centuries: i16,
    pub nanoseconds: u64,
}

impl From<Instant> for InstantMessage {
    fn from(instant: Instant) -> Self {
        let (centuries, nanoseconds) = instant.duration_since_reference().to_parts();
        InstantMessage {
            centuries,
            nanoseconds,
        }
    }
}

impl From<InstantMessage> for Instant {
    fn from(message: InstantMessage) -> Self {
        let duration = Duration::from_parts(message.centuries, message.nanoseconds);
        Instant(Epoch::from_duration(duration, TimeScale::TT))
    }
}

/// Serde adapter storing a [`Duration`] as its exact `(centuries, nanoseconds)` parts,
/// for use with `#[serde(with = "duration_parts")]`.
pub mod duration_parts {
    use hifitime::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Parts {
        centuries: i16,
        nanoseconds: u64,
    }

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let (centuries, nanoseconds) = duration.to_parts();
        Parts {
            centuries,
            nanoseconds,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let parts = Parts::deserialize(deserializer)?;
        Ok(Duration::from_parts(parts.centuries, parts.nanoseconds))
    }
}

#[cfg(test)]
mod time_test {
    use super::*;

    #[test]
    fn test_ordering_follows_time_axis() {
        let t0 = Instant::j2000();
        let t1 = t0 + Duration::from_seconds(7.0);
        let t2 = t0 + Duration::from_seconds(-3.0);

        assert!(t2 < t0);
        assert!(t0 < t1);
        assert_eq!(t0, Instant::from_j2000_seconds(0.0));
        assert_eq!(t1.max(t2), t1);
    }

    #[test]
    fn test_difference_is_exact() {
        let t0 = Instant::from_j2000_seconds(1_000.0);
        let step = Duration::from_seconds(0.01);
        let mut t = t0;
        for _ in 0..100 {
            t += step;
        }
        assert_eq!(t - t0, Duration::from_seconds(1.0));
        assert_eq!((t - t0).to_seconds(), 1.0);
    }

    #[test]
    fn test_j2000_seconds() {
        let t = Instant::from_j2000_seconds(86_400.5);
        assert_eq!(t.to_j2000_seconds(), 86_400.5);
    }

    #[test]
    fn test_message_round_trip() {
        let t = Instant::from_j2000_seconds(123.456_789);
        let message = InstantMessage::from(t);
        assert_eq!(Instant::from(message), t);
    }
}
