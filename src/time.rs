use std::fmt::{self, Display, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A nanosecond-precision point in time.
///
/// This is the stamp carried by every frame-tagged value in this crate, and by
/// [`RigidTransform`](crate::RigidTransform) itself. Where the nanoseconds are counted from is up to
/// whoever produces the stamps (usually the UNIX epoch or the start of a simulation); this crate
/// only ever copies stamps around and compares them.
///
/// [`Timestamp::ZERO`] is conventionally used to mean "no particular time".
///
/// ```
/// use framewise::Timestamp;
///
/// let a = Timestamp::from_secs_f64(1.5);
/// let b = Timestamp::from_secs_nanos(1, 500_000_000);
/// assert_eq!(a, b);
/// assert!(Timestamp::ZERO < a);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// The zero time.
    pub const ZERO: Self = Self { nanos: 0 };

    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Constructs a timestamp from whole seconds plus nanoseconds.
    ///
    /// `nanos` may be a second or more and carries into the seconds. Times past `u64::MAX`
    /// nanoseconds saturate.
    #[must_use]
    pub const fn from_secs_nanos(secs: u64, nanos: u32) -> Self {
        Self {
            nanos: secs
                .saturating_mul(NANOS_PER_SEC)
                .saturating_add(nanos as u64),
        }
    }

    /// Constructs a timestamp from fractional seconds.
    ///
    /// Negative (and NaN) inputs saturate to [`Timestamp::ZERO`].
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * 1e9).round().max(0.0) as u64,
        }
    }

    /// Reads the wall clock as nanoseconds since the UNIX epoch.
    ///
    /// A clock set before the epoch yields [`Timestamp::ZERO`].
    #[must_use]
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Self::from)
            .unwrap_or(Self::ZERO)
    }

    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / 1e9
    }

    /// Returns the time elapsed from `earlier` to `self`, or `None` if `earlier` is later.
    #[must_use]
    pub fn duration_since(self, earlier: Self) -> Option<Duration> {
        self.nanos
            .checked_sub(earlier.nanos)
            .map(Duration::from_nanos)
    }

    /// True unless this is [`Timestamp::ZERO`].
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.nanos != 0
    }
}

impl From<Duration> for Timestamp {
    /// Interprets `since_origin` as the time elapsed since the stamp origin.
    ///
    /// Durations beyond `u64::MAX` nanoseconds (roughly 584 years) saturate.
    fn from(since_origin: Duration) -> Self {
        Self {
            nanos: u64::try_from(since_origin.as_nanos()).unwrap_or(u64::MAX),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:09}",
            self.nanos / NANOS_PER_SEC,
            self.nanos % NANOS_PER_SEC
        )
    }
}
