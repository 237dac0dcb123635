//! Inertial-format arbitration.
//!
//! A log encodes its inertial data in exactly one of several packaging
//! formats, detected from the record stream rather than declared. The
//! arbiter keeps the sticky detection state and decides, per record,
//! whether this record is the one that triggers a full estimator update.

use tracing::info;

/// Detected inertial packaging of the log.
///
/// Promotions are monotone within a session: `Legacy -> LegacyDual`,
/// `Legacy* -> AltPrimary -> AltSecondary`, and anything `-> Framed`.
/// No variant ever reverts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InertialFormat {
    /// Primary legacy stream only (IMU)
    #[default]
    Legacy,
    /// Secondary legacy stream present (IMU2 authoritative)
    LegacyDual,
    /// Alternate delta-integrated format, primary variant (IMT)
    AltPrimary,
    /// Alternate format, secondary variant (IMT2 authoritative)
    AltSecondary,
    /// Frame-synchronized format (FRAM markers)
    Framed,
}

impl InertialFormat {
    /// The single record tag that triggers a full update under this format
    pub fn trigger_tag(self) -> &'static str {
        match self {
            InertialFormat::Legacy => "IMU",
            InertialFormat::LegacyDual => "IMU2",
            InertialFormat::AltPrimary => "IMT",
            InertialFormat::AltSecondary => "IMT2",
            InertialFormat::Framed => "FRAM",
        }
    }
}

/// Sticky format detection plus the per-record trigger decision
#[derive(Debug)]
pub struct SensorFormatArbiter {
    format: InertialFormat,
    /// An IMT2 sighting is remembered even before any IMT promotes the
    /// format, matching the recorded firmware's variant logic. Sticky.
    alt_secondary_seen: bool,
    /// When false the framed/alternate paths are inert (legacy-only)
    framed_alt_enabled: bool,
}

impl SensorFormatArbiter {
    pub fn new(framed_alt_enabled: bool) -> Self {
        Self {
            format: InertialFormat::default(),
            alt_secondary_seen: false,
            framed_alt_enabled,
        }
    }

    /// Currently detected format
    pub fn format(&self) -> InertialFormat {
        self.format
    }

    /// Update detection state from the record tag just read, then decide
    /// whether this record triggers a full estimator update.
    ///
    /// Detection runs before the decision, so the first sighting of a
    /// narrowing tag both promotes the format and triggers.
    pub fn observe(&mut self, tag: &str) -> bool {
        self.detect(tag);
        tag == self.format.trigger_tag()
    }

    fn detect(&mut self, tag: &str) {
        match tag {
            "FRAM" if self.framed_alt_enabled => {
                self.promote(InertialFormat::Framed);
            }
            "IMT" if self.framed_alt_enabled && self.format != InertialFormat::Framed => {
                if matches!(
                    self.format,
                    InertialFormat::Legacy | InertialFormat::LegacyDual
                ) {
                    if self.alt_secondary_seen {
                        self.promote(InertialFormat::AltSecondary);
                    } else {
                        self.promote(InertialFormat::AltPrimary);
                    }
                }
            }
            "IMT2" if self.framed_alt_enabled && self.format != InertialFormat::Framed => {
                self.alt_secondary_seen = true;
                if self.format == InertialFormat::AltPrimary {
                    self.promote(InertialFormat::AltSecondary);
                }
            }
            "IMU2" if self.format == InertialFormat::Legacy => {
                self.promote(InertialFormat::LegacyDual);
            }
            _ => {}
        }
    }

    fn promote(&mut self, next: InertialFormat) {
        if self.format == next {
            return;
        }
        info!(
            from = ?self.format,
            to = ?next,
            trigger_tag = next.trigger_tag(),
            "inertial format detected"
        );
        metrics::counter!("replay_format_promotions_total", "format" => next.trigger_tag())
            .increment(1);
        self.format = next;
    }
}
