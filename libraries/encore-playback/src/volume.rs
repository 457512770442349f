//! Volume and mute control
//!
//! Volume is a linear level in `[0.0, 1.0]` pushed straight to the media
//! element. Muting snapshots the level into `previous_volume`; unmuting
//! restores from that snapshot.

/// Volume controller with mute snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Requested level (0.0-1.0)
    level: f64,

    /// Level captured when mute was switched on
    previous_level: f64,

    /// Mute state
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume, clamped to 0.0-1.0
    pub fn new(level: f64) -> Self {
        let level = clamp_level(level);
        Self {
            level,
            previous_level: level,
            muted: false,
        }
    }

    /// Set volume level; mute state is left alone
    pub fn set_level(&mut self, level: f64) {
        self.level = clamp_level(level);
    }

    /// Current volume level
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Level captured at the last mute
    pub fn previous_level(&self) -> f64 {
        self.previous_level
    }

    /// Toggle mute state
    ///
    /// Muting stores the current level; unmuting restores the stored level.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.level = self.previous_level;
            self.muted = false;
        } else {
            self.previous_level = self.level;
            self.muted = true;
        }
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level the media element should actually use
    ///
    /// Returns 0.0 if muted, otherwise the level
    pub fn effective(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.8);
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::new(0.5);

        vol.set_level(0.75);
        assert_eq!(vol.level(), 0.75);

        vol.set_level(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn mute_snapshots_and_restores() {
        let mut vol = Volume::new(0.6);

        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.effective(), 0.0);
        assert_eq!(vol.previous_level(), 0.6);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.6);
        assert_eq!(vol.level(), 0.6);
    }

    #[test]
    fn set_level_while_muted_keeps_silence() {
        let mut vol = Volume::new(0.6);
        vol.toggle_mute();

        vol.set_level(0.9);
        assert!(vol.is_muted());
        assert_eq!(vol.effective(), 0.0);

        // Unmute restores the snapshot taken at mute time
        vol.toggle_mute();
        assert_eq!(vol.level(), 0.6);
    }

    #[test]
    fn nan_level_becomes_silence() {
        let vol = Volume::new(f64::NAN);
        assert_eq!(vol.level(), 0.0);
    }
}
