//! Run configuration for the stepping loop and its validator

/// Settings for the optional consistency checks
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Off by default: the checks cost time on every merge
    pub enabled: bool,
    /// Largest tolerated energy imbalance per report (MeV)
    pub energy_tolerance: f64,
    /// Largest tolerated deviation of a direction from unit length
    pub direction_tolerance: f64,
    /// Warnings beyond this many are counted but not kept
    pub max_recorded_warnings: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            energy_tolerance: 1.0e-6,
            direction_tolerance: 1.0e-6,
            max_recorded_warnings: 64,
        }
    }
}

impl ValidationConfig {
    /// Checks enabled with default tolerances
    pub fn debug() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_energy_tolerance(mut self, tolerance: f64) -> Self {
        self.energy_tolerance = tolerance;
        self
    }

    pub fn with_direction_tolerance(mut self, tolerance: f64) -> Self {
        self.direction_tolerance = tolerance;
        self
    }
}

/// Settings for one worker's stepping loop
#[derive(Debug, Clone, PartialEq)]
pub struct SteppingConfig {
    /// A track still alive after this many steps is killed
    pub max_steps_per_track: u32,
    /// Initial capacity of the step's secondary list
    pub secondary_reserve: usize,
    pub validation: ValidationConfig,
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            max_steps_per_track: 100_000,
            secondary_reserve: 16,
            validation: ValidationConfig::default(),
        }
    }
}

impl SteppingConfig {
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_max_steps_per_track(mut self, max_steps: u32) -> Self {
        self.max_steps_per_track = max_steps;
        self
    }
}
