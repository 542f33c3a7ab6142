//! Per-farm threshold configuration.
//!
//! A farm's configuration is a sparse name → value map over fourteen
//! recognized parameters. Resolution is per parameter: any name missing
//! from the stored map falls back to its documented default, so an empty
//! map is valid and yields all-default behavior. The resolved
//! [`Thresholds`] struct is the single source the classifier and the
//! critical detector both read, which keeps the two provably consistent.

use std::collections::BTreeMap;

// ---

/// Recognized parameter names, in the order they are seeded for a new farm.
pub const PARAMETER_NAMES: [&str; 14] = [
    "suhu_normal_min",
    "suhu_normal_max",
    "suhu_kritis_rendah",
    "suhu_kritis_tinggi",
    "kelembapan_normal_min",
    "kelembapan_normal_max",
    "kelembapan_kritis_rendah",
    "kelembapan_kritis_tinggi",
    "amonia_max",
    "amonia_kritis",
    "pakan_min",
    "minum_min",
    "pertumbuhan_mingguan_min",
    "target_bobot",
];

/// Sparse stored configuration for one farm, as loaded from persistence.
#[derive(Debug, Clone, Default)]
pub struct ThresholdConfig {
    values: BTreeMap<String, f64>,
}

impl ThresholdConfig {
    // ---
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    /// True when the farm has no stored parameters at all. The classifier
    /// treats this as "cannot evaluate" and reports a normal aggregate.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Resolve to effective thresholds, substituting the default for every
    /// parameter the stored map does not carry. Unknown names are ignored.
    pub fn resolve(&self) -> Thresholds {
        let mut resolved = Thresholds::default();
        for (name, value) in self.iter() {
            resolved.set(name, value);
        }
        resolved
    }
}

// ---

/// Fully resolved threshold set: every parameter has a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub temp_normal_min: f64,
    pub temp_normal_max: f64,
    pub temp_critical_low: f64,
    pub temp_critical_high: f64,
    pub humidity_normal_min: f64,
    pub humidity_normal_max: f64,
    pub humidity_critical_low: f64,
    pub humidity_critical_high: f64,
    pub ammonia_max: f64,
    pub ammonia_critical: f64,
    pub feed_min: f64,
    pub water_min: f64,
    pub weekly_growth_min: f64,
    pub target_weight: f64,
}

impl Default for Thresholds {
    // ---
    fn default() -> Self {
        Thresholds {
            temp_normal_min: 28.0,
            temp_normal_max: 32.0,
            temp_critical_low: 26.0,
            temp_critical_high: 35.0,
            humidity_normal_min: 60.0,
            humidity_normal_max: 70.0,
            humidity_critical_low: 50.0,
            humidity_critical_high: 80.0,
            ammonia_max: 20.0,
            ammonia_critical: 30.0,
            feed_min: 50.0,
            water_min: 100.0,
            weekly_growth_min: 0.5,
            target_weight: 2.0,
        }
    }
}

impl Thresholds {
    // ---
    /// Name/value pairs in `PARAMETER_NAMES` order, used both for seeding a
    /// new farm's configuration and for serializing effective values.
    pub fn pairs(&self) -> [(&'static str, f64); 14] {
        [
            ("suhu_normal_min", self.temp_normal_min),
            ("suhu_normal_max", self.temp_normal_max),
            ("suhu_kritis_rendah", self.temp_critical_low),
            ("suhu_kritis_tinggi", self.temp_critical_high),
            ("kelembapan_normal_min", self.humidity_normal_min),
            ("kelembapan_normal_max", self.humidity_normal_max),
            ("kelembapan_kritis_rendah", self.humidity_critical_low),
            ("kelembapan_kritis_tinggi", self.humidity_critical_high),
            ("amonia_max", self.ammonia_max),
            ("amonia_kritis", self.ammonia_critical),
            ("pakan_min", self.feed_min),
            ("minum_min", self.water_min),
            ("pertumbuhan_mingguan_min", self.weekly_growth_min),
            ("target_bobot", self.target_weight),
        ]
    }

    /// Override one parameter by its wire name. Unknown names are ignored;
    /// validation of incoming names happens at the API boundary.
    pub fn set(&mut self, name: &str, value: f64) {
        match name {
            "suhu_normal_min" => self.temp_normal_min = value,
            "suhu_normal_max" => self.temp_normal_max = value,
            "suhu_kritis_rendah" => self.temp_critical_low = value,
            "suhu_kritis_tinggi" => self.temp_critical_high = value,
            "kelembapan_normal_min" => self.humidity_normal_min = value,
            "kelembapan_normal_max" => self.humidity_normal_max = value,
            "kelembapan_kritis_rendah" => self.humidity_critical_low = value,
            "kelembapan_kritis_tinggi" => self.humidity_critical_high = value,
            "amonia_max" => self.ammonia_max = value,
            "amonia_kritis" => self.ammonia_critical = value,
            "pakan_min" => self.feed_min = value,
            "minum_min" => self.water_min = value,
            "pertumbuhan_mingguan_min" => self.weekly_growth_min = value,
            "target_bobot" => self.target_weight = value,
            _ => {}
        }
    }
}

/// True if `name` is one of the fourteen recognized parameters.
pub fn is_recognized_parameter(name: &str) -> bool {
    PARAMETER_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        // ---
        let config = ThresholdConfig::default();
        assert!(config.is_empty());
        assert_eq!(config.resolve(), Thresholds::default());
    }

    #[test]
    fn partial_config_overrides_only_named_parameters() {
        // ---
        let config = ThresholdConfig::from_pairs([
            ("suhu_normal_max".to_string(), 33.0),
            ("amonia_kritis".to_string(), 25.0),
        ]);
        let resolved = config.resolve();

        assert_eq!(resolved.temp_normal_max, 33.0);
        assert_eq!(resolved.ammonia_critical, 25.0);
        // Everything else stays at its default.
        assert_eq!(resolved.temp_normal_min, 28.0);
        assert_eq!(resolved.humidity_critical_high, 80.0);
        assert_eq!(resolved.feed_min, 50.0);
    }

    #[test]
    fn unknown_names_are_ignored() {
        // ---
        let config = ThresholdConfig::from_pairs([("bogus_param".to_string(), 1.0)]);
        assert_eq!(config.resolve(), Thresholds::default());
    }

    #[test]
    fn pairs_cover_every_recognized_name() {
        // ---
        let pairs = Thresholds::default().pairs();
        assert_eq!(pairs.len(), PARAMETER_NAMES.len());
        for ((name, _), expected) in pairs.iter().zip(PARAMETER_NAMES.iter()) {
            assert_eq!(name, expected);
            assert!(is_recognized_parameter(name));
        }
    }

    #[test]
    fn documented_defaults() {
        // ---
        let d = Thresholds::default();
        assert_eq!(d.temp_normal_min, 28.0);
        assert_eq!(d.temp_normal_max, 32.0);
        assert_eq!(d.temp_critical_low, 26.0);
        assert_eq!(d.temp_critical_high, 35.0);
        assert_eq!(d.humidity_normal_min, 60.0);
        assert_eq!(d.humidity_normal_max, 70.0);
        assert_eq!(d.humidity_critical_low, 50.0);
        assert_eq!(d.humidity_critical_high, 80.0);
        assert_eq!(d.ammonia_max, 20.0);
        assert_eq!(d.ammonia_critical, 30.0);
        assert_eq!(d.feed_min, 50.0);
        assert_eq!(d.water_min, 100.0);
        assert_eq!(d.weekly_growth_min, 0.5);
        assert_eq!(d.target_weight, 2.0);
    }
}
