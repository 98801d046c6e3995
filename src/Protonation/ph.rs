//! Reference and target pH of every compartment.
use crate::errors::PhAdjustError;
use crate::settings::AdjustSettings;
use log::warn;

/// Two pH vectors aligned with the compartment vocabulary. The reference pH is the one the
/// model's formulas are currently written for, the target pH the one they are adjusted to.
#[derive(Debug, Clone, PartialEq)]
pub struct PhAssignment {
    pub reference: Vec<f64>,
    pub target: Vec<f64>,
}

impl PhAssignment {
    pub fn new(reference: Vec<f64>, target: Vec<f64>) -> Result<Self, PhAdjustError> {
        if reference.len() != target.len() {
            return Err(PhAdjustError::dimension(
                "target pH vector",
                reference.len(),
                target.len(),
            ));
        }
        if let Some(bad) = reference.iter().chain(target.iter()).find(|v| !v.is_finite()) {
            return Err(PhAdjustError::InvalidTask(format!("pH value {} is not finite", bad)));
        }
        Ok(Self { reference, target })
    }

    /// same reference and target pH in every one of `n` compartments
    pub fn uniform(n: usize, reference: f64, target: f64) -> Self {
        Self {
            reference: vec![reference; n],
            target: vec![target; n],
        }
    }

    /// Builds the vectors for `vocabulary` from per-compartment maps of the settings.
    pub fn from_settings(
        settings: &AdjustSettings,
        vocabulary: &[String],
    ) -> Result<Self, PhAdjustError> {
        for code in settings.reference_ph.keys().chain(settings.target_ph.keys()) {
            if !vocabulary.contains(code) {
                warn!("pH given for compartment '{}' which is not in the model", code);
            }
        }
        let reference: Vec<f64> = vocabulary
            .iter()
            .map(|c| {
                settings
                    .reference_ph
                    .get(c)
                    .copied()
                    .unwrap_or(settings.default_reference_ph)
            })
            .collect();
        let target = vocabulary
            .iter()
            .zip(reference.iter())
            .map(|(c, reference)| match settings.target_ph.get(c) {
                Some(ph) => *ph,
                None => {
                    warn!("no target pH for compartment '{}', keeping pH {}", c, reference);
                    *reference
                }
            })
            .collect();
        Self::new(reference, target)
    }

    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    pub fn check_len(&self, n_compartments: usize) -> Result<(), PhAdjustError> {
        if self.reference.len() != n_compartments {
            return Err(PhAdjustError::dimension(
                "reference pH vector",
                n_compartments,
                self.reference.len(),
            ));
        }
        if self.target.len() != n_compartments {
            return Err(PhAdjustError::dimension(
                "target pH vector",
                n_compartments,
                self.target.len(),
            ));
        }
        Ok(())
    }

    /// assignment that undoes this one
    pub fn reversed(&self) -> Self {
        Self {
            reference: self.target.clone(),
            target: self.reference.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let mut settings = AdjustSettings::new();
        settings.set_reference_ph("c", 7.2);
        settings.set_target_ph("e", 5.5);
        let vocabulary = vec!["c".to_string(), "e".to_string()];
        let ph = PhAssignment::from_settings(&settings, &vocabulary).unwrap();
        assert_eq!(ph.reference, vec![7.2, 7.0]);
        assert_eq!(ph.target, vec![7.2, 5.5]);
        assert_eq!(ph.reversed().target, vec![7.2, 7.0]);
    }

    #[test]
    fn test_dimension_checks() {
        assert!(matches!(
            PhAssignment::new(vec![7.0], vec![7.0, 5.0]),
            Err(PhAdjustError::DimensionMismatch { .. })
        ));
        let ph = PhAssignment::uniform(2, 7.0, 7.4);
        assert!(ph.check_len(2).is_ok());
        assert!(ph.check_len(3).is_err());
        assert!(PhAssignment::new(vec![f64::NAN], vec![7.0]).is_err());
    }
}
