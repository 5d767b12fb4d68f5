use std::collections::HashMap;

/// Represents an observation, using a HashMap of String keys and Float values.
///
/// Keys may change from one observation to the next, models decide what a missing key means.
///
/// # Example
///
/// ```
/// use light_hst::common::Observation;
///
/// let mut obs: Observation<f32> = Observation::new();
/// obs.insert("feature1".to_string(), 0.25);
/// obs.insert("feature2".to_string(), 0.75);
/// ```
pub type Observation<F> = HashMap<String, F>;

/// Trait for implementing an anomaly detector model.
///
/// Implement this trait for your anomaly detector to use the `learn_one` and `score_one` methods.
/// Scores grow with how unusual `x` looks to the model.
pub trait AnomalyDetector<F> {
    fn learn_one(&mut self, x: &Observation<F>);
    fn score_one(&self, x: &Observation<F>) -> F;
}
