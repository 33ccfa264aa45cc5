use super::sync::ReorderDirection;

pub const DEFAULT_LAMBDA: f64 = 1.0;

/// What the user has selected. Topic 0 means no topic, an empty term means no term.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionState {
    pub topic: usize,
    pub lambda: f64,
    pub term: String,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            topic: 0,
            lambda: DEFAULT_LAMBDA,
            term: String::new(),
        }
    }
}

impl SelectionState {
    pub fn has_topic(&self) -> bool {
        self.topic > 0
    }

    pub fn has_term(&self) -> bool {
        !self.term.is_empty()
    }
}

pub fn clamp_lambda(value: f64) -> f64 {
    if !value.is_finite() {
        DEFAULT_LAMBDA
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn clamp_topic(value: i64, topic_count: usize) -> usize {
    value.clamp(0, topic_count as i64) as usize
}

/// The two most recent lambda values; their order decides the bar reorder direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LambdaHistory {
    pub previous: f64,
    pub current: f64,
}

impl LambdaHistory {
    pub fn new(lambda: f64) -> Self {
        Self {
            previous: lambda,
            current: lambda,
        }
    }

    pub fn record(&mut self, lambda: f64) {
        self.previous = self.current;
        self.current = lambda;
    }

    pub fn direction(&self) -> ReorderDirection {
        ReorderDirection::from_lambda_change(self.previous, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_is_clamped_into_unit_interval() {
        assert_eq!(clamp_lambda(2.0), 1.0);
        assert_eq!(clamp_lambda(-0.5), 0.0);
        assert_eq!(clamp_lambda(0.42), 0.42);
        assert_eq!(clamp_lambda(f64::NAN), DEFAULT_LAMBDA);
        assert_eq!(clamp_lambda(f64::NEG_INFINITY), DEFAULT_LAMBDA);
    }

    #[test]
    fn topic_is_clamped_to_known_topics() {
        assert_eq!(clamp_topic(-5, 3), 0);
        assert_eq!(clamp_topic(2, 3), 2);
        assert_eq!(clamp_topic(9, 3), 3);
    }

    #[test]
    fn history_tracks_direction() {
        let mut history = LambdaHistory::new(1.0);
        assert_eq!(history.direction(), ReorderDirection::Decreasing);

        history.record(0.4);
        assert_eq!(history.direction(), ReorderDirection::Decreasing);

        history.record(0.7);
        assert_eq!(history.previous, 0.4);
        assert_eq!(history.direction(), ReorderDirection::Increasing);
    }
}
