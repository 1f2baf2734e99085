use std::time::Instant;

pub struct TimeEstimation;

impl TimeEstimation {
    /// Runs `action` and returns its result with the elapsed
    /// wall-clock milliseconds.
    pub fn estimate<F, R>(action: F) -> (R, u128)
    where
        F: FnOnce() -> R,
    {
        let now = Instant::now();
        let result = action();
        (result, now.elapsed().as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_returns_the_closure_result() {
        let (value, _elapsed) = TimeEstimation::estimate(|| 2 + 2);
        assert_eq!(value, 4);
    }
}
