use crate::config::SchedulerConfig;

/// Turns variable frame time into a bounded number of fixed sub-steps.
///
/// At most `max_substeps` run per call; leftover time stays in the
/// accumulator for the next call, so a long stall never triggers an
/// unbounded catch-up burst.
#[derive(Clone, Debug)]
pub struct FixedStepScheduler {
    step: f64,
    max_substeps: u32,
    accumulator: f64,
    total_substeps: u64,
}

impl FixedStepScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            step: config.fixed_step,
            max_substeps: config.max_substeps,
            accumulator: 0.0,
            total_substeps: 0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Fraction of a sub-step waiting in the accumulator, for render
    /// interpolation.
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.step).min(1.0)
    }

    pub fn total_substeps(&self) -> u64 {
        self.total_substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.total_substeps = 0;
    }

    /// Adds `frame_delta` to the accumulator and runs `substep` once per
    /// whole step available, up to the cap. Returns how many ran.
    ///
    /// Non-finite or negative deltas contribute no time. An error from
    /// `substep` stops the loop immediately.
    pub fn advance<E>(
        &mut self,
        frame_delta: f64,
        mut substep: impl FnMut(f64) -> Result<(), E>,
    ) -> Result<u32, E> {
        if frame_delta.is_finite() && frame_delta > 0.0 {
            self.accumulator += frame_delta;
        } else if frame_delta != 0.0 {
            tracing::debug!(frame_delta, "ignoring unusable frame delta");
        }

        let mut ran = 0;
        while self.accumulator >= self.step && ran < self.max_substeps {
            substep(self.step)?;
            self.accumulator -= self.step;
            self.total_substeps += 1;
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    fn scheduler(step: f64, max_substeps: u32) -> FixedStepScheduler {
        FixedStepScheduler::new(&SchedulerConfig {
            fixed_step: step,
            max_substeps,
        })
    }

    fn run(scheduler: &mut FixedStepScheduler, delta: f64) -> u32 {
        scheduler
            .advance(delta, |_| Ok::<(), Infallible>(()))
            .expect("infallible")
    }

    #[test]
    fn short_frames_accumulate() {
        let mut s = scheduler(0.25, 4);
        assert_eq!(run(&mut s, 0.1), 0);
        assert_eq!(run(&mut s, 0.1), 0);
        assert_eq!(run(&mut s, 0.1), 1);
        assert!((s.accumulated() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn stall_is_capped_and_remainder_carries_over() {
        let mut s = scheduler(0.25, 4);
        assert_eq!(run(&mut s, 2.0), 4);
        assert!((s.accumulated() - 1.0).abs() < 1e-9);
        assert_eq!(run(&mut s, 0.0), 4);
        assert_eq!(run(&mut s, 0.0), 0);
        assert_eq!(s.total_substeps(), 8);
    }

    #[test]
    fn bad_deltas_add_nothing() {
        let mut s = scheduler(0.25, 4);
        assert_eq!(run(&mut s, -1.0), 0);
        assert_eq!(run(&mut s, f64::NAN), 0);
        assert_eq!(run(&mut s, f64::INFINITY), 0);
        assert_eq!(s.accumulated(), 0.0);
    }

    #[test]
    fn every_substep_gets_the_fixed_size() {
        let mut s = scheduler(0.5, 4);
        let mut seen = Vec::new();
        s.advance(1.0, |dt| {
            seen.push(dt);
            Ok::<(), Infallible>(())
        })
        .expect("infallible");
        assert_eq!(seen, vec![0.5, 0.5]);
    }

    #[test]
    fn error_stops_the_loop_and_keeps_time() {
        let mut s = scheduler(0.25, 4);
        let mut calls = 0;
        let result = s.advance(1.0, |_| {
            calls += 1;
            if calls == 2 {
                Err("boom")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 2);
        assert!((s.accumulated() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn alpha_reports_partial_step() {
        let mut s = scheduler(0.5, 4);
        run(&mut s, 0.25);
        assert!((s.alpha() - 0.5).abs() < 1e-9);
        s.reset();
        assert_eq!(s.alpha(), 0.0);
    }
}
