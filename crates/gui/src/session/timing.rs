/// Fixed update rate of the sample pipeline
pub const STEP_HZ: f32 = 20.0;
pub const STEP_DT: f32 = 1.0 / STEP_HZ;
/// Updates run per frame at most; further steps only consume time
pub const MAX_STEPS_PER_FRAME: usize = 5;
/// Accumulator clamp in seconds
const MAX_ACCUMULATED: f32 = 1.0;

/// Fixed-step accumulator driving pipeline updates
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Add `dt` and return how many updates to run this frame
    pub fn advance(&mut self, dt: f32) -> usize {
        self.accumulator = (self.accumulator + dt).clamp(-MAX_ACCUMULATED, MAX_ACCUMULATED);
        let mut steps = 0;
        while self.accumulator > STEP_DT {
            self.accumulator -= STEP_DT;
            if steps < MAX_STEPS_PER_FRAME {
                steps += 1;
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_dt_accumulates() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(0.03), 0);
        assert_eq!(step.advance(0.03), 1);
        assert!((step.accumulator() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn updates_capped_but_time_consumed() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(0.5), MAX_STEPS_PER_FRAME);
        assert!(step.accumulator() <= STEP_DT);
    }

    #[test]
    fn accumulator_clamped_to_one_second() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(10.0), MAX_STEPS_PER_FRAME);
        assert!(step.accumulator() <= STEP_DT + 1e-6);
        let mut back = FixedStep::default();
        assert_eq!(back.advance(-10.0), 0);
        assert_eq!(back.accumulator(), -1.0);
    }
}
