/// Source of uniform draws in `[0, 1)` for the match heuristic
pub trait RandomSource: Send + Sync {
    fn draw(&self) -> f64;
}

/// Thread-local uniform generator used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn draw(&self) -> f64 {
        fastrand::f64()
    }
}

/// Always returns the same draw; lets tests force a match or a miss
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn draw(&self) -> f64 {
        self.0
    }
}
