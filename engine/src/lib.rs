pub mod profiling;
pub mod regression;

/// A deterministic, frame-stepped game.
///
/// `step` mutates the state in place and reports whatever the frame produced
/// (events, casts, ...) through `Output`, so frontends can react without
/// diffing states.
pub trait GameLogic {
    type State;
    type Input;
    type Output;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &mut Self::State, input: Self::Input) -> Self::Output;
}

#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    state: G::State,
    frame: usize,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self {
            game,
            state,
            frame: 0,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    pub fn step(&mut self, input: G::Input) -> G::Output {
        let output = self.game.step(&mut self.state, input);
        self.frame += 1;
        output
    }

    pub fn step_profiled<P: profiling::Profiler>(
        &mut self,
        input: G::Input,
        profiler: &mut P,
    ) -> G::Output {
        use std::time::Instant;

        let total_start = Instant::now();

        let step_start = Instant::now();
        let output = self.game.step(&mut self.state, input);
        let step_dt = step_start.elapsed();

        self.frame += 1;
        let total_dt = total_start.elapsed();
        profiler.on_tick(
            self.frame,
            profiling::TickTimings {
                step: step_dt,
                total: total_dt,
            },
        );

        output
    }

    pub fn run<I>(&mut self, inputs: I) -> Vec<G::Output>
    where
        I: IntoIterator<Item = G::Input>,
    {
        inputs.into_iter().map(|input| self.step(input)).collect()
    }

    /// Drops the current state and starts over from `initial_state`.
    pub fn reset(&mut self) {
        self.state = self.game.initial_state();
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::{Profiler, TickTimings};

    struct Additive;

    impl GameLogic for Additive {
        type State = i32;
        type Input = i32;
        type Output = bool;

        fn initial_state(&self) -> Self::State {
            0
        }

        fn step(&self, state: &mut Self::State, input: Self::Input) -> Self::Output {
            *state += input;
            *state > 5
        }
    }

    #[test]
    fn runner_steps_and_collects_outputs() {
        let mut runner = HeadlessRunner::new(Additive);
        let outputs = runner.run([1, 2, 3]);
        assert_eq!(runner.frame(), 3);
        assert_eq!(runner.state(), &6);
        assert_eq!(outputs, vec![false, false, true]);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut runner = HeadlessRunner::new(Additive);
        runner.run([4, 4]);
        runner.reset();
        assert_eq!(runner.frame(), 0);
        assert_eq!(runner.state(), &0);
    }

    #[test]
    fn runner_step_profiled_calls_profiler_hook() {
        #[derive(Default)]
        struct Capture {
            frames: Vec<usize>,
            timings: Vec<TickTimings>,
        }

        impl Profiler for Capture {
            fn on_tick(&mut self, frame: usize, timings: TickTimings) {
                self.frames.push(frame);
                self.timings.push(timings);
            }
        }

        let mut runner = HeadlessRunner::new(Additive);
        let mut capture = Capture::default();

        let out = runner.step_profiled(1, &mut capture);
        assert!(!out);
        assert_eq!(runner.state(), &1);
        assert_eq!(capture.frames, vec![1]);

        let t = capture.timings[0];
        assert!(t.total >= t.step);
    }
}
