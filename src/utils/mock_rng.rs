use crate::utils::RandomNumberStream;

// Replays a fixed sequence of draws, for tests that need to pin every
// branch of a sampler. Panics once the sequence is exhausted.
#[derive(Debug, Clone)]
pub struct MockRng {
    values: Vec<f64>,
    index: usize,
}

impl MockRng {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, index: 0 }
    }

    // Number of draws consumed so far
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RandomNumberStream for MockRng {
    fn next_uniform(&mut self) -> f64 {
        if self.index >= self.values.len() {
            panic!("MockRng: Ran out of values to return after {} draws", self.index);
        }
        let value = self.values[self.index];
        self.index += 1;
        value
    }
}
