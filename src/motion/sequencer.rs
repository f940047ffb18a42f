//! Outward alternating search order
//!
//! Yields positions in `[0, bound)` by increasing distance from `middle`:
//! `middle, middle-1, middle+1, middle-2, middle+2, ...` up to `window`.
//! Candidates outside the range are skipped. When one side runs out of range
//! the other side keeps going on its own.

/// Iterator over candidate positions, nearest first
#[derive(Debug, Clone)]
pub struct AlternatingWindow {
    middle: i64,
    bound: i64,
    window: i64,
    state: State,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Middle,
    Below(i64),
    Above(i64),
    Done,
}

impl AlternatingWindow {
    /// Search `[0, bound)` around `middle`, at most `window` away from it
    pub fn new(middle: i32, bound: i32, window: u32) -> Self {
        Self {
            middle: middle as i64,
            bound: bound as i64,
            window: window as i64,
            state: State::Middle,
        }
    }
}

impl Iterator for AlternatingWindow {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        loop {
            let (distance, candidate) = match self.state {
                State::Middle => {
                    self.state = State::Below(1);
                    (0, self.middle)
                }
                State::Below(d) => {
                    self.state = State::Above(d);
                    (d, self.middle - d)
                }
                State::Above(d) => {
                    self.state = State::Below(d + 1);
                    (d, self.middle + d)
                }
                State::Done => return None,
            };

            let both_sides_exhausted =
                self.middle - distance < 0 && self.middle + distance >= self.bound;
            if distance > self.window || both_sides_exhausted {
                self.state = State::Done;
                return None;
            }
            if (0..self.bound).contains(&candidate) {
                return Some(candidate as i32);
            }
        }
    }
}
