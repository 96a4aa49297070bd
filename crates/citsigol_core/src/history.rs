use crate::traits::Point;

/// Fixed-capacity ring of the most recent iterates.
/// Pushing into a full ring overwrites the oldest entry.
#[derive(Debug, Clone)]
pub struct History {
    buf: Vec<Point>,
    head: usize,
    len: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Entry `index`, counted from the oldest retained value.
    pub fn get(&self, index: usize) -> Option<Point> {
        if index >= self.len {
            return None;
        }
        Some(self.buf[(self.head + index) % self.buf.len()])
    }

    pub fn push(&mut self, value: Point) {
        let cap = self.buf.len();
        if self.len < cap {
            self.buf[(self.head + self.len) % cap] = value;
            self.len += 1;
        } else {
            self.buf[self.head] = value;
            self.head = (self.head + 1) % cap;
        }
    }

    /// Index of the newest entry within `tol` of `value`.
    pub fn rfind_within(&self, value: Point, tol: f64) -> Option<usize> {
        (0..self.len)
            .rev()
            .find(|&i| self.get(i).is_some_and(|h| (h - value).abs() <= tol))
    }

    /// Entries from `start` to the newest, oldest first.
    pub fn tail_from(&self, start: usize) -> Vec<Point> {
        (start..self.len).filter_map(|i| self.get(i)).collect()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.tail_from(0)
    }
}

#[cfg(test)]
mod tests {
    use super::History;

    #[test]
    fn fills_then_evicts_oldest() {
        let mut history = History::with_capacity(3);
        for value in [1.0, 2.0, 3.0] {
            history.push(value);
        }
        assert!(history.is_full());
        history.push(4.0);
        history.push(5.0);
        assert_eq!(history.len(), 3);
        assert_eq!(history.to_vec(), vec![3.0, 4.0, 5.0]);
        assert_eq!(history.get(0), Some(3.0));
        assert_eq!(history.get(3), None);
    }

    #[test]
    fn rfind_prefers_newest_match() {
        let mut history = History::with_capacity(4);
        for value in [0.5, 0.7, 0.5000001, 0.9] {
            history.push(value);
        }
        assert_eq!(history.rfind_within(0.5, 1e-3), Some(2));
        assert_eq!(history.rfind_within(0.1, 1e-3), None);
        assert_eq!(history.tail_from(2), vec![0.5000001, 0.9]);
    }

    #[test]
    fn zero_capacity_holds_one_value() {
        let mut history = History::with_capacity(0);
        assert!(history.is_empty());
        history.push(1.0);
        history.push(2.0);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.to_vec(), vec![2.0]);
    }
}
