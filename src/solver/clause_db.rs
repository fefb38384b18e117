use std::ops::Index;

/// Append-only storage of clauses, packed in a single vector
///
/// Clauses are stored back to back; `starts` holds the position of each clause, with a final
/// sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClauseDatabase<T> {
    literals: Vec<T>,
    starts: Vec<usize>,
}

impl<T> Default for ClauseDatabase<T> {
    fn default() -> Self {
        ClauseDatabase {
            literals: Vec::new(),
            starts: vec![0],
        }
    }
}

impl<T: Copy> ClauseDatabase<T> {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clauses
    pub fn len(&self) -> usize {
        self.starts.len() - 1
    }

    /// Returns true if no clause is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of literals
    pub fn nb_literals(&self) -> usize {
        self.literals.len()
    }

    /// Append a clause
    pub fn push(&mut self, clause: &[T]) {
        self.literals.extend_from_slice(clause);
        self.starts.push(self.literals.len());
    }

    /// Remove the last clause
    pub fn pop(&mut self) -> Option<Vec<T>> {
        if self.is_empty() {
            return None;
        }
        self.starts.pop();
        let start = self.starts[self.starts.len() - 1];
        Some(self.literals.split_off(start))
    }

    /// Remove all clauses
    pub fn clear(&mut self) {
        self.literals.clear();
        self.starts.truncate(1);
    }

    /// Clause at a given index
    pub fn get(&self, i: usize) -> Option<&[T]> {
        if i >= self.len() {
            return None;
        }
        Some(&self.literals[self.starts[i]..self.starts[i + 1]])
    }

    /// Iterate over the clauses
    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.starts
            .windows(2)
            .map(|w| &self.literals[w[0]..w[1]])
    }
}

impl<T: Copy> Index<usize> for ClauseDatabase<T> {
    type Output = [T];

    fn index(&self, i: usize) -> &[T] {
        assert!(i < self.len(), "Clause {i} out of range");
        &self.literals[self.starts[i]..self.starts[i + 1]]
    }
}

/// Clause under construction in a proxy
#[derive(Clone, Debug, Default)]
pub(crate) struct PendingClause<T> {
    open: bool,
    literals: Vec<T>,
}

impl<T> PendingClause<T> {
    /// Open the clause
    pub fn begin(&mut self) {
        assert!(!self.open, "Opening a new clause although the previous one is not committed");
        self.open = true;
        self.literals.clear();
    }

    /// Returns true if a clause is open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Add a literal to the open clause
    pub fn push(&mut self, lit: T) {
        assert!(self.open, "Adding a literal without an open clause");
        self.literals.push(lit);
    }

    /// Close the clause and return its literals
    pub fn take(&mut self) -> Vec<T> {
        assert!(self.open, "Committing a clause that was never opened");
        self.open = false;
        std::mem::take(&mut self.literals)
    }

    /// Drop the clause under construction
    pub fn discard(&mut self) {
        self.open = false;
        self.literals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut db = ClauseDatabase::new();
        assert!(db.is_empty());
        db.push(&[1, 2, 3]);
        db.push(&[]);
        db.push(&[4]);
        assert_eq!(db.len(), 3);
        assert_eq!(db.nb_literals(), 4);
        assert_eq!(&db[0], &[1, 2, 3]);
        assert!(db[1].is_empty());
        assert_eq!(db.get(2), Some(&[4][..]));
        assert_eq!(db.get(3), None);
        assert_eq!(db.pop(), Some(vec![4]));
        assert_eq!(db.pop(), Some(vec![]));
        assert_eq!(db.len(), 1);
        db.clear();
        assert!(db.is_empty());
        assert_eq!(db.pop(), None);
    }

    #[test]
    fn test_iter() {
        let mut db = ClauseDatabase::new();
        db.push(&['a', 'b']);
        db.push(&['c']);
        let clauses: Vec<String> = db.iter().map(|c| c.iter().collect()).collect();
        assert_eq!(clauses, vec!["ab".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn test_pending() {
        let mut p = PendingClause::default();
        assert!(!p.is_open());
        p.begin();
        p.push(1);
        p.push(2);
        assert_eq!(p.take(), vec![1, 2]);
        assert!(!p.is_open());
    }

    #[test]
    #[should_panic]
    fn test_pending_twice() {
        let mut p = PendingClause::<u32>::default();
        p.begin();
        p.begin();
    }

    #[test]
    #[should_panic]
    fn test_pending_closed() {
        let mut p = PendingClause::<u32>::default();
        p.push(1);
    }
}
