use crate::sys::window_server::WindowId;

/// Monocle layout state: a plain ordered list of the workspace's windows.
/// Every window renders at the full tiling region, so the list only has to
/// answer ordering queries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonocleList {
    windows: Vec<WindowId>,
}

impl MonocleList {
    pub fn new(window: WindowId) -> MonocleList { MonocleList { windows: vec![window] } }

    pub fn windows(&self) -> &[WindowId] { &self.windows }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn contains(&self, window: WindowId) -> bool { self.windows.contains(&window) }

    pub fn push(&mut self, window: WindowId) {
        if !self.contains(window) {
            self.windows.push(window);
        }
    }

    pub fn remove(&mut self, window: WindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| *w != window);
        self.windows.len() != before
    }

    pub fn first(&self) -> Option<WindowId> { self.windows.first().copied() }

    pub fn last(&self) -> Option<WindowId> { self.windows.last().copied() }

    pub fn next_of(&self, window: WindowId) -> Option<WindowId> {
        let index = self.windows.iter().position(|w| *w == window)?;
        self.windows.get(index + 1).copied()
    }

    pub fn prev_of(&self, window: WindowId) -> Option<WindowId> {
        let index = self.windows.iter().position(|w| *w == window)?;
        index.checked_sub(1).and_then(|i| self.windows.get(i)).copied()
    }

    pub fn swap(&mut self, a: WindowId, b: WindowId) -> bool {
        let (Some(i), Some(j)) = (
            self.windows.iter().position(|w| *w == a),
            self.windows.iter().position(|w| *w == b),
        ) else {
            return false;
        };
        self.windows.swap(i, j);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(id: u32) -> WindowId { WindowId::new(id) }

    #[test]
    fn neighbors_follow_insertion_order() {
        let mut list = MonocleList::new(w(1));
        list.push(w(2));
        list.push(w(3));
        assert_eq!(list.next_of(w(1)), Some(w(2)));
        assert_eq!(list.prev_of(w(3)), Some(w(2)));
        assert_eq!(list.next_of(w(3)), None);
        assert_eq!(list.prev_of(w(1)), None);
    }

    #[test]
    fn push_is_idempotent() {
        let mut list = MonocleList::new(w(1));
        list.push(w(1));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn swap_exchanges_positions() {
        let mut list = MonocleList::new(w(1));
        list.push(w(2));
        assert!(list.swap(w(1), w(2)));
        assert_eq!(list.windows(), &[w(2), w(1)]);
        assert!(!list.swap(w(1), w(9)));
    }
}
