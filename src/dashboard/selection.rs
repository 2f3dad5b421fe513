use std::collections::BTreeSet;

/// Tunnels the operator has ticked for a bulk action, keyed by public port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: BTreeSet<u16>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of one tunnel. Returns whether it is now selected.
    pub fn toggle(&mut self, id: u16) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Jump between "all known tunnels" and "nothing"; never additive.
    pub fn select_all(&mut self, known: &BTreeSet<u16>) {
        if self.selected == *known {
            self.selected.clear();
        } else {
            self.selected = known.clone();
        }
    }

    pub fn remove(&mut self, id: u16) -> bool {
        self.selected.remove(&id)
    }

    /// Drop anything the service no longer reports.
    pub fn retain_known(&mut self, known: &BTreeSet<u16>) {
        self.selected.retain(|id| known.contains(id));
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: u16) -> bool {
        self.selected.contains(&id)
    }

    pub fn ids(&self) -> Vec<u16> {
        self.selected.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(ids: &[u16]) -> BTreeSet<u16> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut selection = SelectionModel::new();
        assert!(selection.toggle(8080));
        assert!(selection.contains(8080));
        assert!(!selection.toggle(8080));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_twice_returns_to_empty() {
        let all = known(&[1, 2, 3, 4, 5]);
        let mut selection = SelectionModel::new();

        selection.select_all(&all);
        assert_eq!(selection.len(), 5);

        selection.select_all(&all);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_from_partial_jumps_to_all() {
        let all = known(&[1, 2, 3]);
        let mut selection = SelectionModel::new();
        selection.toggle(2);

        selection.select_all(&all);
        assert_eq!(selection.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_retain_known_prunes_vanished_tunnels() {
        let mut selection = SelectionModel::new();
        selection.select_all(&known(&[1, 2, 3]));

        selection.retain_known(&known(&[2, 3, 4]));
        assert_eq!(selection.ids(), vec![2, 3]);
    }
}
