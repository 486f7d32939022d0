//! Fixed-capacity socket slot table
//!
//! Hands out hardware socket numbers without allocation. Allocation always
//! returns the lowest free index, which keeps socket numbering deterministic.

use wifi_hal_abstractions::SocketId;

use super::error::NetworkError;

/// Registry of in-use hardware socket numbers
#[derive(Debug, Clone)]
pub struct SlotTable<const N: usize> {
    in_use: [bool; N],
}

impl<const N: usize> SlotTable<N> {
    pub const fn new() -> Self {
        Self { in_use: [false; N] }
    }

    /// Claim the lowest free slot
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::NoSocket` if every slot is taken; the table is
    /// left unchanged.
    pub fn allocate(&mut self) -> Result<SocketId, NetworkError> {
        let index = self
            .in_use
            .iter()
            .position(|used| !used)
            .ok_or(NetworkError::NoSocket)?;
        self.in_use[index] = true;
        Ok(SocketId::new(index as u8))
    }

    /// Mark a slot free. Releasing a free slot is a no-op.
    pub fn release(&mut self, id: SocketId) {
        if let Some(slot) = self.in_use.get_mut(id.index()) {
            *slot = false;
        }
    }

    pub fn is_in_use(&self, id: SocketId) -> bool {
        self.in_use.get(id.index()).copied().unwrap_or(false)
    }

    /// Number of slots currently claimed
    pub fn in_use_count(&self) -> usize {
        self.in_use.iter().filter(|used| **used).count()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for SlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_free_first() {
        let mut table = SlotTable::<4>::new();
        assert_eq!(table.allocate(), Ok(SocketId::new(0)));
        assert_eq!(table.allocate(), Ok(SocketId::new(1)));
        assert_eq!(table.allocate(), Ok(SocketId::new(2)));

        table.release(SocketId::new(1));
        assert_eq!(table.allocate(), Ok(SocketId::new(1)));
        assert_eq!(table.allocate(), Ok(SocketId::new(3)));
    }

    #[test]
    fn test_exhaustion_leaves_table_unchanged() {
        let mut table = SlotTable::<2>::new();
        table.allocate().unwrap();
        table.allocate().unwrap();

        assert_eq!(table.allocate(), Err(NetworkError::NoSocket));
        assert_eq!(table.in_use_count(), 2);
        assert!(table.is_in_use(SocketId::new(0)));
        assert!(table.is_in_use(SocketId::new(1)));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut table = SlotTable::<2>::new();
        let id = table.allocate().unwrap();
        table.release(id);
        table.release(id);
        assert_eq!(table.in_use_count(), 0);

        // Out-of-range ids are ignored
        table.release(SocketId::new(9));
        assert_eq!(table.in_use_count(), 0);
    }

    #[test]
    fn test_no_shared_slots_across_churn() {
        let mut table = SlotTable::<3>::new();
        let mut live: heapless::Vec<SocketId, 3> = heapless::Vec::new();

        for round in 0..20 {
            if round % 3 == 2 {
                if let Some(id) = live.pop() {
                    table.release(id);
                }
            } else if let Ok(id) = table.allocate() {
                assert!(!live.contains(&id), "slot {:?} handed out twice", id);
                live.push(id).unwrap();
            }
            assert_eq!(table.in_use_count(), live.len());
        }
    }
}
