use serde::{Deserialize, Serialize};

/// Dense index of a day within the configured day set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayIdx(pub u8);

impl DayIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single numbered period in the day, e.g. "block 3".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Block(pub u16);

/// A (day, class-block) pair — the unit of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: DayIdx,
    pub block: Block,
}

impl Slot {
    pub fn new(day: DayIdx, block: Block) -> Self {
        Self { day, block }
    }
}

/// Dense index of a slot within the ascending (day, block) enumeration
/// the Mask Precomputer establishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIdx(pub u32);

impl SlotIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The full weekly grid: ordered day labels and ascending class-block
/// numbers, plus the derived (day, block) -> slot-index enumeration.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    pub day_labels: Vec<String>,
    pub blocks: Vec<Block>,
    slots: Vec<Slot>,
}

impl SlotGrid {
    /// Builds the grid and its ascending (day-index, block-number) slot
    /// enumeration.
    pub fn new(day_labels: Vec<String>, mut blocks: Vec<Block>) -> Self {
        blocks.sort();
        blocks.dedup();
        let mut slots = Vec::with_capacity(day_labels.len() * blocks.len());
        for day in 0..day_labels.len() as u8 {
            for &block in &blocks {
                slots.push(Slot::new(DayIdx(day), block));
            }
        }
        Self {
            day_labels,
            blocks,
            slots,
        }
    }

    pub fn days(&self) -> usize {
        self.day_labels.len()
    }

    pub fn blocks_per_day(&self) -> usize {
        self.blocks.len()
    }

    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_idx(&self, slot: Slot) -> Option<SlotIdx> {
        let day = slot.day.index();
        let block_pos = self.blocks.iter().position(|&b| b == slot.block)?;
        if day >= self.day_labels.len() {
            return None;
        }
        Some(SlotIdx((day * self.blocks.len() + block_pos) as u32))
    }

    pub fn slot_at(&self, idx: SlotIdx) -> Slot {
        self.slots[idx.index()]
    }

    pub fn day_name(&self, day: DayIdx) -> &str {
        self.day_labels
            .get(day.index())
            .map(|s| s.as_str())
            .unwrap_or("Unknown")
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}B{}", self.day.0 + 1, self.block.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ordering_is_ascending_day_then_block() {
        let grid = SlotGrid::new(
            vec!["Mon".into(), "Tue".into()],
            vec![Block(2), Block(1)],
        );
        let slots = grid.slots();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0], Slot::new(DayIdx(0), Block(1)));
        assert_eq!(slots[1], Slot::new(DayIdx(0), Block(2)));
        assert_eq!(slots[2], Slot::new(DayIdx(1), Block(1)));
        assert_eq!(slots[3], Slot::new(DayIdx(1), Block(2)));
    }

    #[test]
    fn slot_idx_round_trips() {
        let grid = SlotGrid::new(vec!["Mon".into(), "Tue".into(), "Wed".into()], vec![Block(1), Block(2)]);
        for &slot in grid.slots() {
            let idx = grid.slot_idx(slot).unwrap();
            assert_eq!(grid.slot_at(idx), slot);
        }
    }
}
