/// One bit per member, set when the member was mutated since the last diff
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffMask {
    mask: Vec<u8>,
}

impl DiffMask {
    /// Creates a mask able to hold `bit_length` members, all clear
    pub fn new(bit_length: u8) -> Self {
        let byte_length = (usize::from(bit_length) + 7) / 8;
        Self {
            mask: vec![0; byte_length],
        }
    }

    pub fn bit(&self, index: u8) -> Option<bool> {
        let byte = self.mask.get(usize::from(index / 8))?;
        Some(byte & (1 << (index % 8)) != 0)
    }

    /// Sets or clears a bit. Indices beyond the mask are ignored.
    pub fn set_bit(&mut self, index: u8, bit: bool) {
        let Some(byte) = self.mask.get_mut(usize::from(index / 8)) else {
            return;
        };
        let flag = 1 << (index % 8);
        if bit {
            *byte |= flag;
        } else {
            *byte &= !flag;
        }
    }

    pub fn clear(&mut self) {
        self.mask.iter_mut().for_each(|byte| *byte = 0);
    }

    pub fn is_clear(&self) -> bool {
        self.mask.iter().all(|byte| *byte == 0)
    }

    pub fn byte_length(&self) -> usize {
        self.mask.len()
    }

    pub fn or(&mut self, other: &DiffMask) {
        for (byte, other_byte) in self.mask.iter_mut().zip(other.mask.iter()) {
            *byte |= other_byte;
        }
    }

    /// Indices of every set bit, ascending
    pub fn set_indices(&self) -> Vec<u8> {
        let bit_count = self.mask.len() * 8;
        (0..bit_count)
            .filter_map(|index| u8::try_from(index).ok())
            .filter(|index| self.bit(*index) == Some(true))
            .collect()
    }
}
