use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::arrays::Arrays;
use crate::blocks::BlockLayout;
use crate::error::{Result, TransportError};

//=====================================================================
// Start and length of one block inside XSS. Absent blocks are (0, 0).
//=====================================================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockEntry {
    pub start: usize,
    pub length: usize,
}

//=====================================================================
// Directory of every block of a table, built once from JXS.
//
// Offsets are converted from 1-based to 0-based, except for the end
// sentinel which marks the last word of the table and is moved one
// past it. Blocks are sorted by offset and each block's length is the
// gap to the next offset, unless the format fixes the length, in which
// case the formula wins and a disagreeing gap is only logged.
//=====================================================================
#[derive(Debug, Clone)]
pub struct BlockDirectory<B: BlockLayout> {
    entries: HashMap<B, BlockEntry>,
    present: HashMap<B, bool>,
}

impl<B: BlockLayout> BlockDirectory<B> {
    pub fn build(arrays: &Arrays) -> Result<Self> {
        let xss = arrays.xss.as_slice();
        let mut entries = HashMap::new();
        let mut present = HashMap::new();
        let mut offsets: Vec<(usize, B)> = Vec::new();

        for block in B::iter() {
            let raw = arrays.jxs.query(block.jxs_index());
            present.insert(block, raw > 0);
            entries.insert(block, BlockEntry::default());
            if raw <= 0 {
                continue;
            }

            let start = if block.is_sentinel() { raw as usize } else { raw as usize - 1 };
            if start > xss.len() {
                return Err(TransportError::data_integrity(
                    format!("table '{}'", arrays.name),
                    format!("{} block starts at {} beyond the {} XSS entries", block, raw, xss.len()),
                ));
            }
            if !block.is_overlapping() {
                offsets.push((start, block));
            }
        }

        // Stable sort keeps the JXS order for blocks sharing an offset
        offsets.sort_by_key(|(start, _)| *start);

        for (i, &(start, block)) in offsets.iter().enumerate() {
            if block.is_sentinel() {
                entries.insert(block, BlockEntry { start, length: 0 });
                continue;
            }
            let next_start = offsets[i + 1..]
                .iter()
                .map(|(offset, _)| *offset)
                .find(|&offset| offset > start)
                .unwrap_or(xss.len());
            let gap = next_start - start;

            let length = match block.formula_length(start, &arrays.nxs, xss)? {
                Some(length) => {
                    if length != gap {
                        log::warn!(
                            "table '{}': {} block spans {} entries by offset but its format requires {}, using {}",
                            arrays.name, block, gap, length, length
                        );
                    }
                    length
                }
                None => gap,
            };
            entries.insert(block, Self::checked_entry(arrays, block, start, length)?);
        }

        // Nested blocks are sized purely from their own data
        for block in B::iter().filter(|block| block.is_overlapping() && present[block]) {
            let start = arrays.jxs.query(block.jxs_index()) as usize - 1;
            let length = block.formula_length(start, &arrays.nxs, xss)?.unwrap_or(0);
            entries.insert(block, Self::checked_entry(arrays, block, start, length)?);
        }

        Ok(Self { entries, present })
    }

    fn checked_entry(arrays: &Arrays, block: B, start: usize, length: usize) -> Result<BlockEntry> {
        if start + length > arrays.xss.len() {
            return Err(TransportError::data_integrity(
                format!("table '{}'", arrays.name),
                format!(
                    "{} block [{}, {}) runs past the {} XSS entries",
                    block,
                    start,
                    start + length,
                    arrays.xss.len()
                ),
            ));
        }
        if length == 0 {
            log::warn!("table '{}': {} block is present but empty", arrays.name, block);
        }
        Ok(BlockEntry { start, length })
    }

    #[inline]
    pub fn entry(&self, block: B) -> BlockEntry {
        self.entries.get(&block).copied().unwrap_or_default()
    }

    #[inline]
    pub fn has_data(&self, block: B) -> bool {
        self.present.get(&block).copied().unwrap_or(false)
    }
}

//=====================================================================
// Zero-copy access to the blocks of a validated table.
//=====================================================================
#[derive(Debug, Clone)]
pub struct BlockExtractor<B: BlockLayout> {
    arrays: Arc<Arrays>,
    directory: BlockDirectory<B>,
    _layout: PhantomData<B>,
}

impl<B: BlockLayout> BlockExtractor<B> {
    pub fn new(arrays: Arrays) -> Result<Self> {
        let directory = BlockDirectory::build(&arrays)?;
        Ok(Self { arrays: Arc::new(arrays), directory, _layout: PhantomData })
    }

    pub fn table_name(&self) -> &str {
        &self.arrays.name
    }

    pub fn arrays(&self) -> &Arrays {
        &self.arrays
    }

    pub fn directory(&self) -> &BlockDirectory<B> {
        &self.directory
    }

    pub fn has_data(&self, block: B) -> bool {
        self.directory.has_data(block)
    }

    // Empty when the block is absent
    pub fn extract_block(&self, block: B) -> &[f64] {
        if !self.has_data(block) {
            return &[];
        }
        let entry = self.directory.entry(block);
        &self.arrays.xss[entry.start..entry.start + entry.length]
    }

    pub fn extract_block_required(&self, block: B) -> Result<&[f64]> {
        if !self.has_data(block) {
            return Err(TransportError::missing_block(self.table_name(), block));
        }
        Ok(self.extract_block(block))
    }

    // Zero-based NXS lookup, 0 out of range
    pub fn query_nxs(&self, index: usize) -> i64 {
        self.arrays.nxs.query(index)
    }

    // Zero-based JXS lookup, 0 out of range
    pub fn query_jxs(&self, index: usize) -> i64 {
        self.arrays.jxs.query(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::arrays::{JXS_LENGTH, NXS_LENGTH};
    use crate::blocks::NeutronBlock;

    fn arrays_with(jxs_entries: &[(NeutronBlock, i64)], nes: i64, ntr: i64, xss: Vec<f64>) -> Arrays {
        let mut nxs = [0i64; NXS_LENGTH];
        nxs[0] = xss.len() as i64;
        nxs[2] = nes;
        nxs[3] = ntr;
        let mut jxs = [0i64; JXS_LENGTH];
        for (block, offset) in jxs_entries {
            jxs[block.jxs_index()] = *offset;
        }
        Arrays::new("directory-test", &nxs, &jxs, xss).unwrap()
    }

    #[test]
    fn test_gap_lengths_and_sentinel() {
        // ESZ (nes = 1 -> 5 entries), MTR (ntr = 2), then an AND block sized by gap
        let xss: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let arrays = arrays_with(
            &[(NeutronBlock::ESZ, 1), (NeutronBlock::MTR, 6), (NeutronBlock::AND, 8), (NeutronBlock::END, 12)],
            1,
            2,
            xss,
        );
        let extractor = BlockExtractor::<NeutronBlock>::new(arrays).unwrap();

        assert_eq!(extractor.directory().entry(NeutronBlock::ESZ), BlockEntry { start: 0, length: 5 });
        assert_eq!(extractor.directory().entry(NeutronBlock::MTR), BlockEntry { start: 5, length: 2 });
        assert_eq!(extractor.extract_block(NeutronBlock::AND), &[7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(extractor.directory().entry(NeutronBlock::END), BlockEntry { start: 12, length: 0 });
    }

    #[test]
    fn test_absent_blocks() {
        let arrays = arrays_with(&[(NeutronBlock::ESZ, 1)], 1, 0, vec![1.0; 5]);
        let extractor = BlockExtractor::<NeutronBlock>::new(arrays).unwrap();

        assert!(!extractor.has_data(NeutronBlock::SIG));
        assert!(extractor.extract_block(NeutronBlock::SIG).is_empty());
        assert_eq!(extractor.directory().entry(NeutronBlock::SIG), BlockEntry { start: 0, length: 0 });
        assert!(matches!(
            extractor.extract_block_required(NeutronBlock::SIG),
            Err(TransportError::MissingBlock { ref block, .. }) if block == "SIG"
        ));
    }

    #[test]
    fn test_formula_overrides_gap() {
        // MTR claims 2 entries but the gap to AND is 4
        let arrays = arrays_with(&[(NeutronBlock::MTR, 1), (NeutronBlock::AND, 5)], 0, 2, vec![0.0; 8]);
        let extractor = BlockExtractor::<NeutronBlock>::new(arrays).unwrap();
        assert_eq!(extractor.extract_block(NeutronBlock::MTR).len(), 2);
        assert_eq!(extractor.extract_block(NeutronBlock::AND).len(), 4);
    }

    #[test]
    fn test_fission_block_is_sized_from_its_data() {
        // SIG covers everything, FIS sits inside it: IE = 1, NE = 2
        let xss = vec![9.0, 9.0, 1.0, 2.0, 0.5, 0.7, 9.0, 9.0];
        let arrays = arrays_with(&[(NeutronBlock::SIG, 1), (NeutronBlock::FIS, 3)], 0, 0, xss);
        let extractor = BlockExtractor::<NeutronBlock>::new(arrays).unwrap();
        assert_eq!(extractor.extract_block(NeutronBlock::SIG).len(), 8);
        assert_eq!(extractor.extract_block(NeutronBlock::FIS), &[1.0, 2.0, 0.5, 0.7]);
    }

    #[test]
    fn test_block_past_the_end_is_an_integrity_error() {
        let arrays = arrays_with(&[(NeutronBlock::ESZ, 1)], 2, 0, vec![0.0; 6]);
        assert!(matches!(
            BlockExtractor::<NeutronBlock>::new(arrays),
            Err(TransportError::DataIntegrity { .. })
        ));
    }

    #[test]
    fn test_lenient_queries() {
        let arrays = arrays_with(&[(NeutronBlock::ESZ, 1)], 1, 0, vec![0.0; 5]);
        let extractor = BlockExtractor::<NeutronBlock>::new(arrays).unwrap();
        assert_eq!(extractor.query_nxs(2), 1);
        assert_eq!(extractor.query_nxs(100), 0);
        assert_eq!(extractor.query_jxs(0), 1);
        assert_eq!(extractor.query_jxs(64), 0);
    }
}
