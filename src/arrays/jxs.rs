use crate::error::{Result, TransportError};

pub const JXS_LENGTH: usize = 32;

//=====================================================================
// Represents the complete JXS array from an ACE file. This array
// contains the 1-based starting indices of all data blocks in the XSS
// array. If a block is not present, the starting index is reported as 0.
//=====================================================================
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JxsArray(pub [i64; JXS_LENGTH]);

impl JxsArray {
    pub fn from_raw(values: &[i64], table_name: &str) -> Result<Self> {
        let array: [i64; JXS_LENGTH] = values.try_into().map_err(|_| {
            TransportError::invalid_table(
                table_name,
                format!("JXS must hold {} entries, found {}", JXS_LENGTH, values.len()),
            )
        })?;
        Ok(Self(array))
    }

    // Zero-based lookup, out of range indices read as 0
    #[inline]
    pub fn query(&self, index: usize) -> i64 {
        self.0.get(index).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query() {
        let mut raw = [0i64; JXS_LENGTH];
        raw[0] = 1;
        raw[21] = 57;
        let jxs = JxsArray::from_raw(&raw, "test").unwrap();
        assert_eq!(jxs.query(0), 1);
        assert_eq!(jxs.query(21), 57);
        assert_eq!(jxs.query(32), 0);
        assert!(JxsArray::from_raw(&raw[..31], "test").is_err());
    }
}
