use crate::error::{Result, TransportError};

//=====================================================================
// Integer fields of an ACE table are stored as floating point values
// inside XSS. These helpers convert them back, failing on anything that
// is not integral.
//=====================================================================
pub fn float_to_int(value: f64, context: &str) -> Result<i64> {
    let rounded = value.round();
    if !value.is_finite() || (value - rounded).abs() > 1e-6 * rounded.abs().max(1.0) {
        return Err(TransportError::data_integrity(
            context,
            format!("expected an integer value, found {}", value),
        ));
    }
    Ok(rounded as i64)
}

pub fn float_to_index(value: f64, context: &str) -> Result<usize> {
    let value = float_to_int(value, context)?;
    usize::try_from(value).map_err(|_| {
        TransportError::data_integrity(context, format!("expected a non-negative integer, found {}", value))
    })
}

// Fails unless the grid is strictly ascending
pub fn check_ascending(values: &[f64], context: &str) -> Result<()> {
    if let Some(position) = values.windows(2).position(|pair| !(pair[0] < pair[1])) {
        return Err(TransportError::data_integrity(
            context,
            format!(
                "grid is not strictly ascending at index {} ({} >= {})",
                position,
                values[position],
                values[position + 1]
            ),
        ));
    }
    Ok(())
}

// Index i of the bin [grid[i], grid[i+1]] holding value. The caller is
// responsible for value lying inside the grid, values on the last
// point land in the last bin.
#[inline]
pub fn search_bin(grid: &[f64], value: f64) -> usize {
    let upper = grid.partition_point(|&x| x <= value);
    upper.saturating_sub(1).min(grid.len().saturating_sub(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_to_int() {
        assert_eq!(float_to_int(3.0, "test").unwrap(), 3);
        assert_eq!(float_to_int(-19.0, "test").unwrap(), -19);
        assert!(float_to_int(2.5, "test").is_err());
        assert!(float_to_index(-1.0, "test").is_err());
    }

    #[test]
    fn test_check_ascending() {
        assert!(check_ascending(&[1.0, 2.0, 3.0], "grid").is_ok());
        assert!(check_ascending(&[1.0, 1.0, 3.0], "grid").is_err());
        assert!(check_ascending(&[3.0, 2.0], "grid").is_err());
    }

    #[test]
    fn test_search_bin() {
        let grid = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(search_bin(&grid, 1.0), 0);
        assert_eq!(search_bin(&grid, 1.5), 0);
        assert_eq!(search_bin(&grid, 2.0), 1);
        assert_eq!(search_bin(&grid, 7.9), 2);
        assert_eq!(search_bin(&grid, 8.0), 2);
    }
}
