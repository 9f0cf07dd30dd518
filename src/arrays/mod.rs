mod jxs;
mod nxs;

use std::sync::Arc;

use crate::error::{Result, TransportError};

pub use jxs::{JXS_LENGTH, JxsArray};
pub use nxs::{ElectronPhotonNxs, NXS_LENGTH, NeutronNxs, NxsArray};

//=====================================================================
// A validated raw ACE table: the NXS/JXS control arrays and the XSS
// data array they describe. XSS is shared so that extracted blocks
// can borrow from it without copying.
//=====================================================================
#[derive(Clone, Debug)]
pub struct Arrays {
    pub name: String,
    pub nxs: NxsArray,
    pub jxs: JxsArray,
    pub xss: Arc<Vec<f64>>,
}

impl Arrays {
    pub fn new(name: impl Into<String>, nxs: &[i64], jxs: &[i64], xss: Vec<f64>) -> Result<Self> {
        let name = name.into();
        let nxs = NxsArray::from_raw(nxs, &name)?;
        let jxs = JxsArray::from_raw(jxs, &name)?;

        if nxs.query(0) < 0 || nxs.query(0) as usize != xss.len() {
            return Err(TransportError::invalid_table(
                &name,
                format!("NXS(1) declares {} XSS entries, found {}", nxs.query(0), xss.len()),
            ));
        }

        Ok(Self { name, nxs, jxs, xss: Arc::new(xss) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xss_length_must_match_nxs() {
        let mut nxs = [0i64; NXS_LENGTH];
        nxs[0] = 4;
        let jxs = [0i64; JXS_LENGTH];
        assert!(Arrays::new("ok", &nxs, &jxs, vec![0.0; 4]).is_ok());

        let err = Arrays::new("bad", &nxs, &jxs, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, TransportError::InvalidTable { ref table, .. } if table == "bad"));
    }
}
