use std::str::FromStr;

use crate::xdr;

pub struct ManageData(xdr::ManageDataOp);

impl ManageData {
    /// `data_value = None` deletes the named entry.
    pub fn new(data_name: &str, data_value: Option<Vec<u8>>) -> Result<Self, xdr::Error> {
        let data_name = xdr::String64(xdr::StringM::from_str(data_name)?);
        let data_value = data_value
            .map(|v| v.try_into().map(xdr::DataValue))
            .transpose()
            .map_err(|_| xdr::Error::Invalid)?;
        Ok(Self(xdr::ManageDataOp {
            data_name,
            data_value,
        }))
    }
}

impl super::Operation for ManageData {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ManageData(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_value_means_delete() {
        let op = ManageData::new("key", None).unwrap();
        assert!(op.0.data_value.is_none());
    }

    #[test]
    fn carries_arbitrary_bytes() {
        let op = ManageData::new("key", Some(vec![1, 2, 3])).unwrap();
        assert!(op.0.data_value.is_some());
    }
}
