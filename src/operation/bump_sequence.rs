use crate::xdr;

pub struct BumpSequence(xdr::BumpSequenceOp);

impl BumpSequence {
    pub fn new(bump_to: i64) -> Self {
        Self(xdr::BumpSequenceOp {
            bump_to: xdr::SequenceNumber(bump_to),
        })
    }
}

impl super::Operation for BumpSequence {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::BumpSequence(self.0)
    }
}
