use crate::xdr;

/// Builds an `ExtendFootprintTTL` operation carrying a `SorobanResources`
/// whose footprint is exactly the contract-code ledger key; simulation
/// fills in the resource fee (spec §4.9).
pub struct ExtendFootprintTtl(xdr::ExtendFootprintTtlOp);

impl ExtendFootprintTtl {
    pub fn new(extend_to: u32) -> Self {
        Self(xdr::ExtendFootprintTtlOp {
            ext: xdr::ExtensionPoint::V0,
            extend_to,
        })
    }
}

impl super::Operation for ExtendFootprintTtl {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::ExtendFootprintTtl(self.0)
    }
}

/// Restores archived ledger entries named in a transaction's `readWrite`
/// footprint.
pub struct RestoreFootprint(xdr::RestoreFootprintOp);

impl RestoreFootprint {
    pub fn new() -> Self {
        Self(xdr::RestoreFootprintOp {
            ext: xdr::ExtensionPoint::V0,
        })
    }
}

impl Default for RestoreFootprint {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Operation for RestoreFootprint {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::RestoreFootprint(self.0)
    }
}
