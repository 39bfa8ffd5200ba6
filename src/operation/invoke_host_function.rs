use crate::xdr;

/// Carries a `HostFunction` (Wasm upload, CreateContract, InvokeContract)
/// and a `Vec<SorobanAuthorizationEntry>`, which may be empty at build time
/// and filled in after simulation (spec §4.5, §4.9).
pub struct InvokeHostFunction(xdr::InvokeHostFunctionOp);

impl InvokeHostFunction {
    pub fn new(host_function: xdr::HostFunction, auth: Vec<xdr::SorobanAuthorizationEntry>) -> Result<Self, xdr::Error> {
        Ok(Self(xdr::InvokeHostFunctionOp {
            host_function,
            auth: auth.try_into()?,
        }))
    }

    pub fn invoke_contract(
        contract_address: xdr::ScAddress,
        function_name: xdr::ScSymbol,
        args: Vec<xdr::ScVal>,
    ) -> Result<Self, xdr::Error> {
        Self::new(
            xdr::HostFunction::InvokeContract(xdr::InvokeContractArgs {
                contract_address,
                function_name,
                args: args.try_into()?,
            }),
            vec![],
        )
    }

    pub fn upload_wasm(wasm: Vec<u8>) -> Result<Self, xdr::Error> {
        Self::new(xdr::HostFunction::UploadContractWasm(wasm.try_into()?), vec![])
    }

    #[must_use]
    pub fn with_auth(mut self, auth: Vec<xdr::SorobanAuthorizationEntry>) -> Result<Self, xdr::Error> {
        self.0.auth = auth.try_into()?;
        Ok(self)
    }
}

impl super::Operation for InvokeHostFunction {
    fn build_body(self) -> xdr::OperationBody {
        xdr::OperationBody::InvokeHostFunction(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_contract_starts_with_empty_auth() {
        let contract = xdr::ScAddress::Contract(xdr::Hash([1u8; 32]));
        let op = InvokeHostFunction::invoke_contract(
            contract,
            xdr::ScSymbol("hello".try_into().unwrap()),
            vec![],
        )
        .unwrap();
        assert!(op.0.auth.is_empty());
    }

    #[test]
    fn empty_arg_list_encodes_as_length_zero_vector_not_omitted() {
        let contract = xdr::ScAddress::Contract(xdr::Hash([1u8; 32]));
        let op = InvokeHostFunction::invoke_contract(
            contract,
            xdr::ScSymbol("hello".try_into().unwrap()),
            vec![],
        )
        .unwrap();
        if let xdr::HostFunction::InvokeContract(args) = &op.0.host_function {
            assert_eq!(args.args.len(), 0);
        } else {
            panic!("expected InvokeContract");
        }
    }
}
