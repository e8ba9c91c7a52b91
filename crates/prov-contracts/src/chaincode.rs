//! Function-name dispatch.
//!
//! Hosts deliver an invocation as a function name plus string arguments.
//! [`Chaincode::invoke`] checks the name and arity, routes to the contract
//! operation, and returns the JSON-encoded result. Mutations return an
//! empty payload.

use std::str::FromStr;

use prov_core::codec::encode_payload;
use prov_core::ContractError;
use prov_ledger::TransactionContext;

use crate::asset::AssetContract;
use crate::config::{ConfigError, ContractConfig};
use crate::product::ProductContract;

/// Every function the chaincode exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractFunction {
    /// `(id, owner[, metadataHash])`
    CreateAsset,
    /// `(id, event)`, alias of `AppendEvent`.
    UpdateAsset,
    /// `(id, event)`
    AppendEvent,
    /// `(id, receiptHash)`
    FinalizeAsset,
    /// `(id)`
    ReadAsset,
    /// `(id)`
    AssetExists,
    /// `(productId, farmerDetails, productDetails)`
    RegisterProduct,
    /// `(productId, role, name, location[, handlingInfo])`
    TransferOwnership,
    /// `(productId[, consumerInfo])`
    CompleteProduct,
    /// `(productId)`
    GetProductHistory,
    /// No arguments.
    GetAllProducts,
    /// `(productId)`
    ProductExists,
}

impl ContractFunction {
    /// Every function, in dispatch-table order.
    pub const ALL: [Self; 12] = [
        Self::CreateAsset,
        Self::UpdateAsset,
        Self::AppendEvent,
        Self::FinalizeAsset,
        Self::ReadAsset,
        Self::AssetExists,
        Self::RegisterProduct,
        Self::TransferOwnership,
        Self::CompleteProduct,
        Self::GetProductHistory,
        Self::GetAllProducts,
        Self::ProductExists,
    ];

    /// The wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAsset => "CreateAsset",
            Self::UpdateAsset => "UpdateAsset",
            Self::AppendEvent => "AppendEvent",
            Self::FinalizeAsset => "FinalizeAsset",
            Self::ReadAsset => "ReadAsset",
            Self::AssetExists => "AssetExists",
            Self::RegisterProduct => "RegisterProduct",
            Self::TransferOwnership => "TransferOwnership",
            Self::CompleteProduct => "CompleteProduct",
            Self::GetProductHistory => "GetProductHistory",
            Self::GetAllProducts => "GetAllProducts",
            Self::ProductExists => "ProductExists",
        }
    }

    /// Accepted argument count as `(min, max)`. Trailing optional
    /// arguments default to the empty string.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Self::CreateAsset => (2, 3),
            Self::UpdateAsset | Self::AppendEvent | Self::FinalizeAsset => (2, 2),
            Self::ReadAsset | Self::AssetExists => (1, 1),
            Self::RegisterProduct => (3, 3),
            Self::TransferOwnership => (4, 5),
            Self::CompleteProduct => (1, 2),
            Self::GetProductHistory | Self::ProductExists => (1, 1),
            Self::GetAllProducts => (0, 0),
        }
    }

    /// Whether the function only reads and can be evaluated without commit.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::ReadAsset
                | Self::AssetExists
                | Self::GetProductHistory
                | Self::GetAllProducts
                | Self::ProductExists
        )
    }

    fn check_arity(&self, args: &[String]) -> Result<(), ContractError> {
        let (min, max) = self.arity();
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(ContractError::invalid_argument(
                "args",
                format!("{} takes {expected} arguments, got {}", self.name(), args.len()),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractFunction {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ContractError::invalid_argument("function", format!("unknown function {s:?}")))
    }
}

/// Both contracts behind one entry point.
#[derive(Debug, Clone)]
pub struct Chaincode {
    assets: AssetContract,
    products: ProductContract,
}

impl Chaincode {
    pub fn new(config: &ContractConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            assets: AssetContract::new(config)?,
            products: ProductContract::new(),
        })
    }

    pub fn assets(&self) -> &AssetContract {
        &self.assets
    }

    pub fn products(&self) -> &ProductContract {
        &self.products
    }

    /// Route `function` with `args`.
    pub fn invoke<C>(
        &self,
        ctx: &mut C,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let function: ContractFunction = function.parse()?;
        function.check_arity(args)?;
        tracing::debug!(%function, args = args.len(), tx_id = ctx.stub().tx_id(), "dispatching");

        let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or("");
        let assets = &self.assets;
        let products = &self.products;

        match function {
            ContractFunction::CreateAsset => {
                assets.create_asset(ctx, arg(0), arg(1), arg(2))?;
                Ok(Vec::new())
            }
            ContractFunction::UpdateAsset => {
                assets.update_asset(ctx, arg(0), arg(1))?;
                Ok(Vec::new())
            }
            ContractFunction::AppendEvent => {
                assets.append_event(ctx, arg(0), arg(1))?;
                Ok(Vec::new())
            }
            ContractFunction::FinalizeAsset => {
                assets.finalize_asset(ctx, arg(0), arg(1))?;
                Ok(Vec::new())
            }
            ContractFunction::ReadAsset => Ok(encode_payload(&assets.read_asset(ctx, arg(0))?)?),
            ContractFunction::AssetExists => {
                Ok(encode_payload(&assets.asset_exists(ctx, arg(0))?)?)
            }
            ContractFunction::RegisterProduct => {
                products.register_product(ctx, arg(0), arg(1), arg(2))?;
                Ok(Vec::new())
            }
            ContractFunction::TransferOwnership => {
                products.transfer_ownership(ctx, arg(0), arg(1), arg(2), arg(3), arg(4))?;
                Ok(Vec::new())
            }
            ContractFunction::CompleteProduct => {
                products.complete_product(ctx, arg(0), arg(1))?;
                Ok(Vec::new())
            }
            ContractFunction::GetProductHistory => Ok(encode_payload(
                &products.get_product_history(ctx, arg(0))?,
            )?),
            ContractFunction::GetAllProducts => {
                Ok(encode_payload(&products.get_all_products(ctx)?)?)
            }
            ContractFunction::ProductExists => {
                Ok(encode_payload(&products.product_exists(ctx, arg(0))?)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_core::{ErrorKind, MspId};
    use prov_ledger::{ClientIdentity, MemoryLedger};

    fn caller() -> ClientIdentity {
        ClientIdentity::new(MspId::new("Org2MSP").unwrap(), "retailer")
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn call(
        ledger: &MemoryLedger,
        cc: &Chaincode,
        function: &str,
        list: &[&str],
    ) -> Result<Vec<u8>, ContractError> {
        let a = args(list);
        ledger.invoke(caller(), |ctx| cc.invoke(ctx, function, &a))
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for f in ContractFunction::ALL {
            assert_eq!(f.name().parse::<ContractFunction>().unwrap(), f);
        }
        let err = "DeleteAsset".parse::<ContractFunction>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn read_only_set() {
        let ro: Vec<&str> = ContractFunction::ALL
            .iter()
            .filter(|f| f.is_read_only())
            .map(|f| f.name())
            .collect();
        assert_eq!(
            ro,
            vec!["ReadAsset", "AssetExists", "GetProductHistory", "GetAllProducts", "ProductExists"]
        );
    }

    #[test]
    fn asset_flow_through_dispatch() {
        let ledger = MemoryLedger::new();
        let cc = Chaincode::new(&ContractConfig::default()).unwrap();
        assert!(call(&ledger, &cc, "CreateAsset", &["A1", "alice", "h1"])
            .unwrap()
            .is_empty());
        call(&ledger, &cc, "AppendEvent", &["A1", r#"{"note":"x"}"#]).unwrap();
        call(&ledger, &cc, "FinalizeAsset", &["A1", "r1"]).unwrap();

        let out = call(&ledger, &cc, "ReadAsset", &["A1"]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["status"], "CLOSED");
        assert_eq!(json["events"][1], r#"{"note":"x"}"#);

        assert_eq!(call(&ledger, &cc, "AssetExists", &["A1"]).unwrap(), b"true");
        assert_eq!(call(&ledger, &cc, "AssetExists", &["A2"]).unwrap(), b"false");
    }

    #[test]
    fn optional_trailing_args_default_empty() {
        let ledger = MemoryLedger::new();
        let cc = Chaincode::new(&ContractConfig::default()).unwrap();
        call(&ledger, &cc, "CreateAsset", &["A1", "alice"]).unwrap();
        call(
            &ledger,
            &cc,
            "RegisterProduct",
            &[
                "P1",
                r#"{"name":"F","location":"L"}"#,
                r#"{"productType":"Apples","batchSize":"10 crates","harvestDate":"2024-09-01"}"#,
            ],
        )
        .unwrap();
        call(&ledger, &cc, "TransferOwnership", &["P1", "Retailer", "Shop", "SF"]).unwrap();
        call(&ledger, &cc, "CompleteProduct", &["P1"]).unwrap();

        let out = call(&ledger, &cc, "GetProductHistory", &["P1"]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["transactions"][1]["handlingInfo"], "Ownership transferred to Retailer");
        assert_eq!(json["transactions"][2]["role"], "Consumer");

        let all = call(&ledger, &cc, "GetAllProducts", &[]).unwrap();
        let all: Vec<serde_json::Value> = serde_json::from_slice(&all).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn wrong_arity_rejected_before_touching_state() {
        let ledger = MemoryLedger::new();
        let cc = Chaincode::new(&ContractConfig::default()).unwrap();
        let err = call(&ledger, &cc, "CreateAsset", &["A1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("CreateAsset takes 2 to 3 arguments, got 1"));
        let err = call(&ledger, &cc, "GetAllProducts", &["x"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(ledger.is_empty());
    }
}
