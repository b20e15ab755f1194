use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::backend::{LedgerStore, StoreError};
use crate::core::{AssetError, AssetService, TxContext};

/// Entry points of the service surface, by the names callers invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    InitLedger,
    CreateAsset,
    ReadAsset,
    UpdateAsset,
    DeleteAsset,
    AssetExists,
    TransferAsset,
    GetAllAssets
}

impl Function {
    pub const ALL: [Function; 8] = [
        Function::InitLedger,
        Function::CreateAsset,
        Function::ReadAsset,
        Function::UpdateAsset,
        Function::DeleteAsset,
        Function::AssetExists,
        Function::TransferAsset,
        Function::GetAllAssets
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreateAsset => "CreateAsset",
            Function::ReadAsset => "ReadAsset",
            Function::UpdateAsset => "UpdateAsset",
            Function::DeleteAsset => "DeleteAsset",
            Function::AssetExists => "AssetExists",
            Function::TransferAsset => "TransferAsset",
            Function::GetAllAssets => "GetAllAssets"
        }
    }

    /// Number of string arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Function::InitLedger | Function::GetAllAssets => 0,
            Function::CreateAsset | Function::ReadAsset
                | Function::DeleteAsset | Function::AssetExists => 1,
            Function::TransferAsset => 2,
            Function::UpdateAsset => 5
        }
    }

    /// Read-only functions never have their writes committed.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Function::ReadAsset | Function::AssetExists | Function::GetAllAssets)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Function {
    type Err = InvokeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name == "SeedLedger" {
            return Ok(Function::InitLedger);
        }
        Function::ALL.iter()
            .find(|function| function.name() == name)
            .copied()
            .ok_or_else(|| InvokeError::UnknownFunction(name.to_owned()))
    }
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("{function} takes {expected} arguments, got {got}")]
    Arity {
        function: Function,
        expected: usize,
        got: usize
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// The staged writes could not be persisted and were dropped.
    #[error("failed to commit {function}: {source}")]
    Commit {
        function: Function,
        #[source]
        source: StoreError
    }
}

/// Runs `function` against the context and renders its result as the
/// response payload. Argument checks happen before any store call.
pub fn call<S: LedgerStore>(
    service: &AssetService,
    ctx: &mut TxContext<S>,
    function: Function,
    args: &[String]
) -> Result<Vec<u8>, InvokeError> {
    if args.len() != function.arity() {
        return Err(InvokeError::Arity { function, expected: function.arity(), got: args.len() });
    }

    let payload = match function {
        Function::InitLedger => {
            service.init_ledger(ctx)?;
            Vec::new()
        },
        Function::CreateAsset => service.create_asset(ctx, args[0].as_bytes())?,
        Function::ReadAsset => service.read_asset(ctx, &args[0])?,
        Function::UpdateAsset => {
            service.update_asset(ctx, &args[0], &args[1], &args[2], &args[3], &args[4])?;
            Vec::new()
        },
        Function::DeleteAsset => {
            service.delete_asset(ctx, &args[0])?;
            Vec::new()
        },
        Function::AssetExists => service.asset_exists(ctx, &args[0])?.to_string().into_bytes(),
        Function::TransferAsset => {
            service.transfer_asset(ctx, &args[0], &args[1])?;
            Vec::new()
        },
        Function::GetAllAssets => {
            let entries = service.get_all_assets(ctx)?;
            serde_json::to_vec(&entries)
                .map_err(|source| AssetError::Encode { id: "*".to_string(), source })?
        }
    };
    Ok(payload)
}


#[cfg(test)]
mod tests {
    use crate::backend::MemoryStore;
    use crate::core::{AssetError, AssetService, TxContext};
    use crate::host::dispatch::{self, Function, InvokeError};

    use rstest::rstest;
    use serde_json::json;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[rstest]
    #[case("InitLedger", Function::InitLedger)]
    #[case("SeedLedger", Function::InitLedger)]
    #[case("TransferAsset", Function::TransferAsset)]
    #[case("GetAllAssets", Function::GetAllAssets)]
    fn parse_names(#[case] name: &str, #[case] expected: Function) {
        assert_eq!(name.parse::<Function>().unwrap(), expected);
    }

    #[test]
    fn names_round_trip() {
        for function in Function::ALL {
            assert_eq!(function.name().parse::<Function>().unwrap(), function);
        }
    }

    #[rstest]
    #[case("readAsset")]
    #[case("")]
    #[case("DropTable")]
    fn unknown_names(#[case] name: &str) {
        assert!(matches!(name.parse::<Function>(), Err(InvokeError::UnknownFunction(_))));
    }

    #[rstest]
    #[case(Function::ReadAsset, vec![])]
    #[case(Function::UpdateAsset, vec!["1", "red"])]
    #[case(Function::GetAllAssets, vec!["extra"])]
    fn arity_is_checked_before_the_store(#[case] function: Function, #[case] given: Vec<&str>) {
        let mut store = MemoryStore::new();
        let mut ctx = TxContext::new("tx", &mut store);

        let res = dispatch::call(&AssetService::new(), &mut ctx, function, &args(&given));
        assert!(matches!(res, Err(InvokeError::Arity { got, .. }) if got == given.len()));
    }

    #[test]
    fn full_lifecycle() {
        let service = AssetService::new();
        let mut store = MemoryStore::new();
        let mut ctx = TxContext::new("tx", &mut store);

        let created = dispatch::call(&service, &mut ctx, Function::CreateAsset,
            &args(&[r#"{"ID":"car1","make":"Toyota"}"#])).unwrap();
        assert_eq!(created, br#"{"ID":"car1","make":"Toyota"}"#.to_vec());

        let exists = dispatch::call(&service, &mut ctx, Function::AssetExists, &args(&["car1"])).unwrap();
        assert_eq!(exists, b"true".to_vec());

        dispatch::call(&service, &mut ctx, Function::TransferAsset, &args(&["car1", "Dave"])).unwrap();
        let all = dispatch::call(&service, &mut ctx, Function::GetAllAssets, &[]).unwrap();
        let all: serde_json::Value = serde_json::from_slice(&all).unwrap();
        assert_eq!(all, json!([{"Key": "car1", "Record": {"ID": "car1", "make": "Toyota", "owner": "Dave"}}]));

        dispatch::call(&service, &mut ctx, Function::DeleteAsset, &args(&["car1"])).unwrap();
        let exists = dispatch::call(&service, &mut ctx, Function::AssetExists, &args(&["car1"])).unwrap();
        assert_eq!(exists, b"false".to_vec());

        let res = dispatch::call(&service, &mut ctx, Function::ReadAsset, &args(&["car1"]));
        assert!(matches!(res, Err(InvokeError::Asset(AssetError::NotFound(_)))));
    }
}
