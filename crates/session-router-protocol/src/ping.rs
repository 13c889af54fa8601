use serde::{Deserialize, Serialize};

/// The `{}` result of `ping` and `logging/setLevel`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyResult {}
