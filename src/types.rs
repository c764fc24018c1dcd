use std::collections::HashMap;

/// Extracted path parameters keyed by parameter name.
pub type Params = HashMap<String, String>;
