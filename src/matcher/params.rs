use crate::pattern::CaptureList;
use crate::types::Params;

/// Pairs capture values with their names; missing captures are left out.
pub(crate) fn captures_to_params(names: &[String], values: &CaptureList<'_>) -> Params {
    let mut map = Params::with_capacity(names.len());
    for (name, value) in names.iter().zip(values.iter()) {
        if let Some(value) = value {
            map.insert(name.clone(), (*value).to_string());
        }
    }
    map
}
