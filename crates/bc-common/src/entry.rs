//! Registry entries.
//!
//! The registry file is one JSON object keyed by business code:
//!
//! ```json
//! {
//!   "076233020": {
//!     "businessCode": "076233020",
//!     "package": "pkgB",
//!     "functionName": "Bar",
//!     "line": "20"
//!   }
//! }
//! ```

use crate::code::BusinessCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Whole registry contents. Sorted so rewrites are stable.
pub type RegistryMap = BTreeMap<BusinessCode, RegistryEntry>;

/// Location a business code was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub business_code: BusinessCode,
    pub package: String,
    pub function_name: String,
    /// Decimal line number, kept as a string in the file.
    pub line: String,
}

impl RegistryEntry {
    pub fn new(
        business_code: BusinessCode,
        package: impl Into<String>,
        function_name: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            business_code,
            package: package.into(),
            function_name: function_name.into(),
            line: line.to_string(),
        }
    }

    /// Line as a number, if the stored string is well formed.
    pub fn line_number(&self) -> Option<u32> {
        self.line.parse().ok()
    }
}

impl fmt::Display for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{} @ {}:{}", self.business_code, self.function_name, self.line)
        } else {
            write!(
                f,
                "{} @ {}::{}:{}",
                self.business_code, self.package, self.function_name, self.line
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_field_names() {
        let entry = RegistryEntry::new(BusinessCode::from_parts(76, 233, 20), "pkgB", "Bar", 20);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["businessCode"], "076233020");
        assert_eq!(value["package"], "pkgB");
        assert_eq!(value["functionName"], "Bar");
        assert_eq!(value["line"], "20");
    }

    #[test]
    fn map_keys_sorted() {
        let mut map = RegistryMap::new();
        for (pkg, line) in [("b", 2), ("a", 1)] {
            let code = BusinessCode::from_parts(if pkg == "a" { 1 } else { 2 }, 0, line);
            map.insert(code.clone(), RegistryEntry::new(code, pkg, "f", line));
        }
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.find("001000001").unwrap() < json.find("002000002").unwrap());
    }

    #[test]
    fn parses_existing_file_layout() {
        let raw = r#"{"001002003":{"businessCode":"001002003","package":"p","functionName":"f","line":"3"}}"#;
        let map: RegistryMap = serde_json::from_str(raw).unwrap();
        let entry = &map[&BusinessCode::from("001002003")];
        assert_eq!(entry.line_number(), Some(3));
        assert_eq!(entry.to_string(), "001002003 @ p::f:3");
    }
}
