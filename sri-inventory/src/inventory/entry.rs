use serde::{Deserialize, Serialize};

/// Where a script is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    /// Served from a third-party origin; never hashed.
    External,
    /// Shipped in the build output.
    Local,
}

/// One row of `scripts-inventory.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Bare file name for local scripts, full URL for external ones.
    pub name: String,
    #[serde(rename = "type")]
    pub script_type: ScriptType,
    /// `sha384-...` digest; `null` for external scripts and for local files
    /// that could not be read.
    pub hash: Option<String>,
    pub reason: String,
}

impl ScriptEntry {
    pub fn local(name: impl Into<String>, hash: Option<String>) -> Self {
        let name = name.into();
        let reason = super::reason::reason_for(&name).to_string();
        ScriptEntry { name, script_type: ScriptType::Local, hash, reason }
    }
    pub fn external(url: impl Into<String>) -> Self {
        let name = url.into();
        let reason = super::reason::reason_for(&name).to_string();
        ScriptEntry { name, script_type: ScriptType::External, hash: None, reason }
    }
    pub fn is_local(&self) -> bool {
        self.script_type == ScriptType::Local
    }
    pub fn is_external(&self) -> bool {
        self.script_type == ScriptType::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_field_and_null_hash() {
        let entry = ScriptEntry::external("https://cdn.example.com/a.js");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"name":"https://cdn.example.com/a.js","type":"external","hash":null,"reason":"Application script"}"#
        );
    }

    #[test]
    fn local_entry_derives_reason() {
        let entry = ScriptEntry::local("vendor.bundle.js", Some("sha384-x".into()));
        assert!(entry.is_local());
        assert_eq!(entry.reason, "Third-party dependencies");
    }
}
