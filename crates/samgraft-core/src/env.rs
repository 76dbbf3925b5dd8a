use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// Region variable `chalice package` needs to be present.
pub const REGION_VAR: &str = "AWS_DEFAULT_REGION";

/// Region used when the caller has not set [`REGION_VAR`].
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment handed to a local build process.
///
/// Built once per packaging run from a snapshot of the current process
/// environment and passed explicitly to the child; the process environment
/// itself is never modified.
///
/// # Examples
///
/// ```
/// use samgraft_core::{BuildEnv, DEFAULT_REGION, REGION_VAR};
///
/// let env = BuildEnv::from_vars([("HOME".to_owned(), "/home/me".to_owned())]);
/// assert_eq!(env.get(REGION_VAR), Some(DEFAULT_REGION));
/// assert_eq!(env.get("HOME"), Some("/home/me"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    vars: BTreeMap<OsString, OsString>,
}

impl BuildEnv {
    /// Snapshot of the current process environment with the region default
    /// applied. Names and values are kept as raw OS strings, so nothing is
    /// lost for the child.
    pub fn inherit() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Builds an environment from explicit variables, then applies the
    /// region default.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self::from_os_vars(
            vars.into_iter()
                .map(|(key, value)| (OsString::from(key), OsString::from(value))),
        )
    }

    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        let mut vars: BTreeMap<OsString, OsString> = vars.into_iter().collect();
        apply_region_default(&mut vars);
        Self { vars }
    }

    /// The value of `key`, if set and valid UTF-8.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn vars(&self) -> &BTreeMap<OsString, OsString> {
        &self.vars
    }
}

/// Sets [`REGION_VAR`] to [`DEFAULT_REGION`] unless a value is already
/// present. An existing value is never replaced.
pub fn apply_region_default<K, V>(vars: &mut BTreeMap<K, V>)
where
    K: Ord + From<&'static str>,
    V: From<&'static str>,
{
    vars.entry(K::from(REGION_VAR))
        .or_insert_with(|| V::from(DEFAULT_REGION));
}
