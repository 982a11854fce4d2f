// src/exec/env.rs

//! Environment construction for child processes.

use std::collections::BTreeMap;
use std::ffi::OsString;

/// Snapshot of the current process environment, names and values kept as
/// the OS reports them.
pub fn process_environment() -> BTreeMap<OsString, OsString> {
    std::env::vars_os().collect()
}

/// Overlay `overrides` on top of `base`. On a key conflict the override wins.
///
/// The result is a fresh map; neither input is modified. `base` may hold
/// `String` pairs or raw `OsString` pairs from [`process_environment`].
pub fn merge_environment<K, V, I>(base: I, overrides: &BTreeMap<String, String>) -> BTreeMap<K, V>
where
    I: IntoIterator<Item = (K, V)>,
    K: Ord + From<String>,
    V: From<String>,
{
    let mut merged: BTreeMap<K, V> = base.into_iter().collect();
    merged.extend(
        overrides
            .iter()
            .map(|(k, v)| (K::from(k.clone()), V::from(v.clone()))),
    );
    merged
}
