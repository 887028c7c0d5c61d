//! Root namespaces of the backing store and their symbolic aliases.
//!
//! A [`Hive`] names one of the store's predefined roots. The set is closed:
//! the backing store defines these roots, hivetree only addresses them.
//! Every hive has a short symbolic alias (`HKCU`, `HKLM`, ...) and a native
//! handle value in the `0x8000_00xx` range; both directions of the mapping
//! are total over the closed set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A predefined root namespace of the backing store.
///
/// Hives are supplied by the host environment; constructing one implies
/// nothing about reachability or permissions. Alias lookup is
/// case-insensitive; the reverse direction always produces the canonical
/// short alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hive {
    /// File-association and COM registration scope (`HKCR`).
    ClassesRoot,
    /// Per-user scope of the calling user (`HKCU`).
    CurrentUser,
    /// Machine-wide scope (`HKLM`).
    LocalMachine,
    /// All loaded user profiles (`HKU`).
    Users,
    /// Performance counter namespace (`HKPD`).
    PerformanceData,
    /// Current hardware profile (`HKCC`).
    CurrentConfig,
    /// Dynamic device data (`HKDD`).
    DynData,
}

/// Alias table rows: `(hive, short alias, long alias, native handle)`.
const HIVES: [(Hive, &str, &str, u32); 7] = [
    (Hive::ClassesRoot, "HKCR", "HKEY_CLASSES_ROOT", 0x8000_0000),
    (Hive::CurrentUser, "HKCU", "HKEY_CURRENT_USER", 0x8000_0001),
    (Hive::LocalMachine, "HKLM", "HKEY_LOCAL_MACHINE", 0x8000_0002),
    (Hive::Users, "HKU", "HKEY_USERS", 0x8000_0003),
    (Hive::PerformanceData, "HKPD", "HKEY_PERFORMANCE_DATA", 0x8000_0004),
    (Hive::CurrentConfig, "HKCC", "HKEY_CURRENT_CONFIG", 0x8000_0005),
    (Hive::DynData, "HKDD", "HKEY_DYN_DATA", 0x8000_0006),
];

impl Hive {
    /// Every hive, in native handle order.
    pub const ALL: [Hive; 7] = [
        Hive::ClassesRoot,
        Hive::CurrentUser,
        Hive::LocalMachine,
        Hive::Users,
        Hive::PerformanceData,
        Hive::CurrentConfig,
        Hive::DynData,
    ];

    /// Resolve a symbolic alias, case-insensitively.
    ///
    /// Both the short (`"HKCU"`) and long (`"HKEY_CURRENT_USER"`) spellings
    /// are accepted. Returns `None` for anything outside the closed table.
    pub fn from_alias(alias: &str) -> Option<Hive> {
        HIVES
            .iter()
            .find(|(_, short, long, _)| {
                alias.eq_ignore_ascii_case(short) || alias.eq_ignore_ascii_case(long)
            })
            .map(|(hive, _, _, _)| *hive)
    }

    /// The canonical short alias (`"HKCU"`, `"HKLM"`, ...).
    pub fn alias(&self) -> &'static str {
        self.row().1
    }

    /// The long alias (`"HKEY_CURRENT_USER"`, ...).
    pub fn long_alias(&self) -> &'static str {
        self.row().2
    }

    /// The native handle value for this hive.
    pub fn raw(&self) -> u32 {
        self.row().3
    }

    /// Resolve a native handle value. Returns `None` outside the closed set.
    pub fn from_raw(raw: u32) -> Option<Hive> {
        HIVES
            .iter()
            .find(|(_, _, _, native)| *native == raw)
            .map(|(hive, _, _, _)| *hive)
    }

    fn row(&self) -> &'static (Hive, &'static str, &'static str, u32) {
        HIVES
            .iter()
            .find(|(hive, _, _, _)| hive == self)
            .expect("every hive has a table row")
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_round_trip_covers_every_hive() {
        for hive in Hive::ALL {
            assert_eq!(Hive::from_alias(hive.alias()), Some(hive));
            assert_eq!(Hive::from_alias(hive.long_alias()), Some(hive));
        }
    }

    #[test]
    fn alias_lookup_is_case_insensitive() {
        assert_eq!(Hive::from_alias("hkcu"), Some(Hive::CurrentUser));
        assert_eq!(Hive::from_alias("Hklm"), Some(Hive::LocalMachine));
        assert_eq!(Hive::from_alias("hkey_users"), Some(Hive::Users));
    }

    #[test]
    fn unknown_alias_is_none() {
        assert_eq!(Hive::from_alias(""), None);
        assert_eq!(Hive::from_alias("HKXX"), None);
        assert_eq!(Hive::from_alias("HKEY_CURRENT_USER2"), None);
    }

    #[test]
    fn raw_round_trip_covers_every_hive() {
        for hive in Hive::ALL {
            assert_eq!(Hive::from_raw(hive.raw()), Some(hive));
        }
        assert_eq!(Hive::from_raw(0x8000_0007), None);
        assert_eq!(Hive::from_raw(0), None);
    }

    #[test]
    fn native_handle_values_match_the_store() {
        assert_eq!(Hive::ClassesRoot.raw(), 0x8000_0000);
        assert_eq!(Hive::CurrentUser.raw(), 0x8000_0001);
        assert_eq!(Hive::LocalMachine.raw(), 0x8000_0002);
        assert_eq!(Hive::Users.raw(), 0x8000_0003);
    }

    #[test]
    fn display_is_the_short_alias() {
        assert_eq!(Hive::CurrentUser.to_string(), "HKCU");
        assert_eq!(Hive::DynData.to_string(), "HKDD");
    }
}
