//! Stored SNMP walks, table extraction, and device detection
//!
//! The live SNMP transport belongs to the surrounding monitoring engine, not
//! to the plugins. Plugins see a [`SnmpWalk`]: the OID→value map produced by
//! walking a device once, loaded here from the usual `snmpwalk`/stored-walk
//! dump formats. From a walk they fetch [`StringTable`]s (rows of a
//! conceptual SNMP table, missing cells empty) and evaluate [`Detect`]
//! predicates over well-known scalars to decide whether they apply to the
//! device at all.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

use derive_more::From;

/// `sysDescr.0`
pub const SYS_DESCR: &str = ".1.3.6.1.2.1.1.1.0";
/// `sysObjectID.0`
pub const SYS_OBJECT_ID: &str = ".1.3.6.1.2.1.1.2.0";

/// Rows of string cells, the raw material every SNMP parse step starts from.
pub type StringTable = Vec<Vec<String>>;

/// A dotted numeric OID. Ordering is numeric per component, which is what
/// SNMP row ordering needs (`.1.3.6.1.10` sorts after `.1.3.6.1.9`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn is_prefix_of(&self, other: &Oid) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// The OID with `suffix` appended.
    pub fn join(&self, suffix: &Oid) -> Oid {
        let mut components = self.0.clone();
        components.extend_from_slice(&suffix.0);
        Oid(components)
    }

    /// The components of `self` past the prefix, if it is one.
    pub fn strip_prefix(&self, prefix: &Oid) -> Option<Oid> {
        if prefix.is_prefix_of(self) {
            Some(Oid(self.0[prefix.0.len()..].to_vec()))
        } else {
            None
        }
    }

    /// The smallest OID greater than every OID under `self`. Used as the
    /// exclusive end of subtree range scans.
    fn subtree_end(&self) -> Oid {
        let mut components = self.0.clone();
        if let Some(last) = components.last_mut() {
            *last += 1;
        }
        Oid(components)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for component in &self.0 {
            write!(f, ".{}", component)?;
        }
        Ok(())
    }
}

#[derive(Debug, From)]
pub enum ParseOidError {
    Empty,
    InvalidComponent(ParseIntError),
}

impl fmt::Display for ParseOidError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseOidError::Empty => write!(f, "empty OID"),
            ParseOidError::InvalidComponent(e) => write!(f, "invalid OID component: {}", e),
        }
    }
}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Oid, ParseOidError> {
        let components: Vec<u32> = s
            .split('.')
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        if components.is_empty() {
            return Err(ParseOidError::Empty);
        }
        Ok(Oid(components))
    }
}

#[derive(Debug, From)]
pub enum WalkError {
    Io(io::Error),
    BadOid(ParseOidError),
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalkError::Io(e) => write!(f, "could not read walk: {}", e),
            WalkError::BadOid(e) => write!(f, "bad OID in walk: {}", e),
        }
    }
}

/// The OID→value map from walking a device once.
#[derive(Debug, Default)]
pub struct SnmpWalk {
    entries: BTreeMap<Oid, String>,
}

/// Type tags `snmpwalk` prints in front of values; stored walks may carry
/// them or not.
const TYPE_TAGS: [&str; 10] = [
    "STRING:",
    "INTEGER:",
    "Gauge32:",
    "Counter32:",
    "Counter64:",
    "Timeticks:",
    "Hex-STRING:",
    "IpAddress:",
    "OID:",
    "OCTET STRING:",
];

impl SnmpWalk {
    pub fn new() -> SnmpWalk {
        SnmpWalk::default()
    }

    pub fn load(path: &Path) -> Result<SnmpWalk, WalkError> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        contents.parse()
    }

    pub fn insert(&mut self, oid: Oid, value: String) {
        self.entries.insert(oid, value);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value of a scalar, if the walk contains it.
    pub fn get(&self, oid: &str) -> Option<&str> {
        let oid: Oid = oid.parse().ok()?;
        self.entries.get(&oid).map(String::as_str)
    }

    /// Whether any OID at or under `oid` is present.
    pub fn exists_under(&self, oid: &Oid) -> bool {
        self.entries
            .range(oid.clone()..oid.subtree_end())
            .next()
            .is_some()
    }

    /// All `(suffix, value)` pairs under `base`, in OID order.
    pub fn subtree<'a>(&'a self, base: &Oid) -> impl Iterator<Item = (Oid, &'a str)> + 'a {
        let base = base.clone();
        self.entries
            .range(base.clone()..base.subtree_end())
            .filter_map(move |(oid, value)| {
                oid.strip_prefix(&base).map(|suffix| (suffix, value.as_str()))
            })
    }

    /// Assemble the rows of the table at `base` from the column subtrees
    /// named by `tree`. Row indices are the union of all column suffixes,
    /// missing cells are empty strings.
    pub fn table(&self, tree: &SnmpTree) -> StringTable {
        let base: Oid = match tree.base.parse() {
            Ok(base) => base,
            Err(_) => return Vec::new(),
        };
        let columns: Vec<BTreeMap<Oid, &str>> = tree
            .columns
            .iter()
            .filter_map(|col| col.parse::<Oid>().ok())
            .map(|col| self.subtree(&base.join(&col)).collect())
            .collect();

        let mut indices: Vec<&Oid> = columns.iter().flat_map(|col| col.keys()).collect();
        indices.sort();
        indices.dedup();

        indices
            .into_iter()
            .map(|index| {
                columns
                    .iter()
                    .map(|col| col.get(index).copied().unwrap_or("").to_string())
                    .collect()
            })
            .collect()
    }
}

impl FromStr for SnmpWalk {
    type Err = WalkError;

    /// Parse a walk dump. Accepts both `OID = TYPE: value` (`snmpwalk -On`)
    /// and the bare `OID value` stored-walk form; lines not starting with a
    /// dot (comments, hex continuations) are skipped.
    fn from_str(s: &str) -> Result<SnmpWalk, WalkError> {
        let mut walk = SnmpWalk::new();
        for line in s.lines() {
            let line = line.trim();
            if !line.starts_with('.') {
                continue;
            }
            let (oid, rest) = match line.find(char::is_whitespace) {
                Some(split) => (&line[..split], line[split..].trim_start()),
                None => (line, ""),
            };
            let oid: Oid = oid.parse()?;
            walk.insert(oid, clean_value(rest));
        }
        Ok(walk)
    }
}

fn clean_value(raw: &str) -> String {
    let mut value = raw.strip_prefix("= ").unwrap_or(raw).trim_start();
    if value == "=" {
        value = "";
    }
    for tag in &TYPE_TAGS {
        if let Some(tagged) = value.strip_prefix(tag) {
            value = tagged.trim_start();
            break;
        }
    }
    value.trim_matches('"').to_string()
}

/// A table fetch specification: base OID plus column suffixes, in the order
/// the parse step expects the cells.
#[derive(Debug, Clone, Copy)]
pub struct SnmpTree {
    pub base: &'static str,
    pub columns: &'static [&'static str],
}

/// A detection predicate over a walk's scalars.
///
/// Composed from the usual combinators:
///
/// ```
/// use rackmon_plugins::snmp::{all_of, exists, startswith, SYS_OBJECT_ID};
///
/// let akcp = all_of(vec![
///     startswith(SYS_OBJECT_ID, ".1.3.6.1.4.1.3854.1"),
///     exists(".1.3.6.1.4.1.3854.2.*"),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub enum Detect {
    Contains(&'static str, &'static str),
    Startswith(&'static str, &'static str),
    Equals(&'static str, &'static str),
    /// OID presence; a trailing `.*` matches any OID below.
    Exists(&'static str),
    AllOf(Vec<Detect>),
    AnyOf(Vec<Detect>),
    Not(Box<Detect>),
}

pub fn contains(oid: &'static str, value: &'static str) -> Detect {
    Detect::Contains(oid, value)
}

pub fn startswith(oid: &'static str, value: &'static str) -> Detect {
    Detect::Startswith(oid, value)
}

pub fn equals(oid: &'static str, value: &'static str) -> Detect {
    Detect::Equals(oid, value)
}

pub fn exists(oid: &'static str) -> Detect {
    Detect::Exists(oid)
}

pub fn all_of(specs: Vec<Detect>) -> Detect {
    Detect::AllOf(specs)
}

pub fn any_of(specs: Vec<Detect>) -> Detect {
    Detect::AnyOf(specs)
}

pub fn not(spec: Detect) -> Detect {
    Detect::Not(Box::new(spec))
}

impl Detect {
    pub fn matches(&self, walk: &SnmpWalk) -> bool {
        match self {
            Detect::Contains(oid, value) => {
                walk.get(oid).map_or(false, |seen| seen.contains(value))
            }
            Detect::Startswith(oid, value) => {
                walk.get(oid).map_or(false, |seen| seen.starts_with(value))
            }
            Detect::Equals(oid, value) => walk.get(oid).map_or(false, |seen| seen == *value),
            Detect::Exists(oid) => match oid.strip_suffix(".*") {
                Some(prefix) => match prefix.parse::<Oid>() {
                    Ok(prefix) => walk.exists_under(&prefix),
                    Err(_) => false,
                },
                None => walk.get(oid).is_some(),
            },
            Detect::AllOf(specs) => specs.iter().all(|spec| spec.matches(walk)),
            Detect::AnyOf(specs) => specs.iter().any(|spec| spec.matches(walk)),
            Detect::Not(spec) => !spec.matches(walk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALK: &str = "\
.1.3.6.1.2.1.1.1.0 = STRING: \"HWg-STE plus\"
.1.3.6.1.2.1.1.2.0 = OID: .1.3.6.1.4.1.21796.4
.1.3.6.1.4.1.21796.4.1.3.1.1.1 = INTEGER: 1
.1.3.6.1.4.1.21796.4.1.3.1.1.2 = INTEGER: 2
.1.3.6.1.4.1.21796.4.1.3.1.2.1 = STRING: Server room
.1.3.6.1.4.1.21796.4.1.3.1.2.2 = STRING: Rack 4
.1.3.6.1.4.1.21796.4.1.3.1.4.1 = STRING: 21.5
.1.3.6.1.4.1.21796.4.1.3.1.4.2 = STRING: 56.2
";

    #[test]
    fn oid_ordering_is_numeric() {
        let a: Oid = ".1.3.6.1.9".parse().unwrap();
        let b: Oid = ".1.3.6.1.10".parse().unwrap();
        assert!(a < b);
        assert_eq!(b.to_string(), ".1.3.6.1.10");
    }

    #[test]
    fn loads_both_line_forms() {
        let walk: SnmpWalk = ".1.2.3.0 = Gauge32: 7\n.1.2.4.0 plain value\n".parse().unwrap();
        assert_eq!(walk.get(".1.2.3.0"), Some("7"));
        assert_eq!(walk.get(".1.2.4.0"), Some("plain value"));
    }

    #[test]
    fn scalar_and_detection() {
        let walk: SnmpWalk = WALK.parse().unwrap();
        assert_eq!(walk.get(SYS_DESCR), Some("HWg-STE plus"));
        assert!(contains(SYS_DESCR, "HWg").matches(&walk));
        assert!(startswith(SYS_OBJECT_ID, ".1.3.6.1.4.1.21796").matches(&walk));
        assert!(exists(".1.3.6.1.4.1.21796.4.*").matches(&walk));
        assert!(!exists(".1.3.6.1.4.1.9.*").matches(&walk));
        assert!(not(contains(SYS_DESCR, "BIG-IP")).matches(&walk));
        assert!(all_of(vec![
            contains(SYS_DESCR, "HWg"),
            any_of(vec![equals(SYS_OBJECT_ID, ".1.3.6.1.4.1.21796.4"), exists(".1.3.6.1.4.1.9.*")]),
        ])
        .matches(&walk));
    }

    #[test]
    fn subtree_outlives_its_base() {
        let walk: SnmpWalk = WALK.parse().unwrap();
        let base: Oid = ".1.3.6.1.4.1.21796.4.1.3.1".parse().unwrap();
        let col: Oid = "2".parse().unwrap();
        let names: Vec<_> = walk.subtree(&base.join(&col)).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].1, "Server room");
    }

    #[test]
    fn table_assembles_rows_with_missing_cells() {
        let walk: SnmpWalk = WALK.parse().unwrap();
        let table = walk.table(&SnmpTree {
            base: ".1.3.6.1.4.1.21796.4.1.3.1",
            columns: &["1", "2", "4", "9"],
        });
        assert_eq!(
            table,
            vec![
                vec!["1".to_string(), "Server room".into(), "21.5".into(), "".into()],
                vec!["2".to_string(), "Rack 4".into(), "56.2".into(), "".into()],
            ]
        );
    }

    #[test]
    fn empty_table_for_absent_subtree() {
        let walk: SnmpWalk = WALK.parse().unwrap();
        let table = walk.table(&SnmpTree {
            base: ".1.3.6.1.4.1.9.9",
            columns: &["1"],
        });
        assert!(table.is_empty());
    }
}
