// src/request/capability.rs

//! Structured package specifiers and the best-effort grammar guesser.
//!
//! A [`Capability`] is the parsed form of one package argument: a name,
//! a resolvable kind, an optional architecture, and an optional version
//! constraint. [`Capability::guess`] turns arbitrary text into one of
//! these. It is total: input that matches none of the recognized shapes
//! comes back as a bare name, never as an error.

use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Kinds of resolvable entities a specifier can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CapKind {
    #[default]
    Package,
    Patch,
    Pattern,
    Product,
    SrcPackage,
}

impl CapKind {
    /// Split an explicit `kind:` prefix off `text`.
    ///
    /// Only exact kind names qualify, so `perl-devel:foo` and
    /// `perl(Digest::MD5)` pass through untouched.
    pub fn split_ident(text: &str) -> Option<(CapKind, &str)> {
        let (prefix, rest) = text.split_once(':')?;
        let kind = CapKind::from_str(prefix).ok()?;
        Some((kind, rest))
    }
}

/// Relational operators usable in a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A version descriptor: `[epoch:]version[-release]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edition {
    pub epoch: u64,
    pub version: String,
    pub release: Option<String>,
}

impl Edition {
    /// Parse an edition string.
    ///
    /// Examples:
    /// - "1.2.3" → epoch=0, version="1.2.3", release=None
    /// - "2:10.1-1.2.gcc44" → epoch=2, version="10.1", release=Some("1.2.gcc44")
    ///
    /// Total: a non-numeric segment before the colon is not an epoch, so
    /// the colon stays part of the version text.
    pub fn parse(s: &str) -> Self {
        let (epoch, rest) = match s.split_once(':') {
            Some((e, r)) if e.is_empty() => (0, r),
            Some((e, r)) => match e.parse::<u64>() {
                Ok(epoch) => (epoch, r),
                Err(_) => (0, s),
            },
            None => (0, s),
        };

        let (version, release) = match rest.split_once('-') {
            Some((v, r)) => (v.to_string(), Some(r.to_string())),
            None => (rest.to_string(), None),
        };

        Edition {
            epoch,
            version,
            release,
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

/// An operator/edition pair; neither appears without the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub op: CompareOp,
    pub edition: Edition,
}

/// Architectures recognized as a `.arch` suffix.
const KNOWN_ARCHS: [&str; 17] = [
    "x86_64", "i386", "i486", "i586", "i686", "aarch64", "armv6hl", "armv7hl", "ppc", "ppc64",
    "ppc64le", "s390", "s390x", "riscv64", "noarch", "src", "nosrc",
];

fn is_known_arch(text: &str) -> bool {
    KNOWN_ARCHS.contains(&text)
}

/// The structured form of one package specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    pub name: String,
    pub kind: CapKind,
    pub arch: Option<String>,
    pub constraint: Option<Constraint>,
}

impl Capability {
    /// A bare named capability of the given kind.
    pub fn named(name: impl Into<String>, kind: CapKind) -> Self {
        Self {
            name: name.into(),
            kind,
            arch: None,
            constraint: None,
        }
    }

    /// Best-effort parse of a package specifier.
    ///
    /// Recognized shapes, most specific first:
    /// 1. an explicit `kind:` prefix, split off before anything else;
    /// 2. a parenthesized dependency expression, kept whole as the name;
    /// 3. `name op edition`, with a trailing `.arch` split off either side;
    /// 4. `name-edition.arch` (the edition must begin with a digit);
    /// 5. a bare name.
    pub fn guess(text: &str) -> Capability {
        let (kind, rest) = match CapKind::split_ident(text) {
            Some((kind, rest)) => (kind, rest),
            None => (CapKind::Package, text),
        };

        // dependency expressions like perl(Digest::MD5) stay opaque
        if rest.contains('(') {
            return Capability::named(rest, kind);
        }

        if let Some((name_part, op, edition_part)) = split_operator(rest) {
            let (name, mut arch) = split_arch(name_part);
            let edition_text = if arch.is_some() {
                edition_part
            } else {
                let (edition_text, edition_arch) = split_arch(edition_part);
                arch = edition_arch;
                edition_text
            };
            return Capability {
                name: name.to_string(),
                kind,
                arch,
                constraint: Some(Constraint {
                    op,
                    edition: Edition::parse(edition_text),
                }),
            };
        }

        let (rest, arch) = split_arch(rest);
        if arch.is_some() {
            if let Some((name, edition)) = split_dash_edition(rest) {
                return Capability {
                    name: name.to_string(),
                    kind,
                    arch,
                    constraint: Some(Constraint {
                        op: CompareOp::Eq,
                        edition: Edition::parse(edition),
                    }),
                };
            }
        }

        Capability {
            name: rest.to_string(),
            kind,
            arch,
            constraint: None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind != CapKind::Package {
            write!(f, "{}:", self.kind)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ref arch) = self.arch {
            write!(f, ".{}", arch)?;
        }
        if let Some(ref constraint) = self.constraint {
            write!(f, " {} {}", constraint.op, constraint.edition)?;
        }
        Ok(())
    }
}

/// Find the first comparison operator in `text` and split around it.
/// Requires a non-empty name and edition on either side.
fn split_operator(text: &str) -> Option<(&str, CompareOp, &str)> {
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let (op, len) = match b {
            b'<' if bytes.get(i + 1) == Some(&b'=') => (CompareOp::Le, 2),
            b'<' => (CompareOp::Lt, 1),
            b'>' if bytes.get(i + 1) == Some(&b'=') => (CompareOp::Ge, 2),
            b'>' => (CompareOp::Gt, 1),
            b'=' if bytes.get(i + 1) == Some(&b'=') => (CompareOp::Eq, 2),
            b'=' => (CompareOp::Eq, 1),
            _ => continue,
        };
        if i == 0 || i + len >= text.len() {
            return None;
        }
        return Some((&text[..i], op, &text[i + len..]));
    }
    None
}

/// Split a trailing `.arch` suffix off `text` when it names a known
/// architecture.
fn split_arch(text: &str) -> (&str, Option<String>) {
    if let Some(pos) = text.rfind('.') {
        let suffix = &text[pos + 1..];
        if pos > 0 && is_known_arch(suffix) {
            return (&text[..pos], Some(suffix.to_string()));
        }
    }
    (text, None)
}

/// Split `name-edition` at the leftmost dash whose suffix begins with a
/// digit. Names routinely contain dashes (`perl-devel`), editions always
/// start numerically, so the first digit-initial segment wins.
fn split_dash_edition(text: &str) -> Option<(&str, &str)> {
    for (pos, _) in text.match_indices('-') {
        if pos == 0 {
            continue;
        }
        let suffix = &text[pos + 1..];
        if suffix.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Some((&text[..pos], suffix));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_name() {
        let cap = Capability::guess("vim");
        assert_eq!(cap.name, "vim");
        assert_eq!(cap.kind, CapKind::Package);
        assert!(cap.arch.is_none());
        assert!(cap.constraint.is_none());
    }

    #[test]
    fn test_name_with_arch() {
        let cap = Capability::guess("libdnet1.i586");
        assert_eq!(cap.name, "libdnet1");
        assert_eq!(cap.arch.as_deref(), Some("i586"));
        assert!(cap.constraint.is_none());
    }

    #[test]
    fn test_dotted_name_without_known_arch() {
        let cap = Capability::guess("libstdc++.so.6");
        assert_eq!(cap.name, "libstdc++.so.6");
        assert!(cap.arch.is_none());
    }

    #[test]
    fn test_name_op_edition() {
        let cap = Capability::guess("satchel>=1.2.15");
        assert_eq!(cap.name, "satchel");
        let constraint = cap.constraint.unwrap();
        assert_eq!(constraint.op, CompareOp::Ge);
        assert_eq!(constraint.edition.to_string(), "1.2.15");
    }

    #[test]
    fn test_double_equals_is_equality() {
        let cap = Capability::guess("satchel==1.2.15");
        assert_eq!(cap.constraint.unwrap().op, CompareOp::Eq);
    }

    #[test]
    fn test_edition_with_epoch_and_arch() {
        let cap = Capability::guess("opera=2:10.1-1.2.gcc44.x86_64");
        assert_eq!(cap.name, "opera");
        assert_eq!(cap.arch.as_deref(), Some("x86_64"));
        let constraint = cap.constraint.unwrap();
        assert_eq!(constraint.op, CompareOp::Eq);
        assert_eq!(constraint.edition.epoch, 2);
        assert_eq!(constraint.edition.version, "10.1");
        assert_eq!(constraint.edition.release.as_deref(), Some("1.2.gcc44"));
        assert_eq!(constraint.edition.to_string(), "2:10.1-1.2.gcc44");
    }

    #[test]
    fn test_dash_edition_with_arch() {
        let cap = Capability::guess("opera-2:10.1-1.2.gcc44.x86_64");
        assert_eq!(cap.name, "opera");
        assert_eq!(cap.arch.as_deref(), Some("x86_64"));
        let constraint = cap.constraint.unwrap();
        assert_eq!(constraint.op, CompareOp::Eq);
        assert_eq!(constraint.edition.to_string(), "2:10.1-1.2.gcc44");
    }

    #[test]
    fn test_dash_without_arch_stays_in_name() {
        // only the name-edition.arch shape carries a dash edition
        let cap = Capability::guess("perl-devel");
        assert_eq!(cap.name, "perl-devel");
        assert!(cap.constraint.is_none());
    }

    #[test]
    fn test_parenthesized_expression_is_opaque() {
        let cap = Capability::guess("perl(Digest::MD5)");
        assert_eq!(cap.name, "perl(Digest::MD5)");
        assert!(cap.arch.is_none());
        assert!(cap.constraint.is_none());
    }

    #[test]
    fn test_explicit_kind_prefix() {
        let cap = Capability::guess("pattern:lamp_server");
        assert_eq!(cap.kind, CapKind::Pattern);
        assert_eq!(cap.name, "lamp_server");
    }

    #[test]
    fn test_unknown_prefix_is_not_a_kind() {
        let cap = Capability::guess("perl-devel:something");
        assert_eq!(cap.kind, CapKind::Package);
        assert_eq!(cap.name, "perl-devel:something");
    }

    #[test]
    fn test_operator_without_operand_falls_back_to_name() {
        assert_eq!(Capability::guess("=").name, "=");
        assert_eq!(Capability::guess("satchel=").name, "satchel=");
        assert_eq!(Capability::guess("=1.2").name, "=1.2");
    }

    #[test]
    fn test_edition_parse_total() {
        let ed = Edition::parse("not:numeric");
        assert_eq!(ed.epoch, 0);
        assert_eq!(ed.version, "not:numeric");

        let ed = Edition::parse(":1.0");
        assert_eq!(ed.epoch, 0);
        assert_eq!(ed.version, "1.0");
    }

    #[test]
    fn test_display_round_trip() {
        let cap = Capability::guess("pattern:lamp_server");
        assert_eq!(cap.to_string(), "pattern:lamp_server");

        let cap = Capability::guess("satchel>=1.2.15");
        assert_eq!(cap.to_string(), "satchel >= 1.2.15");

        let cap = Capability::guess("opera=2:10.1-1.2.gcc44.x86_64");
        assert_eq!(cap.to_string(), "opera.x86_64 = 2:10.1-1.2.gcc44");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(CapKind::from_str("package").unwrap(), CapKind::Package);
        assert_eq!(CapKind::from_str("srcpackage").unwrap(), CapKind::SrcPackage);
        assert!(CapKind::from_str("repo").is_err());
    }
}
