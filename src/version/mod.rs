// src/version/mod.rs

//! RPM-style version comparison for builds from different distributions
//!
//! Builds are compared on a normalized epoch:version-release triple. The
//! epoch is always reset to `0` because sister distributions assign epochs
//! independently, and dist tags (`.fc40`, `.eln136`, `.el9`) are dropped from
//! the release so that a Fedora build and its ELN rebuild compare equal.

use crate::build::BuildRecord;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static DIST_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:fc|eln|el)[0-9]*").unwrap());

/// A normalized epoch, version and release triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Evr {
    pub epoch: String,
    pub version: String,
    pub release: String,
}

impl Evr {
    /// Normalize a build for cross-distribution comparison
    pub fn from_build(build: &BuildRecord) -> Self {
        Self {
            epoch: "0".to_string(),
            version: build.version.clone(),
            release: strip_dist_tag(&build.release),
        }
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != "0" {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.version)?;
        if !self.release.is_empty() {
            write!(f, "-{}", self.release)?;
        }
        Ok(())
    }
}

/// Label comparison: epoch, then version, then release
impl Ord for Evr {
    fn cmp(&self, other: &Self) -> Ordering {
        rpmvercmp(&self.epoch, &other.epoch)
            .then_with(|| rpmvercmp(&self.version, &other.version))
            .then_with(|| rpmvercmp(&self.release, &other.release))
    }
}

impl PartialOrd for Evr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Remove every `.fcNN`, `.elnNNN` and `.elN` dist tag from a release
pub fn strip_dist_tag(release: &str) -> String {
    DIST_TAG_RE.replace_all(release, "").into_owned()
}

/// Compare the normalized versions of two builds
///
/// `Less` means `build1` is older than `build2`.
pub fn compare_builds(build1: &BuildRecord, build2: &BuildRecord) -> Ordering {
    Evr::from_build(build1).cmp(&Evr::from_build(build2))
}

/// Compare two version or release strings the way rpm does
///
/// Strings are split into alternating runs of digits and letters, anything
/// else acts as a separator. Digit runs compare numerically and beat letter
/// runs, letter runs compare bytewise. `~` sorts before anything, including
/// the end of the string. `^` sorts after the end of the string but before
/// any further segment.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < one.len() || j < two.len() {
        while i < one.len() && !is_segment_byte(one[i]) {
            i += 1;
        }
        while j < two.len() && !is_segment_byte(two[j]) {
            j += 1;
        }

        let c1 = one.get(i).copied();
        let c2 = two.get(j).copied();

        if c1 == Some(b'~') || c2 == Some(b'~') {
            if c1 != Some(b'~') {
                return Ordering::Greater;
            }
            if c2 != Some(b'~') {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if c1 == Some(b'^') || c2 == Some(b'^') {
            if c1.is_none() {
                return Ordering::Less;
            }
            if c2.is_none() {
                return Ordering::Greater;
            }
            if c1 != Some(b'^') {
                return Ordering::Greater;
            }
            if c2 != Some(b'^') {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if c1.is_none() || c2.is_none() {
            break;
        }

        let numeric = one[i].is_ascii_digit();
        let end1 = segment_end(one, i, numeric);
        let end2 = segment_end(two, j, numeric);
        let seg1 = &one[i..end1];
        let seg2 = &two[j..end2];

        // Segment types differ: a number is always newer than letters
        if seg2.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ord = if numeric {
            compare_numeric(seg1, seg2)
        } else {
            seg1.cmp(seg2)
        };
        if ord != Ordering::Equal {
            return ord;
        }

        i = end1;
        j = end2;
    }

    match (i >= one.len(), j >= two.len()) {
        (true, true) => Ordering::Equal,
        (false, _) => Ordering::Greater,
        (true, false) => Ordering::Less,
    }
}

fn is_segment_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'~' || b == b'^'
}

fn segment_end(s: &[u8], start: usize, numeric: bool) -> usize {
    let mut end = start;
    while end < s.len()
        && (if numeric {
            s[end].is_ascii_digit()
        } else {
            s[end].is_ascii_alphabetic()
        })
    {
        end += 1;
    }
    end
}

fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&b| b != b'0').unwrap_or(s.len());
    &s[start..]
}
