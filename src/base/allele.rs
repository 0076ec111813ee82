//! Allele identifiers and the active-allele set.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// An opaque allele identifier.
///
/// Alleles have no internal structure; they are interned names compared by
/// value. Cloning is cheap (shared string), so populations can carry one tag
/// per individual. Model files may write alleles as strings or bare integers;
/// both deserialize to the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Allele(Arc<str>);

impl Allele {
    /// Create an allele from a name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The allele's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Allele {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Allele {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Serialize for Allele {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct AlleleVisitor;

impl Visitor<'_> for AlleleVisitor {
    type Value = Allele;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an allele name (string or integer)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Allele, E> {
        Ok(Allele::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Allele, E> {
        Ok(Allele::new(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Allele, E> {
        Ok(Allele::new(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Allele {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AlleleVisitor)
    }
}

/// The growable set of alleles the simulation currently tracks.
///
/// Census and mutation consult this set; only the injection phase grows it.
/// Insertion order is preserved so that uniform draws over the set are
/// reproducible for a fixed seed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveAlleles {
    alleles: Vec<Allele>,
}

impl ActiveAlleles {
    /// Build the set from an initial collection, dropping duplicates while
    /// preserving first-seen order.
    pub fn new(alleles: impl IntoIterator<Item = Allele>) -> Self {
        let mut set = Self::default();
        for allele in alleles {
            set.activate(allele);
        }
        set
    }

    /// Whether the allele is active.
    pub fn contains(&self, allele: &Allele) -> bool {
        self.alleles.contains(allele)
    }

    /// Add an allele to the set. Returns `false` if it was already active.
    pub fn activate(&mut self, allele: Allele) -> bool {
        if self.contains(&allele) {
            return false;
        }
        self.alleles.push(allele);
        true
    }

    /// Iterate over active alleles in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &Allele> {
        self.alleles.iter()
    }

    /// Number of active alleles.
    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    /// Whether no allele is active.
    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    /// The active alleles other than the wild type, in activation order.
    /// These are the targets of forward mutation.
    pub fn mutant_targets(&self, wild_type: &Allele) -> Vec<Allele> {
        self.alleles
            .iter()
            .filter(|a| *a != wild_type)
            .cloned()
            .collect()
    }
}
