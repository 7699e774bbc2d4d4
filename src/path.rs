use std::{
    convert::TryFrom,
    iter::{FromIterator, IntoIterator},
    slice::Iter,
};

use crate::{KeyError, BIP32_HARDEN};

fn try_parse_index(s: &str) -> Result<u32, KeyError> {
    let mut index_str = s.to_owned();
    let harden = if s.ends_with('\'') || s.ends_with('h') {
        index_str.pop();
        true
    } else {
        false
    };

    index_str
        .parse::<u32>()
        .ok()
        .and_then(|v| {
            if !harden {
                Some(v)
            } else if v < BIP32_HARDEN {
                Some(v + BIP32_HARDEN)
            } else {
                // already-hardened values may not be hardened again
                None
            }
        })
        .ok_or_else(|| KeyError::MalformattedIndex(s.to_owned()))
}

fn try_parse_path(path: &str) -> Result<DerivationPath, KeyError> {
    path.to_owned()
        .split('/')
        .filter(|v| v != &"m")
        .map(try_parse_index)
        .collect::<Result<Vec<u32>, KeyError>>()
        .map(Into::into)
}

/// A sequence of child indices, one per level of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// Returns `true` if there are no indices in the path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of derivations in the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Make an iterator over the path indices.
    pub fn iter(&self) -> Iter<u32> {
        self.0.iter()
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(v: Vec<u32>) -> Self {
        Self(v)
    }
}

impl From<&[u32]> for DerivationPath {
    fn from(v: &[u32]) -> Self {
        Self(v.to_owned())
    }
}

impl TryFrom<&str> for DerivationPath {
    type Error = KeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        try_parse_path(s)
    }
}

impl FromIterator<u32> for DerivationPath {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = u32>,
    {
        Vec::from_iter(iter).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_parses_hardened_and_normal_components() {
        let path = DerivationPath::try_from("m/44'/0h/1").unwrap();
        assert_eq!(
            path,
            vec![44 + BIP32_HARDEN, BIP32_HARDEN, 1].into()
        );

        let no_prefix = DerivationPath::try_from("44'/0h/1").unwrap();
        assert_eq!(path, no_prefix);

        assert!(DerivationPath::try_from("m").unwrap().is_empty());
    }

    #[test]
    fn it_rejects_malformed_components() {
        assert!(DerivationPath::try_from("m/44x/0").is_err());
        assert!(DerivationPath::try_from("m//0").is_err());
        assert!(DerivationPath::try_from("m/2147483648'").is_err());
    }

    #[test]
    fn raw_hardened_indices_parse_without_a_tick() {
        let path = DerivationPath::try_from("m/2147483648").unwrap();
        assert_eq!(path, vec![BIP32_HARDEN].into());
    }
}
