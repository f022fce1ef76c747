use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};


/// A key of a [`WordBag`].
///
/// The shape depends on how the bag was built:
/// a plain word for single-level univariate bags,
/// a `(word, tag)` pair when a pyramid level or a channel is attached,
/// and a `(previous word, word)` pair for bigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum WordKey {
    /// A single word.
    Word(u64),
    /// A word and a tag (pyramid position and/or channel).
    Pair(u64, u64),
    /// A bigram: the word one window length earlier and the current one.
    Bigram(u64, u64),
}


/// Sparse word counts of one case.
pub type WordBag<K = WordKey> = BTreeMap<K, u32>;


/// Histogram intersection of two bags:
/// the sum over the keys present in both bags
/// of the smaller of the two counts.
///
/// Symmetric, zero when either bag is empty,
/// and at most the total count of the smaller bag.
/// Works for any ordered key type.
///
/// Time complexity: `O(|a| + |b|)`.
pub fn histogram_intersection<K>(a: &BTreeMap<K, u32>, b: &BTreeMap<K, u32>)
    -> u64
    where K: Ord,
{
    let mut a = a.iter().peekable();
    let mut b = b.iter().peekable();

    let mut similarity = 0u64;
    loop {
        let order = match (a.peek(), b.peek()) {
            (Some((ka, _)), Some((kb, _))) => ka.cmp(kb),
            _ => break,
        };
        match order {
            Ordering::Less => { a.next(); },
            Ordering::Greater => { b.next(); },
            Ordering::Equal => {
                if let (Some((_, ca)), Some((_, cb))) = (a.next(), b.next()) {
                    similarity += u64::from(*ca.min(cb));
                }
            },
        }
    }
    similarity
}


/// Total count of a bag.
pub fn bag_total<K>(bag: &BTreeMap<K, u32>) -> u64 {
    bag.values().map(|&c| u64::from(c)).sum()
}


/// Serializes bags as lists of `(key, count)` pairs,
/// since JSON maps only take string keys.
pub(crate) mod bags_as_pairs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use super::{WordBag, WordKey};

    pub(crate) fn serialize<S>(bags: &[WordBag], serializer: S)
        -> Result<S::Ok, S::Error>
        where S: Serializer,
    {
        let pairs = bags.iter()
            .map(|bag| bag.iter().map(|(&k, &c)| (k, c)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        pairs.serialize(serializer)
    }


    pub(crate) fn deserialize<'de, D>(deserializer: D)
        -> Result<Vec<WordBag>, D::Error>
        where D: Deserializer<'de>,
    {
        let pairs = Vec::<Vec<(WordKey, u32)>>::deserialize(deserializer)?;
        let bags = pairs.into_iter()
            .map(|bag| bag.into_iter().collect())
            .collect();
        Ok(bags)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(u64, u32)]) -> WordBag {
        entries.iter()
            .map(|&(w, c)| (WordKey::Word(w), c))
            .collect()
    }

    #[test]
    fn test_overlap() {
        let a = bag(&[(1, 3), (2, 1), (5, 4)]);
        let b = bag(&[(1, 1), (5, 6), (7, 2)]);
        assert_eq!(histogram_intersection(&a, &b), 1 + 4);
    }

    #[test]
    fn test_disjoint_key_shapes_do_not_match() {
        let a: WordBag = [(WordKey::Word(3), 2)].into_iter().collect();
        let b: WordBag = [(WordKey::Pair(3, 0), 2)].into_iter().collect();
        assert_eq!(histogram_intersection(&a, &b), 0);
    }

    #[test]
    fn test_tuple_keys() {
        let a: BTreeMap<(u64, u64), u32> =
            [((1, 0), 2), ((1, 1), 5)].into_iter().collect();
        let b: BTreeMap<(u64, u64), u32> =
            [((1, 1), 3), ((2, 0), 9)].into_iter().collect();
        assert_eq!(histogram_intersection(&a, &b), 3);
    }

    #[derive(Serialize, Deserialize)]
    struct Bags(#[serde(with = "bags_as_pairs")] Vec<WordBag>);

    #[test]
    fn test_bags_survive_json() {
        let bags = vec![
            [(WordKey::Word(1), 2), (WordKey::Pair(3, 4), 5)]
                .into_iter().collect(),
            [(WordKey::Bigram(6, 7), 1)].into_iter().collect(),
        ];
        let json = serde_json::to_string(&Bags(bags.clone())).unwrap();
        let Bags(restored) = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, bags);
    }
}
