//! Culture fallback resolution

use crate::culture::{Culture, CultureChain};
use crate::error::I18nResult;
use std::collections::HashMap;

/// Walk `chain` and return the first value `lookup` yields.
///
/// Without `try_parents` only the first (most specific) culture is consulted.
/// Errors from `lookup` stop the walk.
pub fn resolve_first<F>(chain: &CultureChain, try_parents: bool, mut lookup: F) -> I18nResult<Option<String>>
where
    F: FnMut(&Culture) -> I18nResult<Option<String>>,
{
    for culture in chain {
        if let Some(value) = lookup(culture)? {
            return Ok(Some(value));
        }

        if !try_parents {
            break;
        }
    }

    Ok(None)
}

/// Union every table along `chain`, nearest culture first.
///
/// `merge` receives the culture and the accumulated result and must only add
/// keys that are not present yet, so the most specific definition wins.
pub fn merge_chain<F>(chain: &CultureChain, mut merge: F) -> I18nResult<HashMap<String, String>>
where
    F: FnMut(&Culture, &mut HashMap<String, String>) -> I18nResult<()>,
{
    let mut merged = HashMap::new();
    for culture in chain {
        merge(culture, &mut merged)?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::I18nError;
    use proptest::prelude::*;

    type Tables = HashMap<String, HashMap<String, String>>;

    fn chain(name: &str) -> CultureChain {
        Culture::new(name).unwrap().chain()
    }

    fn tables(defs: &[(&str, &[(&str, &str)])]) -> Tables {
        defs.iter()
            .map(|(culture, pairs)| {
                let table = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
                (culture.to_string(), table)
            })
            .collect()
    }

    fn lookup<'a>(tables: &'a Tables, key: &'a str) -> impl FnMut(&Culture) -> I18nResult<Option<String>> + 'a {
        move |culture| Ok(tables.get(culture.name()).and_then(|t| t.get(key)).cloned())
    }

    fn merge(tables: &Tables) -> impl FnMut(&Culture, &mut HashMap<String, String>) -> I18nResult<()> + '_ {
        move |culture, merged| {
            if let Some(table) = tables.get(culture.name()) {
                for (k, v) in table {
                    merged.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_falls_back_to_parent() {
        let tables = tables(&[("zh", &[("hello", "哈")])]);
        let value = resolve_first(&chain("zh-TW"), true, lookup(&tables, "hello")).unwrap();
        assert_eq!(value.as_deref(), Some("哈"));
    }

    #[test]
    fn test_no_fallback_stops_after_first_culture() {
        let tables = tables(&[("zh", &[("hello", "哈")])]);
        let value = resolve_first(&chain("zh-TW"), false, lookup(&tables, "hello")).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let result = resolve_first(&chain("fr-CA"), true, |_| Err(I18nError::InvalidCulture("x".into())));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_prefers_nearest_culture() {
        let tables = tables(&[
            ("zh-Hant-TW", &[("hello", "你好")]),
            ("zh-Hant", &[("hello", "妳好"), ("bye", "再會")]),
            ("zh", &[("bye", "再见"), ("thanks", "谢谢")]),
        ]);

        let merged = merge_chain(&chain("zh-Hant-TW"), merge(&tables)).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged["hello"], "你好");
        assert_eq!(merged["bye"], "再會");
        assert_eq!(merged["thanks"], "谢谢");
    }

    fn culture_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["zh-Hant-TW", "zh-Hant", "zh"])
    }

    proptest! {
        #[test]
        fn prop_first_hit_matches_nearest_definition(
            defined in prop::collection::vec((culture_strategy(), "[a-c]", "[a-z]{1,4}"), 0..12),
            key in "[a-c]",
        ) {
            let mut tables: Tables = HashMap::new();
            for (culture, k, v) in &defined {
                tables.entry(culture.to_string()).or_default().insert(k.clone(), v.clone());
            }

            let chain = chain("zh-Hant-TW");
            let expected = chain
                .iter()
                .find_map(|c| tables.get(c.name()).and_then(|t| t.get(&key)).cloned());

            let resolved = resolve_first(&chain, true, lookup(&tables, &key)).unwrap();
            prop_assert_eq!(&resolved, &expected);

            let merged = merge_chain(&chain, merge(&tables)).unwrap();
            prop_assert_eq!(merged.get(&key).cloned(), expected);
        }
    }
}
