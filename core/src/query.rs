//! URL query helpers.

use std::collections::BTreeMap;

use url::form_urlencoded;
use url::Url;

/// Query items of `url` as a map. Later duplicates win. `None` if `url` does
/// not parse.
pub fn query_params(url: &str) -> Option<BTreeMap<String, String>> {
    let url = Url::parse(url).ok()?;
    Some(url.query_pairs().into_owned().collect())
}

/// Render `params` as a `?`-prefixed, form-encoded query string. An empty map
/// renders as `""`.
pub fn query_string<K, V, I>(params: I) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
{
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    if encoded.is_empty() {
        encoded
    } else {
        format!("?{encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_reads_decoded_items() {
        let params = query_params("http://localhost:3000/search?q=rust+lang&page=2").unwrap();
        assert_eq!(params["q"], "rust lang");
        assert_eq!(params["page"], "2");
    }

    #[test]
    fn query_params_without_query_is_empty() {
        assert!(query_params("http://localhost:3000/").unwrap().is_empty());
    }

    #[test]
    fn query_params_of_invalid_url_is_none() {
        assert!(query_params("::").is_none());
    }

    #[test]
    fn query_string_separates_and_encodes_pairs() {
        let params = BTreeMap::from([("a", "1"), ("b", "x y&z")]);
        assert_eq!(query_string(params), "?a=1&b=x+y%26z");
    }

    #[test]
    fn empty_query_string() {
        assert_eq!(query_string(Vec::<(String, String)>::new()), "");
    }
}
