use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

/// Table of hypermedia links returned by the server.
///
/// Responses may carry a `_links` object mapping resource names to hrefs.
/// Server-provided links are authoritative: once a resource name appears in
/// the table, its href is used verbatim for subsequent calls instead of the
/// default versioned path. The table is replaced wholesale by each response
/// that carries links, never merged.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinkTable {
    links: IndexMap<String, String>,
}

impl LinkTable {
    /// Resolves the target URL for a resource.
    ///
    /// A stored link wins and is returned as-is, ignoring `append` (the
    /// server-provided href is already complete). Otherwise the default
    /// `/api/{version}/{resource}[/{append}]` path is joined onto the base.
    pub(crate) fn resolve(
        &self,
        base: &Url,
        version: &str,
        resource: &str,
        append: Option<&str>,
    ) -> Result<Url, url::ParseError> {
        if let Some(href) = self.links.get(resource) {
            return href.parse();
        }

        let path = match append {
            Some(append) => format!("/api/{version}/{resource}/{append}"),
            None => format!("/api/{version}/{resource}"),
        };
        base.join(&path)
    }

    /// Extracts `_links` from a response body.
    ///
    /// When the body carries a well-formed `_links` object, the table is
    /// replaced with its contents and the field is stripped from the body.
    /// The replacement is atomic: a malformed `_links` value (wrong shape,
    /// missing `href`) leaves both the table and the body untouched.
    pub(crate) fn extract(&mut self, body: &mut Value) {
        let Some(object) = body.as_object_mut() else {
            return;
        };
        let Some(raw) = object.get("_links") else {
            return;
        };

        // Parse the complete link set before touching the table.
        let Some(entries) = raw.as_object() else {
            return;
        };
        let mut parsed = IndexMap::with_capacity(entries.len());
        for (rel, value) in entries {
            let Some(href) = value.get("href").and_then(Value::as_str) else {
                return;
            };
            parsed.insert(rel.clone(), href.to_string());
        }

        self.links = parsed;
        object.remove("_links");
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, resource: &str) -> bool {
        self.links.contains_key(resource)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base() -> Url {
        "https://api.wadify.com".parse().expect("valid base url")
    }

    #[test]
    fn should_build_default_uri() {
        let table = LinkTable::default();
        let url = table
            .resolve(&base(), "0.0.1", "transactions", None)
            .expect("resolvable");
        assert_eq!(url.as_str(), "https://api.wadify.com/api/0.0.1/transactions");
    }

    #[test]
    fn should_append_segment_to_default_uri() {
        let table = LinkTable::default();
        let url = table
            .resolve(&base(), "0.0.1", "transactions", Some("42/abort"))
            .expect("resolvable");
        assert_eq!(
            url.as_str(),
            "https://api.wadify.com/api/0.0.1/transactions/42/abort"
        );
    }

    #[test]
    fn should_prefer_stored_link_and_ignore_append() {
        let mut table = LinkTable::default();
        let mut body = json!({
            "_links": {
                "transactions": {"href": "https://api.wadify.com/linked/transactions"}
            }
        });
        table.extract(&mut body);

        let url = table
            .resolve(&base(), "0.0.1", "transactions", Some("42"))
            .expect("resolvable");
        assert_eq!(
            url.as_str(),
            "https://api.wadify.com/linked/transactions",
            "server-provided href is authoritative"
        );
    }

    #[test]
    fn should_strip_links_from_body() {
        let mut table = LinkTable::default();
        let mut body = json!({
            "foo": "bar",
            "_links": {"user": {"href": "https://api.wadify.com/linked/user"}}
        });
        table.extract(&mut body);

        assert_eq!(body, json!({"foo": "bar"}));
        assert!(table.contains("user"));
    }

    #[test]
    fn should_replace_table_wholesale() {
        let mut table = LinkTable::default();
        let mut first = json!({"_links": {"user": {"href": "https://a/user"}}});
        table.extract(&mut first);
        assert!(table.contains("user"));

        let mut second = json!({"_links": {"transactions": {"href": "https://a/tx"}}});
        table.extract(&mut second);
        assert!(!table.contains("user"), "old entries are not merged");
        assert!(table.contains("transactions"));
    }

    #[test]
    fn should_keep_table_and_body_on_malformed_links() {
        let mut table = LinkTable::default();
        let mut seeded = json!({"_links": {"user": {"href": "https://a/user"}}});
        table.extract(&mut seeded);

        let mut malformed = json!({"_links": {"transactions": {"url": "missing href"}}});
        table.extract(&mut malformed);

        assert!(table.contains("user"), "no partial update on failed parse");
        assert!(!table.contains("transactions"));
        assert!(malformed.get("_links").is_some(), "body left untouched");
    }

    #[test]
    fn should_ignore_bodies_without_links() {
        let mut table = LinkTable::default();
        let mut body = json!({"foo": "bar"});
        table.extract(&mut body);
        assert_eq!(body, json!({"foo": "bar"}));

        let mut not_an_object = json!([1, 2, 3]);
        table.extract(&mut not_an_object);
    }
}
