//! Pandoc JSON AST host.
//!
//! Walks a document exactly as `pandoc --filter` hands it over: metadata
//! first, then blocks, depth-first in document order. Every `Str` node is
//! offered to the [`Filter`]; everything else is carried through as raw
//! JSON so inline and block kinds this crate never models survive intact.

use serde_json::Value;

use crate::error::{MetavarsError, Result};
use crate::filter::Filter;
use crate::node::Inline;

const API_VERSION_KEY: &str = "pandoc-api-version";

/// Filters a serialized pandoc document and re-serializes it.
///
/// ## Examples
///
/// ```
/// use chrono::NaiveDate;
/// use metavars_lib::{Clock, Filter, Registry};
/// use metavars_lib::pandoc::filter_json;
///
/// let registry = Registry::builtin(Clock::fixed_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
/// let input = r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[{"t":"Para","c":[{"t":"Str","c":"{today()}"}]}]}"#;
///
/// let output = filter_json(input, &Filter::new(&registry)).unwrap();
/// assert!(output.contains(r#"{"t":"Str","c":"2024-01-01"}"#));
/// ```
pub fn filter_json(input: &str, filter: &Filter<'_>) -> Result<String> {
    let mut document: Value = serde_json::from_str(input)?;
    filter_document(&mut document, filter)?;
    Ok(serde_json::to_string(&document)?)
}

/// Filters a parsed pandoc document in place.
///
/// Returns the number of placeholders replaced. The first failing
/// placeholder aborts the walk; the document must then be discarded.
pub fn filter_document(document: &mut Value, filter: &Filter<'_>) -> Result<usize> {
    let Value::Object(root) = document else {
        return Err(MetavarsError::InvalidDocument(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    match root.get(API_VERSION_KEY) {
        Some(Value::Array(version)) => {
            tracing::debug!(api_version = ?version, "Read pandoc document");
        }
        _ => {
            return Err(MetavarsError::InvalidDocument(format!(
                "missing `{API_VERSION_KEY}`"
            )));
        }
    }
    if !matches!(root.get("blocks"), Some(Value::Array(_))) {
        return Err(MetavarsError::InvalidDocument(
            "missing `blocks` array".to_string(),
        ));
    }

    let mut replaced = 0;
    for key in ["meta", "blocks"] {
        if let Some(section) = root.get_mut(key) {
            walk(section, filter, &mut replaced)?;
        }
    }

    tracing::info!(replaced, "Filtered pandoc document");
    Ok(replaced)
}

fn walk(value: &mut Value, filter: &Filter<'_>, replaced: &mut usize) -> Result<()> {
    if let Some(text) = str_content(value) {
        let inline = Inline::text(text);
        match filter.apply(&inline)? {
            Some(replacement) => {
                *value = serde_json::to_value(&replacement)?;
                *replaced += 1;
            }
            None => tracing::trace!(text = %text, "No placeholder"),
        }
        return Ok(());
    }

    match value {
        Value::Array(items) => {
            for item in items {
                walk(item, filter, replaced)?;
            }
        }
        Value::Object(map) => {
            for child in map.values_mut() {
                walk(child, filter, replaced)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// The text of a `{"t": "Str", "c": ...}` node.
fn str_content(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.get("t")?.as_str()? != "Str" {
        return None;
    }
    map.get("c")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Clock;
    use crate::registry::Registry;
    use chrono::NaiveDate;
    use serde_json::json;

    fn registry() -> Registry {
        let clock = Clock::fixed_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        Registry::builder()
            .with_builtins(clock)
            .nullary("echo", || Ok("{today()}".into()))
            .nullary("badge", || Ok(vec![Inline::Emph(vec![Inline::text("new")])].into()))
            .build()
    }

    fn doc(blocks: Value) -> Value {
        json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {},
            "blocks": blocks,
        })
    }

    fn para(inlines: Value) -> Value {
        json!([{ "t": "Para", "c": inlines }])
    }

    #[test]
    fn test_replaces_str_in_paragraph() {
        let registry = registry();
        let mut document = doc(para(json!([
            { "t": "Str", "c": "Updated" },
            { "t": "Space" },
            { "t": "Str", "c": "{today()}" },
        ])));

        let replaced = filter_document(&mut document, &Filter::new(&registry)).unwrap();

        assert_eq!(replaced, 1);
        assert_eq!(
            document["blocks"][0]["c"],
            json!([
                { "t": "Str", "c": "Updated" },
                { "t": "Space" },
                { "t": "Str", "c": "2024-01-01" },
            ])
        );
    }

    #[test]
    fn test_rich_replacement_is_span() {
        let registry = registry();
        let mut document = doc(para(json!([{ "t": "Str", "c": "{badge()}" }])));

        filter_document(&mut document, &Filter::new(&registry)).unwrap();

        assert_eq!(
            document["blocks"][0]["c"][0],
            json!({
                "t": "Span",
                "c": [
                    ["", ["interpolated"], [["field", "badge()"]]],
                    [{ "t": "Emph", "c": [{ "t": "Str", "c": "new" }] }],
                ],
            })
        );
    }

    #[test]
    fn test_nested_and_meta_nodes_are_visited() {
        let registry = registry();
        let mut document = json!({
            "pandoc-api-version": [1, 23, 1],
            "meta": {
                "date": { "t": "MetaInlines", "c": [{ "t": "Str", "c": "{today()}" }] }
            },
            "blocks": [
                { "t": "Header", "c": [1, ["", [], []], [
                    { "t": "Strong", "c": [{ "t": "Str", "c": "{yearsSince(2000-01-01)}" }] }
                ]]}
            ],
        });

        let replaced = filter_document(&mut document, &Filter::new(&registry)).unwrap();

        assert_eq!(replaced, 2);
        assert_eq!(document["meta"]["date"]["c"][0]["c"], json!("2024-01-01"));
        assert_eq!(document["blocks"][0]["c"][2][0]["c"][0]["c"], json!("24"));
    }

    #[test]
    fn test_code_and_unknown_nodes_pass_through() {
        let registry = registry();
        let blocks = json!([
            { "t": "CodeBlock", "c": [["", [], []], "{today()}"] },
            { "t": "Para", "c": [
                { "t": "Code", "c": [["", [], []], "{today()}"] },
                { "t": "Cite", "c": [[], [{ "t": "Str", "c": "plain" }]] },
                { "t": "Str", "c": "{today()}." },
            ]},
        ]);
        let mut document = doc(blocks.clone());

        let replaced = filter_document(&mut document, &Filter::new(&registry)).unwrap();

        assert_eq!(replaced, 0);
        assert_eq!(document["blocks"], blocks);
    }

    #[test]
    fn test_replacements_are_not_revisited() {
        let registry = registry();
        let mut document = doc(para(json!([{ "t": "Str", "c": "{echo()}" }])));

        filter_document(&mut document, &Filter::new(&registry)).unwrap();

        assert_eq!(document["blocks"][0]["c"][0]["c"], json!("{today()}"));
    }

    #[test]
    fn test_first_failure_aborts() {
        let registry = registry();
        let mut document = doc(para(json!([
            { "t": "Str", "c": "{today}" },
            { "t": "Str", "c": "{today()}" },
        ])));

        let err = filter_document(&mut document, &Filter::new(&registry)).unwrap_err();
        assert!(matches!(err, MetavarsError::MalformedCall { .. }));
    }

    #[test]
    fn test_rejects_non_documents() {
        let registry = registry();
        let filter = Filter::new(&registry);

        for mut value in [json!([]), json!({ "blocks": [] }), json!({ "pandoc-api-version": [1, 23], "meta": {} })] {
            let err = filter_document(&mut value, &filter).unwrap_err();
            assert!(matches!(err, MetavarsError::InvalidDocument(_)), "{value}");
        }
    }

    #[test]
    fn test_filter_json_round_trip_of_untouched_document() {
        let registry = registry();
        let input = r#"{"pandoc-api-version":[1,23,1],"meta":{},"blocks":[{"t":"Para","c":[{"t":"Str","c":"hello"}]}]}"#;
        let output = filter_json(input, &Filter::new(&registry)).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, serde_json::from_str::<Value>(input).unwrap());
    }

    #[test]
    fn test_filter_json_rejects_garbage() {
        let registry = registry();
        let err = filter_json("not json", &Filter::new(&registry)).unwrap_err();
        assert!(matches!(err, MetavarsError::Json(_)));
    }
}
