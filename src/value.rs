//! Conversions from the crate's types into template [`Value`]s.

use crate::post::Post;
use crate::summary::Summary;
use gtmpl_value::Value;
use std::collections::HashMap;

impl From<&Summary> for Value {
    fn from(s: &Summary) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), (&s.title).into());
        m.insert("date".to_owned(), (&s.date).into());
        m.insert("link".to_owned(), (&s.link).into());
        Value::Object(m)
    }
}

/// Converts a list of summaries into a template array.
pub fn summaries(items: &[Summary]) -> Value {
    Value::Array(items.iter().map(Value::from).collect())
}

/// Converts a post into the template values for its page. `link` is the
/// post's canonical URL.
pub fn post(post: &Post, link: &str) -> HashMap<String, Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("title".to_owned(), (&post.title).into());
    m.insert("date".to_owned(), post.date.as_str().into());
    m.insert("slug".to_owned(), (&post.slug).into());
    m.insert("template".to_owned(), (&post.template).into());
    m.insert("contents".to_owned(), (&post.contents).into());
    m.insert("link".to_owned(), link.into());
    m.insert(
        "tags".to_owned(),
        Value::Array(post.tags.iter().map(Value::from).collect()),
    );
    m
}
