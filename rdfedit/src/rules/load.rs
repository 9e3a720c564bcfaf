//! Load a rule configuration from its XML document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{DependencyMode, Positions, PropertyKind, Rule, RuleBody, RuleError, RuleSet};

impl RuleSet {
    /// Load a rule configuration from the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<RuleSet, RuleError> {
        RuleSet::parse(&fs::read_to_string(path)?)
    }

    /// Parse a rule configuration document.
    ///
    /// The root element must be `<rules>`, with optional `changeSuffix` and
    /// `exclude` attributes; every child element must be one of the five
    /// rule tags. Anything else is a load error.
    pub fn parse(src: &str) -> Result<RuleSet, RuleError> {
        let mut reader = Reader::from_str(src);
        reader.config_mut().trim_text(true);

        let mut set = RuleSet::default();
        let mut seen_root = false;
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => {
                    if !seen_root {
                        if e.name().as_ref() != b"rules" {
                            return Err(RuleError::BadRoot(lossy(e.name().as_ref())));
                        }
                        let attrs = attributes(&e)?;
                        set.change_suffix = attrs.get("changeSuffix").cloned();
                        set.exclude = attrs
                            .get("exclude")
                            .map(|x| {
                                x.split('+')
                                    .filter(|f| !f.is_empty())
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default();
                        seen_root = true;
                    } else {
                        set.rules.push(parse_rule(e.name().as_ref(), attributes(&e)?)?);
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }
        Ok(set)
    }
}

fn attributes(e: &BytesStart) -> Result<BTreeMap<String, String>, RuleError> {
    let mut map = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        map.insert(
            lossy(attr.key.as_ref()),
            attr.unescape_value()?.into_owned(),
        );
    }
    Ok(map)
}

fn parse_rule(tag: &[u8], attrs: BTreeMap<String, String>) -> Result<Rule, RuleError> {
    let continues = attrs.get("continue").is_some_and(|v| !v.is_empty());
    let body = match tag {
        b"replace" => RuleBody::Replace {
            from: require(&attrs, "replace", "from")?,
            to: attrs.get("to").cloned(),
            positions: positions(&attrs),
            predicate: attrs.get("predicate").cloned(),
        },
        b"delete" => RuleBody::Delete {
            from: require(&attrs, "delete", "from")?,
            positions: positions(&attrs),
            predicate: attrs.get("predicate").cloned(),
        },
        b"edit" => RuleBody::Edit {
            from: require(&attrs, "edit", "from")?,
            to: require(&attrs, "edit", "to")?,
            predicate: attrs.get("predicate").cloned(),
        },
        b"type" => RuleBody::Type {
            from: require(&attrs, "type", "from")?,
            to: require(&attrs, "type", "to")?,
            kind: match attrs.get("kind") {
                None => None,
                Some(k) => {
                    Some(PropertyKind::parse(k).ok_or_else(|| RuleError::InvalidKind(k.clone()))?)
                }
            },
        },
        b"namespace" => {
            let from = attrs.get("from").cloned();
            let prefix = attrs.get("prefix").cloned();
            let to = attrs.get("to").cloned();
            if (from.is_some() || prefix.is_some()) && to.is_none() {
                return Err(RuleError::MissingAttribute {
                    rule: "namespace",
                    attr: "to",
                });
            }
            RuleBody::Namespace {
                from,
                to,
                prefix,
                remove_prefix: attrs.get("remove-prefix").cloned(),
                dependencies: attrs.get("dependencies").map(|d| {
                    if d == "all" {
                        DependencyMode::All
                    } else {
                        DependencyMode::Adjust
                    }
                }),
            }
        }
        other => return Err(RuleError::UnknownRule(lossy(other))),
    };
    Ok(Rule { body, continues })
}

fn positions(attrs: &BTreeMap<String, String>) -> Positions {
    attrs
        .get("match")
        .map(|m| Positions::parse(m))
        .unwrap_or_default()
}

fn require(
    attrs: &BTreeMap<String, String>,
    rule: &'static str,
    attr: &'static str,
) -> Result<String, RuleError> {
    attrs
        .get(attr)
        .cloned()
        .ok_or(RuleError::MissingAttribute { rule, attr })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
