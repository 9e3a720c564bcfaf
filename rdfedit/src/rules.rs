//! The rule model: a closed set of five rule kinds,
//! loaded once from an XML configuration document and read-only afterwards.

mod load;

/// The triple positions a [`Replace`](RuleBody::Replace) or
/// [`Delete`](RuleBody::Delete) rule matches against.
///
/// Parsed from a `match` attribute naming any combination of the letters
/// `s`, `p` and `o`; the default is all three.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Positions {
    /// Match the subject.
    pub s: bool,
    /// Match the predicate.
    pub p: bool,
    /// Match the object.
    pub o: bool,
}

impl Positions {
    /// Match subject, predicate and object.
    pub const ALL: Positions = Positions {
        s: true,
        p: true,
        o: true,
    };

    /// Scan `spec` for the position letters `s`, `p` and `o`.
    pub fn parse(spec: &str) -> Positions {
        Positions {
            s: spec.contains('s'),
            p: spec.contains('p'),
            o: spec.contains('o'),
        }
    }
}

impl Default for Positions {
    fn default() -> Positions {
        Positions::ALL
    }
}

/// The kind a retyped property must end up with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyKind {
    /// `owl:ObjectProperty`
    ObjectProperty,
    /// `owl:DatatypeProperty`
    DatatypeProperty,
}

impl PropertyKind {
    /// Resolve a `kind` attribute value.
    pub fn parse(kind: &str) -> Option<PropertyKind> {
        match kind {
            "ObjectProperty" => Some(PropertyKind::ObjectProperty),
            "DatatypeProperty" => Some(PropertyKind::DatatypeProperty),
            _ => None,
        }
    }
}

/// How a [`Namespace`](RuleBody::Namespace) rule recomputes import
/// dependencies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DependencyMode {
    /// Recompute imports only for documents changed by some other rule.
    Adjust,
    /// Recompute imports for every document, marking each one changed.
    All,
}

/// One refactoring rule: its behavior plus the continuation flag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rule {
    /// What the rule does.
    pub body: RuleBody,
    /// When `true`, a fire does not stop later rules for the same triple.
    pub continues: bool,
}

/// The behavior of a rule, one variant per configuration tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuleBody {
    /// Replace a whole value (compared as text) at the matched positions.
    Replace {
        /// The value to replace.
        from: String,
        /// The replacement; `None` turns the rule into a deletion.
        to: Option<String>,
        /// The positions to match.
        positions: Positions,
        /// Only consider triples with this predicate.
        predicate: Option<String>,
    },
    /// Remove every triple mentioning a value at the matched positions.
    Delete {
        /// The value to delete.
        from: String,
        /// The positions to match.
        positions: Positions,
        /// Only consider triples with this predicate.
        predicate: Option<String>,
    },
    /// Replace every occurrence of a substring in object text.
    Edit {
        /// The substring to replace.
        from: String,
        /// The replacement substring.
        to: String,
        /// Only consider triples with this predicate.
        predicate: Option<String>,
    },
    /// Retype every reference to a class or property,
    /// flipping companion declarations when `kind` is given.
    Type {
        /// The term being retyped.
        from: String,
        /// The replacement term.
        to: String,
        /// The property kind required by the replacement term.
        kind: Option<PropertyKind>,
    },
    /// Rewrite the leading namespace of matching values,
    /// and manage prefix declarations and imports per document.
    Namespace {
        /// The namespace to replace; without it the rule only registers
        /// a prefix or removes a declaration.
        from: Option<String>,
        /// The replacement namespace.
        to: Option<String>,
        /// The prefix to bind to the replacement namespace.
        prefix: Option<String>,
        /// A prefix whose declaration must be dropped from every document.
        remove_prefix: Option<String>,
        /// Import recomputation mode.
        dependencies: Option<DependencyMode>,
    },
}

impl RuleBody {
    /// The configuration tag this rule was loaded from.
    pub fn tag(&self) -> &'static str {
        match self {
            RuleBody::Replace { .. } => "replace",
            RuleBody::Delete { .. } => "delete",
            RuleBody::Edit { .. } => "edit",
            RuleBody::Type { .. } => "type",
            RuleBody::Namespace { .. } => "namespace",
        }
    }
}

/// A whole rule configuration document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RuleSet {
    /// The rules, in document order.
    pub rules: Vec<Rule>,
    /// The suffix to insert before the extension of every output file.
    pub change_suffix: Option<String>,
    /// Path fragments naming files and directories to skip.
    pub exclude: Vec<String>,
}

/// Any error which can be raised while loading a rule configuration.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not well-formed XML
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),
    /// A malformed XML attribute
    #[error("{0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    /// The root element is not `<rules>`
    #[error("the root element must be <rules>, found <{0}>")]
    BadRoot(String),
    /// An element which is not one of the five rule tags
    #[error("unknown rule <{0}>")]
    UnknownRule(String),
    /// A rule is missing a required attribute
    #[error("rule <{rule}> requires attribute {attr:?}")]
    MissingAttribute {
        /// The rule tag.
        rule: &'static str,
        /// The missing attribute.
        attr: &'static str,
    },
    /// A `kind` attribute with an unrecognized value
    #[error("invalid kind {0:?}, expected ObjectProperty or DatatypeProperty")]
    InvalidKind(String),
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
