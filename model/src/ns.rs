//! Standard namespaces.
//!
//! Each module below defines the terms of one well-known namespace as
//! `&str` constants holding the full IRI, plus the namespace IRI itself
//! as `PREFIX`.

/// Create a "namespace module"
/// defining a set of terms within a given IRI space.
///
/// Term IRIs are assembled at compile time, so a typo in a suffix shows up
/// as an unresolved constant rather than a malformed IRI at runtime.
macro_rules! namespace {
    ($iri_prefix:literal, $($suffix:ident),*; $($r_id:ident, $r_sf:literal),*) => {
        /// Prefix used in this namespace.
        pub const PREFIX: &str = $iri_prefix;
        $(
            /// Generated term.
            #[allow(non_upper_case_globals)]
            pub const $suffix: &str = concat!($iri_prefix, stringify!($suffix));
        )*
        $(
            /// Generated term.
            #[allow(non_upper_case_globals)]
            pub const $r_id: &str = concat!($iri_prefix, $r_sf);
        )*
    };
    ($iri_prefix:literal, $($suffix:ident),*) => {
        namespace!($iri_prefix, $($suffix),*;);
    };
}

/// The standard `rdf:` namespace.
///
/// NB: since `type` is a reserved keyword in Rust,
/// the term `rdf:type` spells `rdf::type_` (with a trailing underscore).
pub mod rdf {
    namespace!(
        "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
        // datatypes
        langString;
        // 'type' is a Rust keyword, so we use 'type_' instead
        type_, "type"
    );
}

/// The standard `rdfs:` namespace.
pub mod rdfs {
    namespace!("http://www.w3.org/2000/01/rdf-schema#", range, seeAlso);
}

/// The standard `xsd:` namespace.
pub mod xsd {
    namespace!("http://www.w3.org/2001/XMLSchema#", string);
}

/// The standard `owl:` namespace.
pub mod owl {
    namespace!(
        "http://www.w3.org/2002/07/owl#",
        // classes
        DatatypeProperty,
        ObjectProperty,
        Ontology,
        // properties
        allValuesFrom,
        backwardCompatibleWith,
        imports,
        incompatibleWith,
        onClass,
        onDataRange,
        onProperty,
        priorVersion,
        someValuesFrom,
        versionIRI
    );
}

/// The standard `skos:` namespace.
///
/// Only the namespace IRI itself is needed here.
pub mod skos {
    /// Prefix used in this namespace.
    pub const PREFIX: &str = "http://www.w3.org/2004/02/skos/core#";
}

/// The Dublin Core `dcterms:` namespace.
///
/// Only the namespace IRI itself is needed here.
pub mod dct {
    /// Prefix used in this namespace.
    pub const PREFIX: &str = "http://purl.org/dc/terms/";
}

/// The OMG Specification Metadata `sm:` namespace.
pub mod sm {
    namespace!(
        "http://www.omg.org/techprocess/ab/SpecificationMetadata/",
        specificationURL
    );
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyword_terms_are_respelled() {
        assert_eq!(
            rdf::type_,
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
    }

    #[test]
    fn terms_extend_their_prefix() {
        assert_eq!(owl::imports, format!("{}imports", owl::PREFIX));
        assert_eq!(xsd::string, format!("{}string", xsd::PREFIX));
        assert_eq!(
            sm::specificationURL,
            format!("{}specificationURL", sm::PREFIX)
        );
    }
}
