//! Catalog file loading tests.

use airgraph::catalog::Catalog;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_catalog_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[setup]]
description = "Wipe the database"
statement = "MATCH (n) DETACH DELETE n"

[[analysis]]
description = "Count airports"
statement = "MATCH (a:Airport) RETURN count(a) AS total"

[[analysis]]
description = "Count flights"
statement = "MATCH ()-[f:FLIGHT]->() RETURN count(f) AS total"
"#
    )
    .unwrap();

    let catalog = Catalog::load_from_file(file.path()).unwrap();
    assert_eq!(catalog.setup().len(), 1);
    assert_eq!(catalog.analysis().len(), 2);
    assert_eq!(catalog.analysis()[1].description(), "Count flights");
}

#[test]
fn test_load_catalog_with_empty_statement_fails() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[analysis]]
description = "Nothing"
statement = "   "
"#
    )
    .unwrap();

    let err = Catalog::load_from_file(file.path()).unwrap_err();
    assert_eq!(err.category(), "Configuration Error");
    assert!(err.to_string().contains("empty statement"));
}
