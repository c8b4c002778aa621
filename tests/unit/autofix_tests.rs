//! Unit tests for the future-import autofix.

use shellgeist::edit::autofix::autofix_future_imports;

const OLD: &str = "from __future__ import annotations\nimport os\n";

#[test]
fn moves_import_back_to_prelude() {
    let new = "import os\nfrom __future__ import annotations\nx = 1\n";
    let fixed = autofix_future_imports("m.py", OLD, new).expect("fix");
    assert_eq!(fixed, "from __future__ import annotations\nimport os\nx = 1\n");
}

#[test]
fn preserves_comments_and_docstring_before_import() {
    let new = "# header\n\"\"\"doc\"\"\"\n\nimport os\nfrom __future__ import annotations\n";
    let fixed = autofix_future_imports("m.py", OLD, new).expect("fix");
    assert_eq!(
        fixed,
        "# header\n\"\"\"doc\"\"\"\n\nfrom __future__ import annotations\nimport os\n"
    );
}

#[test]
fn duplicate_statements_collapse_to_first() {
    let new = "import os\nfrom __future__ import annotations\ny = 2\nfrom __future__ import annotations\n";
    let fixed = autofix_future_imports("m.py", OLD, new).expect("fix");
    assert_eq!(
        fixed,
        "from __future__ import annotations\nimport os\ny = 2\n"
    );
}

#[test]
fn distinct_statements_keep_first_seen_order() {
    let new = "import os\nfrom __future__ import division\nfrom __future__ import annotations\n";
    let fixed = autofix_future_imports("m.py", OLD, new).expect("fix");
    assert_eq!(
        fixed,
        "from __future__ import division\nfrom __future__ import annotations\nimport os\n"
    );
}

#[test]
fn correct_placement_needs_no_fix() {
    let new = "from __future__ import annotations\nimport os\nx = 1\n";
    assert!(autofix_future_imports("m.py", OLD, new).is_none());
}

#[test]
fn removed_import_cannot_be_fixed() {
    let new = "import os\nx = 1\n";
    assert!(autofix_future_imports("m.py", OLD, new).is_none());
}

#[test]
fn files_without_future_imports_are_untouched() {
    let old = "import os\n";
    let new = "import os\nimport sys\n";
    assert!(autofix_future_imports("m.py", old, new).is_none());
}

#[test]
fn fix_is_idempotent() {
    let new = "import os\nfrom __future__ import annotations\n";
    let fixed = autofix_future_imports("m.py", OLD, new).expect("fix");
    assert!(autofix_future_imports("m.py", OLD, &fixed).is_none());
}
