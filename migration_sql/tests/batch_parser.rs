//! Script splitting across dialects

use migration_sql::batch::{BatchKind, BatchParser, SqlBatch};
use migration_sql::Dialect;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn split(dialect: Dialect, script: &str) -> Vec<String> {
    BatchParser::for_dialect(dialect)
        .process(script)
        .into_iter()
        .map(|batch| batch.sql)
        .collect()
}

#[rstest]
#[case(Dialect::Oracle, "SELECT 1 FROM dual; SELECT 2 FROM dual;", &["SELECT 1 FROM dual", "SELECT 2 FROM dual"])]
#[case(Dialect::Oracle, "BEGIN\n DBMS_OUTPUT.PUT_LINE('x');\nEND;", &["BEGIN\n DBMS_OUTPUT.PUT_LINE('x');\nEND;"])]
#[case(Dialect::Oracle, "SELECT 'BEGIN' FROM dual; SELECT 'END' FROM dual;", &["SELECT 'BEGIN' FROM dual", "SELECT 'END' FROM dual"])]
#[case(Dialect::Oracle, "SELECT t.begin, t.end FROM t; SELECT 2 FROM dual;", &["SELECT t.begin, t.end FROM t", "SELECT 2 FROM dual"])]
#[case(Dialect::Postgres, "INSERT INTO t VALUES ('a;b'); -- done;\nSELECT 1", &["INSERT INTO t VALUES ('a;b')", "-- done;\nSELECT 1"])]
#[case(Dialect::MySql, "SELECT `a;b` FROM t; # x;\nSELECT 2;", &["SELECT `a;b` FROM t", "# x;\nSELECT 2"])]
#[case(Dialect::Hana, "SELECT \"a;b\" FROM t;SELECT 2", &["SELECT \"a;b\" FROM t", "SELECT 2"])]
#[case(Dialect::Snowflake, "SELECT 1; // note;\nSELECT 2", &["SELECT 1", "// note;\nSELECT 2"])]
#[case(Dialect::SqlServer, "SELECT [a]]GO]\nGO\nSELECT 2", &["SELECT [a]]GO]", "SELECT 2"])]
#[case(Dialect::Sqlite, "CREATE TABLE t (x);\nGO\n", &["CREATE TABLE t (x);"])]
fn splits_scripts(#[case] dialect: Dialect, #[case] script: &str, #[case] expected: &[&str]) {
    assert_eq!(split(dialect, script), expected);
}

#[test]
fn oracle_procedure_is_one_batch() {
    let script = "\
CREATE OR REPLACE PROCEDURE touch_user(p_id NUMBER) AS
  v_now DATE;
BEGIN
  v_now := SYSDATE;
  IF p_id IS NOT NULL THEN
    UPDATE users SET seen = v_now WHERE id = p_id;
  END IF;
END touch_user;
SELECT COUNT(*) FROM users;";

    let batches = split(Dialect::Oracle, script);
    assert_eq!(batches.len(), 2);
    assert!(batches[0].starts_with("CREATE OR REPLACE PROCEDURE"));
    assert!(batches[0].ends_with("END touch_user;"));
    assert_eq!(batches[1], "SELECT COUNT(*) FROM users");
}

#[test]
fn oracle_package_body_with_nested_routines() {
    let script = "\
CREATE PACKAGE BODY audit AS
  PROCEDURE log(msg VARCHAR2) IS
  BEGIN
    INSERT INTO audit_log VALUES (msg);
  END log;
END audit;
/
DROP TABLE staging";

    assert_eq!(
        split(Dialect::Oracle, script),
        vec![
            "CREATE PACKAGE BODY audit AS\n  PROCEDURE log(msg VARCHAR2) IS\n  BEGIN\n    INSERT INTO audit_log VALUES (msg);\n  END log;\nEND audit;",
            "DROP TABLE staging",
        ]
    );
}

#[test]
fn oracle_declare_block() {
    let script = "DECLARE\n  n NUMBER;\nBEGIN\n  SELECT COUNT(*) INTO n FROM t;\nEND;\nCOMMIT;";
    assert_eq!(
        split(Dialect::Oracle, script),
        vec!["DECLARE\n  n NUMBER;\nBEGIN\n  SELECT COUNT(*) INTO n FROM t;\nEND;", "COMMIT"]
    );
}

#[test]
fn go_repeat_counts() {
    let batches = BatchParser::for_dialect(Dialect::SqlServer)
        .process("INSERT INTO t DEFAULT VALUES\ngo 10\nPRINT 'done'");

    assert_eq!(
        batches,
        vec![
            SqlBatch {
                sql: "INSERT INTO t DEFAULT VALUES".to_string(),
                kind: BatchKind::SeparatorWithRepeatCount(10),
            },
            SqlBatch::statement("PRINT 'done'"),
        ]
    );
}

#[test]
fn go_with_trailing_comment() {
    let batches = BatchParser::for_dialect(Dialect::SqlServer)
        .process("SELECT 1\nGO 3 -- warm up\nSELECT 2\nGO -- done\nSELECT 3");

    assert_eq!(
        batches,
        vec![
            SqlBatch {
                sql: "SELECT 1".to_string(),
                kind: BatchKind::SeparatorWithRepeatCount(3),
            },
            SqlBatch {
                sql: "SELECT 2".to_string(),
                kind: BatchKind::SeparatorWithRepeatCount(1),
            },
            SqlBatch::statement("SELECT 3"),
        ]
    );
}

#[rstest]
#[case(Dialect::SqlServer, "SELECT 1 /* a\n/* b */\nGO\n*/\nGO", "SELECT 1")]
#[case(Dialect::Postgres, "SELECT 1 -- tail\n/* block */ + 1;", "SELECT 1 \n + 1")]
fn strip_comments(#[case] dialect: Dialect, #[case] script: &str, #[case] expected: &str) {
    let batches = BatchParser::for_dialect(dialect).strip_comments(true).process(script);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].sql, expected);
}

#[test]
fn unterminated_comment_swallows_the_rest() {
    assert_eq!(
        split(Dialect::Postgres, "SELECT 1; /* open\nSELECT 2;"),
        vec!["SELECT 1", "/* open\nSELECT 2;"]
    );
}
