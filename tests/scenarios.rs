//! 跨模块场景：投影一致性、过滤正确性、追加保前缀、跨组失败

use std::fs;
use std::path::{Path, PathBuf};

use hty_storage_engine::ingest::TableWriter;
use hty_storage_engine::mutation::add_row;
use hty_storage_engine::query::{filter, project, project_and_filter, project_single_column};
use hty_storage_engine::trailer::{self, read_metadata};
use hty_storage_engine::{Cell, ColumnMeta, CompareOp, Group, HtyError, Metadata};
use rstest::rstest;
use tempfile::TempDir;

/// id:int, salary:float — 3 行
fn employees(dir: &TempDir) -> (Metadata, PathBuf) {
    let path = dir.path().join("employees.hty");
    let mut table = TableWriter::new(&["id", "salary"]);
    table.append_record(&["1", "50000.0"]).unwrap();
    table.append_record(&["2", "49000.0"]).unwrap();
    table.append_record(&["3", "51000.0"]).unwrap();
    let mut buf = Vec::new();
    let meta = table.finalize(&mut buf).unwrap();
    fs::write(&path, buf).unwrap();
    (meta, path)
}

fn wide(dir: &TempDir) -> (Metadata, PathBuf) {
    let path = dir.path().join("wide.hty");
    let mut table = TableWriter::new(&["id", "age", "score", "delta"]);
    for (id, age, score, delta) in [
        ("1", "20", "3.5", "-4"),
        ("2", "31", "2.0", "0"),
        ("3", "24", "4.25", "7"),
        ("4", "31", "3.5", "-1"),
        ("5", "45", "0.75", "12"),
    ] {
        table.append_record(&[id, age, score, delta]).unwrap();
    }
    let mut buf = Vec::new();
    let meta = table.finalize(&mut buf).unwrap();
    fs::write(&path, buf).unwrap();
    (meta, path)
}

fn floats(cells: &[Cell]) -> Vec<f32> {
    cells.iter().map(|c| c.as_f32()).collect()
}

// ── 具体场景 ──────────────────────────────────────────────────────────────────

#[test]
fn employee_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (meta, src) = employees(&dir);
    assert_eq!(read_metadata(&src).unwrap(), meta);

    assert_eq!(filter(&meta, &src, "salary", CompareOp::try_from(2).unwrap(), 50000.0).unwrap(), vec![1]);

    let ids = project(&meta, &src, &["id"]).unwrap();
    assert_eq!(ids.columns, vec![vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]]);

    let dst = dir.path().join("employees_v2.hty");
    let new_meta = add_row(&meta, &src, &dst, &[vec![Cell::Int(4), Cell::from_f32(48000.0)]]).unwrap();
    assert_eq!(new_meta.num_rows, 4);
    let salary = project(&new_meta, &dst, &["salary"]).unwrap();
    assert_eq!(floats(&salary.columns[0]), vec![50000.0, 49000.0, 51000.0, 48000.0]);
}

// ── 性质 ──────────────────────────────────────────────────────────────────────

#[test]
fn single_column_matches_multi_column_projection() {
    let dir = tempfile::tempdir().unwrap();
    let (meta, path) = wide(&dir);
    let names = meta.column_names();
    let all = project(&meta, &path, &names).unwrap();
    for (i, name) in names.iter().enumerate() {
        assert_eq!(project_single_column(&meta, &path, name).unwrap(), all.columns[i]);
    }
}

#[rstest]
#[case("score", 3.5)]
#[case("age", 31.0)]
#[case("delta", -1.0)]
#[case("delta", 100.0)]
fn equality_and_less_than_follow_values(#[case] column: &str, #[case] v: f32) {
    let dir = tempfile::tempdir().unwrap();
    let (meta, path) = wide(&dir);
    let values = floats(&project_single_column(&meta, &path, column).unwrap());

    let eq = filter(&meta, &path, column, CompareOp::Eq, v).unwrap();
    let lt = filter(&meta, &path, column, CompareOp::Lt, v).unwrap();
    for (i, x) in values.iter().enumerate() {
        assert_eq!(eq.contains(&i), f64::from((x - v).abs()) < 1e-6, "eq row {i}");
        assert_eq!(lt.contains(&i), *x < v, "lt row {i}");
    }
    assert!(eq.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn unknown_operator_code_is_rejected() {
    assert!(matches!(CompareOp::try_from(9), Err(HtyError::InvalidOperator(9))));
}

#[test]
fn append_preserves_prefix_for_every_column() {
    let dir = tempfile::tempdir().unwrap();
    let (meta, src) = wide(&dir);
    let rows = vec![
        vec![Cell::Int(6), Cell::Int(50), Cell::from_f32(1.25), Cell::Int(-9)],
        vec![Cell::Int(7), Cell::Int(19), Cell::from_f32(9.5),  Cell::Int(3)],
    ];
    let dst = dir.path().join("wide_v2.hty");
    let new_meta = add_row(&meta, &src, &dst, &rows).unwrap();
    assert_eq!(read_metadata(&dst).unwrap(), new_meta);

    let old_n = meta.num_rows as usize;
    for (i, name) in meta.column_names().iter().enumerate() {
        let before = project_single_column(&meta, &src, name).unwrap();
        let after  = project_single_column(&new_meta, &dst, name).unwrap();
        assert_eq!(&after[..old_n], &before[..]);
        let appended: Vec<Cell> = rows.iter().map(|r| r[i]).collect();
        assert_eq!(&after[old_n..], &appended[..]);
    }
}

#[test]
fn project_and_filter_orders_rows_by_index() {
    let dir = tempfile::tempdir().unwrap();
    let (meta, path) = wide(&dir);
    let out = project_and_filter(&meta, &path, &["score", "id"], "age", CompareOp::Ge, 31.0).unwrap();
    assert_eq!(out.skipped_indices, 0);
    assert_eq!(out.result.names, vec!["score", "id"]);
    assert_eq!(out.result.columns[1], vec![Cell::Int(2), Cell::Int(4), Cell::Int(5)]);
    assert_eq!(floats(&out.result.columns[0]), vec![2.0, 3.5, 0.75]);
}

// ── 跨组 ──────────────────────────────────────────────────────────────────────

/// 两个组，物理顺序与元数据顺序相反且不相邻
fn split_groups(dir: &Path) -> (Metadata, PathBuf) {
    let meta = Metadata::new(2, vec![
        Group::new(20, vec![ColumnMeta::int("a"), ColumnMeta::float("b")]),
        Group::new(0,  vec![ColumnMeta::int("c")]),
    ]);
    let mut buf = Vec::new();
    for v in [7i32, 8, 0, 0, 0, 1, 2, 1.0f32.to_bits() as i32, 2.0f32.to_bits() as i32] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    trailer::encode(&mut buf, &meta).unwrap();
    let path = dir.join("split.hty");
    fs::write(&path, buf).unwrap();
    (meta, path)
}

#[test]
fn groups_are_read_at_their_own_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let (meta, path) = split_groups(dir.path());
    assert_eq!(project_single_column(&meta, &path, "c").unwrap(), vec![Cell::Int(7), Cell::Int(8)]);
    let ab = project(&meta, &path, &["a", "b"]).unwrap();
    assert_eq!(ab.columns[0], vec![Cell::Int(1), Cell::Int(2)]);
    assert_eq!(floats(&ab.columns[1]), vec![1.0, 2.0]);
}

#[test]
fn cross_group_requests_never_return_partial_columns() {
    let dir = tempfile::tempdir().unwrap();
    let (meta, path) = split_groups(dir.path());
    assert!(matches!(project(&meta, &path, &["a", "c"]), Err(HtyError::ColumnsSpanGroups(_))));
    assert!(matches!(
        project_and_filter(&meta, &path, &["a"], "c", CompareOp::Gt, 0.0),
        Err(HtyError::ColumnsSpanGroups(_))
    ));
}

// ── 元数据与数据不符 ──────────────────────────────────────────────────────────

#[test]
fn inflated_row_count_fails_every_read_path_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let meta = Metadata::new(1 << 62, vec![Group::new(0, vec![ColumnMeta::int("a")])]);
    let mut buf = Vec::new();
    for v in [1i32, 2] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    trailer::encode(&mut buf, &meta).unwrap();
    let path = dir.path().join("inflated.hty");
    fs::write(&path, buf).unwrap();

    let meta = read_metadata(&path).unwrap();
    assert!(matches!(project_single_column(&meta, &path, "a"), Err(HtyError::TruncatedRead { .. })));
    assert!(matches!(project(&meta, &path, &["a"]), Err(HtyError::TruncatedRead { .. })));
    assert!(matches!(filter(&meta, &path, "a", CompareOp::Eq, 1.0), Err(HtyError::TruncatedRead { .. })));
    assert!(matches!(
        project_and_filter(&meta, &path, &["a"], "a", CompareOp::Eq, 1.0),
        Err(HtyError::TruncatedRead { .. })
    ));
    let dst = dir.path().join("inflated_v2.hty");
    assert!(matches!(add_row(&meta, &path, &dst, &[vec![Cell::Int(3)]]), Err(HtyError::TruncatedRead { .. })));
}
